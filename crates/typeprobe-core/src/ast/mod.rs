pub mod expression;
pub mod node;
pub mod statement;
pub mod types;

use crate::span::Span;

pub use node::Node;

/// Deepest expression, statement or type nesting the parser builds and the
/// checker and walker descend into
pub const MAX_NESTING_DEPTH: usize = 40;

pub const NESTED_TOO_DEEPLY: &str = "Expression nested too deeply.";

/// Wrapper for AST nodes with span information
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Spanned { node, span }
    }
}

/// Identifier
pub type Ident = Spanned<String>;

/// Identity of an expression node, unique across every file of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Top-level syntax of one source file
#[derive(Debug, Clone)]
pub struct Script {
    pub statements: Vec<statement::Statement>,
    pub span: Span,
}

impl Script {
    pub fn new(statements: Vec<statement::Statement>, span: Span) -> Self {
        Script { statements, span }
    }

    /// A script with `import`/`export` statements gets its own module scope
    pub fn is_module(&self) -> bool {
        self.statements.iter().any(|statement| {
            matches!(
                statement,
                statement::Statement::Import(_)
                    | statement::Statement::Export(_)
                    | statement::Statement::ExportNamed(_)
                    | statement::Statement::ExportDefault(_)
            )
        })
    }
}

/// Number text the way a JavaScript engine prints it (`1`, `1.5`, `-2`)
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-2.0), "-2");
    }
}
