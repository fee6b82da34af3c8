pub mod builtins;
pub mod display;
pub mod generics;
pub mod intrinsics;
pub mod symbol_table;
pub mod type_checker;
pub mod type_compat;
pub mod type_environment;
pub mod types;

mod pass;

#[cfg(test)]
mod tests;

pub use display::{type_to_string, TypeFormat};
pub use symbol_table::{Declaration, Scope, ScopeId, Symbol, SymbolId, SymbolKind, SymbolTable};
pub use type_checker::{CheckInput, FileTypeError, TypeChecker};
pub use type_compat::TypeCompatibility;
pub use type_environment::TypeEnvironment;
pub use types::{
    CommonTypes, Intrinsic, LiteralValue, ObjectShape, PropertyInfo, Signature, TypeData, TypeId,
    TypeStore,
};

use crate::span::Span;

/// Type checker error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheckError {
    pub message: String,
    pub span: Span,
}

impl TypeCheckError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for TypeCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.span.line, self.span.column)
    }
}

impl std::error::Error for TypeCheckError {}
