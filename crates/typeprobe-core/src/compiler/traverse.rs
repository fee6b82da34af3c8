use crate::ast::node::Node;
use crate::ast::MAX_NESTING_DEPTH;
use crate::program::SourceFile;
use tracing::warn;

/// Visit every node of a source file in pre-order
pub fn traverse_source_file<'a>(source: &'a SourceFile, mut callback: impl FnMut(Node<'a>)) {
    traverse_node(Node::Script(&source.script), &mut callback);
}

/// Visit `node` and then each of its descendants, in source order.
///
/// Expressions nested deeper than [`MAX_NESTING_DEPTH`] are skipped along
/// with their descendants.
pub fn traverse_node<'a>(node: Node<'a>, callback: &mut dyn FnMut(Node<'a>)) {
    walk(node, callback, 0);
}

fn walk<'a>(node: Node<'a>, callback: &mut dyn FnMut(Node<'a>), expression_depth: usize) {
    let expression_depth = match node {
        Node::Expression(_) => expression_depth + 1,
        _ => expression_depth,
    };
    if expression_depth > MAX_NESTING_DEPTH {
        warn!(at = %node.span(), "skipping expression nested too deeply");
        return;
    }
    callback(node);
    node.for_each_child(&mut |child| walk(child, callback, expression_depth));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnosticHandler;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use std::sync::Arc;

    fn source(text: &str) -> SourceFile {
        let handler = Arc::new(CollectingDiagnosticHandler::new());
        let tokens = Lexer::new(text, handler.clone()).tokenize();
        let script = Parser::new(tokens, handler).parse().expect("parse failed");
        SourceFile::new("/probe.ts", text, script, true)
    }

    #[test]
    fn test_visits_parents_before_children() {
        let file = source("f(g(1));");
        let mut calls = Vec::new();
        traverse_source_file(&file, |node| {
            if let Some(call) = node.as_call() {
                calls.push(file.text_of(call.span).to_string());
            }
        });
        assert_eq!(calls, vec!["f(g(1))", "g(1)"]);
    }

    #[test]
    fn test_stops_below_the_nesting_limit() {
        use crate::ast::expression::{Expression, ExpressionKind, Literal, UnaryOp};
        use crate::ast::statement::Statement;
        use crate::ast::{NodeId, Script};
        use crate::span::Span;

        let mut expression = Expression::new(
            NodeId(0),
            ExpressionKind::Literal(Literal::Number(1.0)),
            Span::dummy(),
        );
        for id in 1..=(MAX_NESTING_DEPTH as u32 + 20) {
            expression = Expression::new(
                NodeId(id),
                ExpressionKind::Unary(UnaryOp::Not, Box::new(expression)),
                Span::dummy(),
            );
        }
        let script = Script::new(vec![Statement::Expression(expression)], Span::dummy());
        let file = SourceFile::new("/deep.ts", "", script, true);

        let mut expressions = 0;
        traverse_source_file(&file, |node| {
            if matches!(node, Node::Expression(_)) {
                expressions += 1;
            }
        });
        assert_eq!(expressions, MAX_NESTING_DEPTH);
    }

    #[test]
    fn test_first_node_is_the_script() {
        let file = source("let a = 1;\nlet b = a;");
        let mut count = 0;
        let mut first_is_script = false;
        traverse_source_file(&file, |node| {
            if count == 0 {
                first_is_script = matches!(node, Node::Script(_));
            }
            count += 1;
        });
        assert!(first_is_script);
        assert!(count > 3);
    }
}
