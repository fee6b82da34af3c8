use super::*;
use crate::ast::statement::Statement;
use crate::ast::Script;
use crate::config::CompilerOptions;
use crate::diagnostics::CollectingDiagnosticHandler;
use crate::lexer::Lexer;
use crate::parser::Parser;
use std::sync::Arc;

fn parse(source: &str) -> Script {
    let handler = Arc::new(CollectingDiagnosticHandler::new());
    let mut lexer = Lexer::new(source, handler.clone());
    let tokens = lexer.tokenize();
    let mut parser = Parser::new(tokens, handler);
    parser.parse().expect("Parse failed")
}

fn options(strict: bool) -> CompilerOptions {
    CompilerOptions {
        strict: Some(strict),
        ..CompilerOptions::default()
    }
}

fn check(source: &str, strict: bool) -> (Script, TypeChecker, Vec<String>) {
    let script = parse(source);
    let (checker, errors) = TypeChecker::check(&[CheckInput::new(&script)], &options(strict));
    let messages = errors.into_iter().map(|e| e.error.message).collect();
    (script, checker, messages)
}

/// Type of the final expression statement of `source`, fully rendered
fn last_expression_type(source: &str, strict: bool) -> String {
    let (script, checker, errors) = check(source, strict);
    assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    let expression = match script.statements.last() {
        Some(Statement::Expression(expression)) => expression,
        other => panic!("Expected expression statement, got {:?}", other),
    };
    let type_id = checker
        .type_of_node(expression.id)
        .expect("expression has no recorded type");
    checker.type_to_string(type_id, TypeFormat::FULL)
}

#[test]
fn test_const_keeps_literal_let_widens() {
    assert_eq!(last_expression_type("const a = 1; a", true), "1");
    assert_eq!(last_expression_type("let b = 1; b", true), "number");
    assert_eq!(last_expression_type("let s = \"x\"; s", true), "string");
}

#[test]
fn test_declared_annotation_wins() {
    assert_eq!(
        last_expression_type("let v: string | number = 1; v", true),
        "string | number"
    );
}

#[test]
fn test_object_literal_widens_properties() {
    assert_eq!(
        last_expression_type("const o = { a: 1, b: \"x\" }; o", true),
        "{ a: number; b: string; }"
    );
}

#[test]
fn test_as_const_keeps_literals() {
    assert_eq!(
        last_expression_type("const t = [1, \"a\"] as const; t", true),
        "readonly [1, \"a\"]"
    );
}

#[test]
fn test_generic_call_infers_type_argument() {
    let source = "function id<T>(value: T): T { return value; }\nid(\"x\")";
    assert_eq!(last_expression_type(source, true), "\"x\"");
}

#[test]
fn test_alias_name_is_preserved() {
    let source = "type Pair = [string, number];\ndeclare const p: Pair;\np";
    assert_eq!(last_expression_type(source, true), "Pair");
}

#[test]
fn test_unknown_name_is_reported() {
    let (_, _, errors) = check("missing;", true);
    assert_eq!(errors, vec!["Cannot find name 'missing'.".to_string()]);
}

#[test]
fn test_assignment_mismatch_is_reported() {
    let (_, _, errors) = check("const n: number = \"x\";", true);
    assert_eq!(
        errors,
        vec!["Type '\"x\"' is not assignable to type 'number'.".to_string()]
    );
}

#[test]
fn test_null_is_assignable_without_strict_null_checks() {
    let (_, _, errors) = check("const n: number = null;", false);
    assert!(errors.is_empty());
    let (_, _, errors) = check("const n: number = null;", true);
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_argument_count_is_checked() {
    let (_, _, errors) = check("function f(a: number) {}\nf();", true);
    assert_eq!(errors, vec!["Expected 1 arguments, but got 0.".to_string()]);
}

#[test]
fn test_expect_type_call_has_assertions_type() {
    assert_eq!(
        last_expression_type("expectType<string>()", true),
        "Assertions<string>"
    );
    assert_eq!(
        last_expression_type("expectType()", true),
        "Assertions<NotProvided>"
    );
}

#[test]
fn test_type_check_error_display() {
    let error = TypeCheckError::new("Cannot find name 'x'.", Span::new(4, 5, 2, 3));
    assert_eq!(error.to_string(), "Cannot find name 'x'. at 2:3");
}

#[test]
fn test_deeply_nested_expression_reports_instead_of_recursing() {
    use crate::ast::expression::{Expression, ExpressionKind, Literal, UnaryOp};
    use crate::ast::{NodeId, MAX_NESTING_DEPTH};

    let mut expression = Expression::new(
        NodeId(0),
        ExpressionKind::Literal(Literal::Boolean(true)),
        Span::new(0, 4, 1, 1),
    );
    for id in 1..=(MAX_NESTING_DEPTH as u32 + 60) {
        expression = Expression::new(
            NodeId(id),
            ExpressionKind::Unary(UnaryOp::Not, Box::new(expression)),
            Span::new(0, 4, 1, 1),
        );
    }
    let script = Script::new(vec![Statement::Expression(expression)], Span::new(0, 4, 1, 1));
    let (_, errors) = TypeChecker::check(&[CheckInput::new(&script)], &options(true));

    let messages: Vec<String> = errors.into_iter().map(|e| e.error.message).collect();
    assert_eq!(messages, vec!["Expression nested too deeply.".to_string()]);
}
