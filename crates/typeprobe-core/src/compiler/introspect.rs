//! Classification of call expressions by the members of their static type.

use crate::assertions::{self, Assertion};
use crate::ast::expression::{Expression, ExpressionKind};
use crate::ast::node::Node;
use crate::diagnostics::CollectingDiagnosticHandler;
use crate::lexer::Lexer;
use crate::program::SourceFile;
use crate::span::Span;
use crate::typechecker::intrinsics::{
    is_not_provided, ASSERTION_CALL_PROPERTY, ASSERTION_NAME_PROPERTY, ASSERTION_STATE_PROPERTY,
    EXPECTED_TYPE_PROPERTY, EXPECT_CALL_PROPERTY, RECEIVED_TYPE_PROPERTY, STATE_NEGATED,
};
use crate::typechecker::{LiteralValue, TypeChecker, TypeFormat, TypeId};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// What a call expression means to the compiler
#[derive(Debug, Clone, PartialEq)]
pub enum TestCall {
    /// Any other call
    None,
    /// `expectType<T>(...)`; `received` is absent when no type was given
    Expect { received: Option<TypeId> },
    /// `expectType<T>(...).toXyz<E>()`, possibly through `.not`
    Assertion(AssertionCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertionCall {
    pub assertion: &'static Assertion,
    pub received: Option<TypeId>,
    pub expected: Option<TypeId>,
    pub received_text: Option<String>,
    pub expected_text: Option<String>,
    pub is_negated: bool,
    pub needs_type_argument: bool,
}

/// Where a failing call is reported and how it is spelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerInfo {
    pub caller_span: Span,
    pub expect_call_text: Option<String>,
    pub assertion_call_text: Option<String>,
}

/// Classifies call expressions of one checked program.
///
/// Results are cached per call type. Types are interned, so every call with
/// the same static type shares one classification.
pub struct TestCallClassifier<'c> {
    checker: &'c TypeChecker,
    cache: FxHashMap<TypeId, TestCall>,
}

impl<'c> TestCallClassifier<'c> {
    pub fn new(checker: &'c TypeChecker) -> Self {
        TestCallClassifier {
            checker,
            cache: FxHashMap::default(),
        }
    }

    /// Number of distinct call types classified so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn identify_test_call(&mut self, node: Node<'_>) -> TestCall {
        let Some(call) = node.as_call() else {
            return TestCall::None;
        };
        let Some(call_type) = self.checker.type_of_node(call.id) else {
            return TestCall::None;
        };
        if let Some(known) = self.cache.get(&call_type) {
            return known.clone();
        }

        let properties = self.checker.properties_of_type(call_type);
        if properties.is_empty() {
            return TestCall::None;
        }

        let mut result = TestCall::None;
        for property in &properties {
            if property.name == EXPECT_CALL_PROPERTY {
                result = TestCall::Expect {
                    received: self.provided(property.type_id),
                };
                break;
            }
            if property.name == ASSERTION_CALL_PROPERTY {
                if let Some(assertion) = self.classify_assertion(property.type_id) {
                    result = TestCall::Assertion(assertion);
                }
                break;
            }
        }

        self.cache.insert(call_type, result.clone());
        result
    }

    fn classify_assertion(&self, details: TypeId) -> Option<AssertionCall> {
        let member = |name: &str| self.checker.property_of_type(details, name).map(|p| p.type_id);

        let name = match self.checker.literal_of(member(ASSERTION_NAME_PROPERTY)?) {
            Some(LiteralValue::String(name)) => name,
            _ => return None,
        };
        let assertion = assertions::lookup(&name)?;
        let state = match self.checker.literal_of(member(ASSERTION_STATE_PROPERTY)?) {
            Some(LiteralValue::Number(state)) => state.value(),
            _ => return None,
        };
        let received = self.provided(member(RECEIVED_TYPE_PROPERTY)?);
        let expected = self.provided(member(EXPECTED_TYPE_PROPERTY)?);

        Some(AssertionCall {
            assertion,
            received,
            expected,
            received_text: received.map(|id| self.checker.type_to_string(id, TypeFormat::FULL)),
            expected_text: expected.map(|id| self.checker.type_to_string(id, TypeFormat::FULL)),
            is_negated: state == STATE_NEGATED,
            needs_type_argument: assertion.needs_type_argument(),
        })
    }

    /// `None` for the placeholder of an omitted type argument
    fn provided(&self, id: TypeId) -> Option<TypeId> {
        if is_not_provided(self.checker.store(), id) {
            None
        } else {
            Some(id)
        }
    }
}

/// Locate and spell a classified call for error reporting.
///
/// An `expectType` call is reported at the call itself. An assertion reached
/// through a member access is reported at the method name, spelled with the
/// first token of the chain as its expect text. Anything else is reported at
/// the call with the whole callee as its assertion text.
pub fn post_identify_test_call(source: &SourceFile, call: &Expression, for_expect_call: bool) -> CallerInfo {
    let callee = match &call.kind {
        ExpressionKind::Call(inner) => Some(inner.callee.as_ref()),
        _ => None,
    };

    if for_expect_call {
        return CallerInfo {
            caller_span: call.span,
            expect_call_text: callee.map(|callee| source.text_of(callee.span).to_string()),
            assertion_call_text: None,
        };
    }

    match callee.map(|callee| &callee.kind) {
        Some(ExpressionKind::Member(member)) => CallerInfo {
            caller_span: member.property.span,
            expect_call_text: Some(first_token_text(source, call.span).to_string()),
            assertion_call_text: Some(source.text_of(member.property.span).to_string()),
        },
        _ => CallerInfo {
            caller_span: call.span,
            expect_call_text: None,
            assertion_call_text: callee.map(|callee| source.text_of(callee.span).to_string()),
        },
    }
}

fn first_token_text(source: &SourceFile, span: Span) -> &str {
    let fragment = source.text_of(span);
    let token = Lexer::new(fragment, Arc::new(CollectingDiagnosticHandler::new())).next_token();
    fragment.get(token.span.start..token.span.end).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::traverse_source_file;
    use crate::config::{CompileOptions, RawCompilerOptions};
    use crate::di::Container;
    use crate::fs::MockFileSystem;
    use crate::program::Program;

    fn program(text: &str) -> Program {
        let fs = MockFileSystem::new();
        fs.add_file("/probe.ts", text);
        let container = Container::with_dependencies(
            Arc::new(CollectingDiagnosticHandler::new()),
            Arc::new(fs),
        );
        let mut raw = RawCompilerOptions::new();
        raw.insert("strict".to_string(), serde_json::Value::Bool(true));
        Program::create(&CompileOptions::from_files(raw, ["/probe.ts"]), &container)
            .expect("program should build")
    }

    /// Classified calls of the probe with their caller info, in pre-order
    fn classify(program: &Program) -> Vec<(TestCall, CallerInfo)> {
        let source = &program.source_files()[0];
        let mut classifier = TestCallClassifier::new(program.type_checker());
        let mut found = Vec::new();
        traverse_source_file(source, |node| {
            let kind = classifier.identify_test_call(node);
            if let (Some(call), false) = (node.as_call(), kind == TestCall::None) {
                let caller = post_identify_test_call(source, call, matches!(kind, TestCall::Expect { .. }));
                found.push((kind, caller));
            }
        });
        found
    }

    #[test]
    fn test_expect_call_with_and_without_type() {
        let program = program("expectType<string>();\nexpectType();");
        let found = classify(&program);
        assert_eq!(found.len(), 2);

        match &found[0].0 {
            TestCall::Expect { received: Some(id) } => {
                assert_eq!(*id, program.type_checker().store().common().string)
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(found[0].1.expect_call_text.as_deref(), Some("expectType"));
        assert_eq!(found[1].0, TestCall::Expect { received: None });
    }

    #[test]
    fn test_assertion_call_through_member() {
        let program = program("expectType<\"a\">().not.toBe<string>();");
        let found = classify(&program);
        let (assertion, caller) = found
            .iter()
            .find_map(|(kind, caller)| match kind {
                TestCall::Assertion(assertion) => Some((assertion, caller)),
                _ => None,
            })
            .expect("assertion call");

        assert_eq!(assertion.assertion.name, "toBe");
        assert!(assertion.is_negated);
        assert!(assertion.needs_type_argument);
        assert_eq!(assertion.received_text.as_deref(), Some("\"a\""));
        assert_eq!(assertion.expected_text.as_deref(), Some("string"));
        assert_eq!(caller.assertion_call_text.as_deref(), Some("toBe"));
        assert_eq!(caller.expect_call_text.as_deref(), Some("expectType"));
        assert_eq!(program.source_files()[0].line_and_column(caller.caller_span.start), (1, 23));
    }

    #[test]
    fn test_unary_assertion_has_no_expected() {
        let program = program("expectType<number>().toBeNumber();");
        let assertion = classify(&program)
            .into_iter()
            .find_map(|(kind, _)| match kind {
                TestCall::Assertion(assertion) => Some(assertion),
                _ => None,
            })
            .expect("assertion call");

        assert_eq!(assertion.assertion.name, "toBeNumber");
        assert!(!assertion.is_negated);
        assert!(!assertion.needs_type_argument);
        assert_eq!(assertion.expected, None);
        assert_eq!(assertion.expected_text, None);
    }

    #[test]
    fn test_plain_calls_are_not_test_calls() {
        let program = program("function f(): string { return \"\"; }\nf();\n[1].map((x) => x);");
        assert!(classify(&program).is_empty());
    }

    #[test]
    fn test_identical_call_types_share_a_classification() {
        let program = program("expectType<string>().toBeString();\nexpectType<string>().toBeString();");
        let source = &program.source_files()[0];
        let mut classifier = TestCallClassifier::new(program.type_checker());
        let mut assertions = 0;
        traverse_source_file(source, |node| {
            if let TestCall::Assertion(_) = classifier.identify_test_call(node) {
                assertions += 1;
            }
        });
        assert_eq!(assertions, 2);
        assert_eq!(classifier.cached_len(), 2);
    }
}
