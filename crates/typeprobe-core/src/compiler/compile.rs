use super::error_value::{create_error_value, CompileResultError};
use super::introspect::{post_identify_test_call, TestCall, TestCallClassifier};
use super::traverse::traverse_source_file;
use super::validate::{validate_assertion, ValidateAssertionParams};
use crate::config::{CompileOptions, CompilerOptions};
use crate::di::Container;
use crate::errors::CompilationError;
use crate::program::{Program, SourceFile};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of one compile: every failing test call, keyed by location
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    /// Root files of the program
    pub files: Vec<String>,
    pub options: CompilerOptions,
    /// In discovery order; a later error at the same key replaces the earlier
    pub errors: IndexMap<String, CompileResultError>,
}

impl CompileResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Build the program described by `options` and evaluate every test call
/// in its root files
pub fn compile(options: &CompileOptions, container: &Container) -> Result<CompileResult, CompilationError> {
    let program = Program::create(options, container)?;
    Ok(compile_program(&program))
}

/// Evaluate the test calls of an already built program
pub fn compile_program(program: &Program) -> CompileResult {
    let mut classifier = TestCallClassifier::new(program.type_checker());
    let mut errors = IndexMap::new();

    for file_name in program.root_file_names() {
        let Some(source) = program.source_file(file_name) else {
            debug!(file = %file_name, "skipping root without a source file");
            continue;
        };
        debug!(file = %source.path, "evaluating test calls");
        traverse_source_file(source, |node| {
            let test_call = classifier.identify_test_call(node);
            let Some(call) = node.as_call() else {
                return;
            };
            let error = match test_call {
                TestCall::None => None,
                TestCall::Expect { received: Some(_) } => None,
                TestCall::Expect { received: None } => {
                    let caller = post_identify_test_call(source, call, true);
                    Some(create_error_value(source, &caller))
                }
                TestCall::Assertion(assertion) => {
                    let caller = post_identify_test_call(source, call, false);
                    match assertion.received {
                        None => Some(create_error_value(source, &caller)),
                        Some(received) => {
                            let valid = validate_assertion(
                                assertion.assertion,
                                ValidateAssertionParams {
                                    checker: program.type_checker(),
                                    received,
                                    expected: assertion.expected,
                                    is_negated: assertion.is_negated,
                                },
                            );
                            (!valid).then(|| {
                                create_error_value(source, &caller).with_types(
                                    assertion.received_text,
                                    assertion.expected_text,
                                    assertion.is_negated,
                                    assertion.needs_type_argument,
                                )
                            })
                        }
                    }
                }
            };
            if let Some(error) = error {
                record_error(&mut errors, source, error);
            }
        });
    }

    info!(
        files = program.root_file_names().len(),
        references = program.project_references().len(),
        failures = errors.len(),
        "compiled probe files"
    );

    CompileResult {
        files: program.root_file_names().to_vec(),
        options: program.compiler_options().clone(),
        errors,
    }
}

fn record_error(errors: &mut IndexMap<String, CompileResultError>, source: &SourceFile, error: CompileResultError) {
    let key = error.key();
    debug!(%key, "test call failed");
    if errors.insert(key.clone(), error).is_some() {
        warn!(file = %source.path, %key, "two test calls share one location; keeping the later");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawCompilerOptions;
    use crate::diagnostics::CollectingDiagnosticHandler;
    use crate::fs::MockFileSystem;
    use std::sync::Arc;

    fn compile_probe(text: &str) -> CompileResult {
        let fs = MockFileSystem::new();
        fs.add_file("/p/probe.ts", text);
        let container = Container::with_dependencies(
            Arc::new(CollectingDiagnosticHandler::new()),
            Arc::new(fs),
        );
        let mut raw = RawCompilerOptions::new();
        raw.insert("strict".to_string(), serde_json::Value::Bool(true));
        compile(&CompileOptions::from_files(raw, ["/p/probe.ts"]), &container).unwrap()
    }

    #[test]
    fn test_passing_assertions_record_nothing() {
        let result = compile_probe(
            "expectType<string>().toBeString();\n\
             expectType<1>().toBeNumberLiteral();\n\
             expectType<\"a\">().toExtends<string>();\n\
             expectType<string>().not.toBe<number>();",
        );
        assert!(!result.has_errors(), "{:?}", result.errors);
        assert_eq!(result.files, vec!["/p/probe.ts".to_string()]);
        assert_eq!(result.options.strict, Some(true));
    }

    #[test]
    fn test_failed_assertion_is_located_at_the_method() {
        let result = compile_probe("const a = 1;\nexpectType<typeof a>().toBe<string>();");
        assert_eq!(result.errors.len(), 1);

        let (key, error) = result.errors.first().unwrap();
        assert_eq!(key, "/p/probe.ts:2:24");
        assert_eq!(error.expect_call_text.as_deref(), Some("expectType"));
        assert_eq!(error.assertion_call_text.as_deref(), Some("toBe"));
        assert_eq!(error.received_type.as_deref(), Some("1"));
        assert_eq!(error.expected_type.as_deref(), Some("string"));
        assert!(!error.is_negated);
        assert!(error.needs_type_argument);
    }

    #[test]
    fn test_failed_negated_assertion() {
        let result = compile_probe("expectType<string>().not.toBeString();");
        let error = result.errors.get("/p/probe.ts:1:26").expect("negated failure");
        assert!(error.is_negated);
        assert!(!error.needs_type_argument);
        assert_eq!(error.expected_type, None);
    }

    #[test]
    fn test_missing_received_type() {
        let result = compile_probe("expectType();\nexpectType().toBeString();");
        let keys: Vec<&String> = result.errors.keys().collect();
        assert_eq!(keys, vec!["/p/probe.ts:1:1", "/p/probe.ts:2:14", "/p/probe.ts:2:1"]);

        let bare = &result.errors["/p/probe.ts:1:1"];
        assert_eq!(bare.expect_call_text.as_deref(), Some("expectType"));
        assert_eq!(bare.assertion_call_text, None);
        assert_eq!(bare.received_type, None);

        let chained = &result.errors["/p/probe.ts:2:14"];
        assert_eq!(chained.assertion_call_text.as_deref(), Some("toBeString"));
        assert_eq!(chained.received_type, None);
    }

    #[test]
    fn test_binary_assertion_without_expected_fails() {
        let result = compile_probe("expectType<string>().toBe();");
        let error = result.errors.get("/p/probe.ts:1:22").expect("missing expected");
        assert_eq!(error.expected_type, None);
        assert!(error.needs_type_argument);
    }

    #[test]
    fn test_errors_keep_discovery_order() {
        let result = compile_probe(
            "expectType<number>().toBeString();\n\
             expectType<string>().toBeNumber();\n\
             expectType<boolean>().toBeNull();",
        );
        let lines: Vec<usize> = result.errors.values().map(|error| error.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_only_root_files_are_evaluated() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/probe.ts", "import { value } from \"./lib\";\nexpectType<typeof value>().toBeNumber();");
        fs.add_file("/p/lib.ts", "export const value: number = 1;\nexpectType<string>().toBeNumber();");
        let container = Container::with_dependencies(
            Arc::new(CollectingDiagnosticHandler::new()),
            Arc::new(fs),
        );
        let result = compile(
            &CompileOptions::from_files(RawCompilerOptions::new(), ["/p/probe.ts"]),
            &container,
        )
        .unwrap();
        assert!(!result.has_errors(), "{:?}", result.errors);
    }

    #[test]
    fn test_invalid_shape_is_fatal() {
        let container = Container::with_dependencies(
            Arc::new(CollectingDiagnosticHandler::new()),
            Arc::new(MockFileSystem::new()),
        );
        let error = compile(&CompileOptions::default(), &container).unwrap_err();
        assert!(matches!(error, CompilationError::InvalidShape));
    }
}
