use indoc::indoc;
use typeprobe_core::compiler::compile;
use typeprobe_core::config::CompileOptions;
use typeprobe_core::di::Container;
use typeprobe_core::errors::CompilationError;
use typeprobe_test_helpers::compile::{compile_source, compile_sources, memory_container, memory_path, TempProject};
use typeprobe_test_helpers::fixtures;

fn failure_keys(source: &str) -> Vec<String> {
    compile_source(source)
        .expect("compile should succeed")
        .errors
        .keys()
        .cloned()
        .collect()
}

// ============================================================================
// Assertion catalog end to end
// ============================================================================

#[test]
fn test_passing_probe_has_no_failures() {
    let result = compile_source(fixtures::passing_probe()).unwrap();
    assert!(result.errors.is_empty(), "{:#?}", result.errors);
    assert_eq!(result.files, vec![memory_path("probe.ts")]);
}

#[test]
fn test_primitive_assertions() {
    let source = indoc! {r#"
        expectType<any>().toBeAny();
        expectType<unknown>().toBeUnknown();
        expectType<never>().toBeNever();
        expectType<void>().toBeVoid();
        expectType<undefined>().toBeUndefined();
        expectType<null>().toBeNull();
        expectType<"x">().toBeString();
        expectType<42>().toBeNumberLiteral();
        expectType<true>().toBeTrue();
        expectType<false>().toBeFalse();
        expectType<true>().toBeBooleanLiteral();
        expectType<boolean>().not.toBeBooleanLiteral();
        expectType<string>().not.toBeStringLiteral();
        expectType<any>().not.toBe<unknown>();
    "#};
    assert!(failure_keys(source).is_empty());
}

#[test]
fn test_structural_assertions() {
    let source = indoc! {r#"
        class Animal {
            name: string = "";
        }
        interface Shape {
            area: number;
        }
        type Both = Shape & { kind: string };
        const animal = new Animal();
        const list = [1, 2, 3];
        const pair: [string, number] = ["a", 1];

        expectType(animal).toBeClass();
        expectType(animal).toBeObject();
        expectType<Shape>().not.toBeClass();
        expectType(list).toBeArray();
        expectType(list).not.toBeTuple();
        expectType(pair).toBeTuple();
        expectType(pair).toBeArray();
        expectType<(value: number) => string>().toBeFunction();
        expectType<Both>().toBeIntersection();
        expectType<string | null>().toBeUnion();
        expectType<[]>().toBeArray();
        expectType<[]>().toBeTuple();
    "#};
    assert!(failure_keys(source).is_empty());
}

#[test]
fn test_relation_assertions() {
    let source = indoc! {r#"
        interface Base {
            id: number;
        }
        interface Derived extends Base {
            name: string;
        }

        expectType<Derived>().toExtends<Base>();
        expectType<Derived>().toAssignable<Base>();
        expectType<Base>().not.toCompatible<Derived>();
        expectType<Base>().toExtendsEitherWay<Derived>();
        expectType<Base>().toRelate<Derived>();
        expectType<{ id: number }>().toExtendsMutually<Base>();
        expectType<{ id: number }>().toEqual<Base>();
        expectType<string>().not.toMutual<"a">();
        expectType<any>().not.toStrictEqual<string>();
        expectType<string>().not.toRelate<number>();
        expectType<true>().toExtends<boolean>();
        expectType<boolean>().not.toExtends<true>();
    "#};
    assert!(failure_keys(source).is_empty());
}

#[test]
fn test_failures_are_keyed_by_method_location() {
    let source = indoc! {r#"
        expectType<string>().toBeNumber();
        expectType<number>()
            .not.toBeNumber();
    "#};
    assert_eq!(
        failure_keys(source),
        vec![
            format!("{}:1:22", memory_path("probe.ts")),
            format!("{}:3:10", memory_path("probe.ts")),
        ]
    );
}

#[test]
fn test_any_is_not_unknown_and_extends_is_one_way() {
    let source = indoc! {r#"
        expectType<any>().toBe<unknown>();
        expectType<boolean>().toExtends<true>();
        expectType<true>().toExtends<boolean>();
        expectType<[]>().not.toBeArray();
        expectType<[]>().not.toBeTuple();
    "#};
    let path = memory_path("probe.ts");
    assert_eq!(
        failure_keys(source),
        vec![
            format!("{}:1:19", path),
            format!("{}:2:23", path),
            format!("{}:4:22", path),
            format!("{}:5:22", path),
        ]
    );
}

#[test]
fn test_failure_details() {
    let result = compile_source(fixtures::failing_probe()).unwrap();
    let error = result
        .errors
        .get(&format!("{}:2:28", memory_path("probe.ts")))
        .expect("toBe failure");

    assert_eq!(error.line, 2);
    assert_eq!(error.column, 28);
    assert_eq!(error.received_type.as_deref(), Some("1"));
    assert_eq!(error.expected_type.as_deref(), Some("string"));
    assert!(!error.is_negated);

    let negated = result
        .errors
        .get(&format!("{}:3:26", memory_path("probe.ts")))
        .expect("negated failure");
    assert!(negated.is_negated);
    assert_eq!(negated.received_type.as_deref(), Some("string"));
}

#[test]
fn test_type_aliases_are_displayed_by_name() {
    let source = indoc! {r#"
        type Id = { value: number };
        expectType<Id>().toBe<string>();
    "#};
    let result = compile_source(source).unwrap();
    let error = result.errors.values().next().unwrap();
    assert_eq!(error.received_type.as_deref(), Some("Id"));
}

// ============================================================================
// Program shape
// ============================================================================

#[test]
fn test_imported_modules_are_checked_but_not_evaluated() {
    let result = compile_sources(
        &[
            ("probe.ts", fixtures::importing_probe()),
            ("lib/math.ts", fixtures::math_module()),
            ("lib/ignored.ts", "expectType<string>().toBeNumber();"),
        ],
        &["probe.ts"],
    )
    .unwrap();
    assert!(result.errors.is_empty(), "{:#?}", result.errors);
}

#[test]
fn test_type_errors_are_forwarded_not_fatal() {
    let (container, handler) = memory_container(&[("probe.ts", "const a: number = \"x\";\nexpectType<typeof a>().toBeNumber();")]);
    let options = CompileOptions::from_files(Default::default(), ["/project/probe.ts"]);
    let result = compile(&options, &container).unwrap();

    assert!(result.errors.is_empty());
    assert!(handler
        .messages()
        .iter()
        .any(|message| message.contains("is not assignable to type 'number'")));
}

#[test]
fn test_deep_nesting_is_a_diagnostic() {
    let source = format!(
        "const parens = {}1{};\nconst sum = {}1;\nexpectType<string>().toBeNumber();\n",
        "(".repeat(200),
        ")".repeat(200),
        "1 + ".repeat(1000)
    );
    let (container, handler) = memory_container(&[("probe.ts", source.as_str())]);
    let options = CompileOptions::from_files(Default::default(), ["/project/probe.ts"]);
    let result = compile(&options, &container).unwrap();

    assert_eq!(result.errors.keys().cloned().collect::<Vec<_>>(), vec![format!("{}:3:22", memory_path("probe.ts"))]);
    let nested = handler
        .messages()
        .iter()
        .filter(|message| message.contains("Expression nested too deeply."))
        .count();
    assert_eq!(nested, 2);
}

#[test]
fn test_unreadable_root_is_fatal() {
    let project = TempProject::new();
    std::fs::write(project.path().join("binary.ts"), [0xff, 0xfe, 0x00]).unwrap();

    let options = CompileOptions::from_files(Default::default(), [project.file_path("binary.ts")]);
    let error = compile(&options, &Container::new()).unwrap_err();
    assert!(matches!(error, CompilationError::Io(_)));
}

#[test]
fn test_invalid_shape() {
    let (container, _) = memory_container(&[]);
    let error = compile(&CompileOptions::default(), &container).unwrap_err();
    assert!(matches!(error, CompilationError::InvalidShape));
    assert!(error.to_string().contains("config"));
}

// ============================================================================
// Config files on disk
// ============================================================================

#[test]
fn test_config_project_on_disk() {
    let project = TempProject::new();
    project
        .write("typeprobe.json", fixtures::project_config())
        .write("probes/pass.ts", fixtures::passing_probe())
        .write("probes/fail.ts", fixtures::failing_probe())
        .write("node_modules/dep/index.ts", "expectType<string>().toBeNumber();");

    let result = project.compile("typeprobe.json").unwrap();
    let mut files = result.files.clone();
    files.sort();
    assert_eq!(files, vec![project.file_path("probes/fail.ts"), project.file_path("probes/pass.ts")]);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors.contains_key(&format!("{}:2:28", project.file_path("probes/fail.ts"))));
}

#[test]
fn test_extends_inherits_options() {
    let project = TempProject::new();
    project
        .write("base.json", r#"{ "compilerOptions": { "strict": true } }"#)
        .write("typeprobe.json", r#"{ "extends": "./base.json", "files": ["probe.ts"] }"#)
        .write("probe.ts", "let a: string = null as any;\nexpectType<typeof a>().toBeString();\n");

    let result = project.compile("typeprobe.json").unwrap();
    assert_eq!(result.options.strict, Some(true));
    assert!(result.errors.is_empty());
}

#[test]
fn test_missing_config_file() {
    let project = TempProject::new();
    let error = project.compile("typeprobe.json").unwrap_err();
    assert!(matches!(error, CompilationError::ReadConfig { .. }));
    assert!(error.to_string().starts_with("failed to read config file.\n"));
}

#[test]
fn test_unknown_option_is_a_diagnostic() {
    let project = TempProject::new();
    project
        .write("typeprobe.json", fixtures::unknown_option_config())
        .write("probes/a.ts", "expectType<number>().toBeNumber();");

    match project.compile("typeprobe.json").unwrap_err() {
        CompilationError::Diagnostics(messages) => {
            assert_eq!(messages, vec!["Unknown compiler option 'strictish'.".to_string()]);
        }
        other => panic!("unexpected {:?}", other),
    }
}
