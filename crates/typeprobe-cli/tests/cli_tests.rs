use assert_cmd::Command;
use indoc::indoc;
use predicates::prelude::*;
use typeprobe_test_helpers::compile::TempProject;
use typeprobe_test_helpers::fixtures;

fn typeprobe_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("typeprobe"))
}

// ============================================================================
// PROJECT INITIALIZATION TESTS
// ============================================================================

#[test]
fn test_init_creates_project() {
    let project = TempProject::new();

    typeprobe_cmd()
        .current_dir(project.path())
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("typeprobe.json"));

    assert!(project.path().join("typeprobe.json").exists());
    assert!(project.path().join("probes/example.ts").exists());

    let config = project.read("typeprobe.json");
    assert!(config.contains("compilerOptions"));
    assert!(config.contains("probes/**/*.ts"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let project = TempProject::new();
    project.write("typeprobe.json", "{}");

    typeprobe_cmd()
        .current_dir(project.path())
        .arg("--init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_initialized_project_passes() {
    let project = TempProject::new();
    typeprobe_cmd().current_dir(project.path()).arg("--init").assert().success();

    typeprobe_cmd()
        .current_dir(project.path())
        .arg("--color=never")
        .assert()
        .success()
        .stdout(predicate::str::contains("All type assertions passed (1 file(s))"));
}

// ============================================================================
// CHECKING TESTS
// ============================================================================

#[test]
fn test_passing_file() {
    let project = TempProject::new();
    project.write("probe.ts", fixtures::passing_probe());

    typeprobe_cmd()
        .current_dir(project.path())
        .args(["--strict", "--color", "never", "probe.ts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All type assertions passed"));
}

#[test]
fn test_failing_file_reports_locations() {
    let project = TempProject::new();
    project.write("probe.ts", fixtures::failing_probe());
    let path = project.file_path("probe.ts");

    typeprobe_cmd()
        .current_dir(project.path())
        .args(["--color", "never", "probe.ts"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(format!("{}:2:28", path)))
        .stdout(predicate::str::contains("expectType<received>().toBe<expected>()"))
        .stdout(predicate::str::contains("Expected type: string\nReceived type: 1"))
        .stdout(predicate::str::contains(format!("{}:3:26", path)))
        .stdout(predicate::str::contains("2 failing type assertion(s) in 1 file(s)"));
}

#[test]
fn test_missing_received_type_is_reported() {
    let project = TempProject::new();
    project.write("probe.ts", fixtures::missing_type_probe());

    typeprobe_cmd()
        .current_dir(project.path())
        .args(["--color", "never", "probe.ts"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Received type must be provided!"));
}

#[test]
fn test_project_flag() {
    let project = TempProject::new();
    project.write("config/typeprobe.json", indoc! {r#"
        {
            "compilerOptions": { "strict": true },
            "include": ["probes/**/*.ts"]
        }
    "#});
    project.write("config/probes/a.ts", "expectType<number>().toBeNumber();\n");
    project.write("config/probes/nested/b.ts", "expectType<null>().toBeNull();\n");

    typeprobe_cmd()
        .current_dir(project.path())
        .args(["--color=never", "-p", "config/typeprobe.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 file(s))"));
}

#[test]
fn test_default_config_discovery() {
    let project = TempProject::new();
    project.write("typeprobe.json", fixtures::project_config());
    project.write("probes/fail.ts", "expectType<string>().toBeNumber();\n");

    typeprobe_cmd()
        .current_dir(project.path())
        .arg("--color=never")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("probes/fail.ts:1:22"));
}

#[test]
fn test_yaml_config() {
    let project = TempProject::new();
    project.write("typeprobe.yaml", fixtures::yaml_project_config());
    project.write("probes/ok.ts", "expectType<boolean>().toBeBoolean();\n");

    typeprobe_cmd()
        .current_dir(project.path())
        .arg("--color=never")
        .assert()
        .success();
}

#[test]
fn test_json_output() {
    let project = TempProject::new();
    project.write("probe.ts", fixtures::failing_probe());

    let output = typeprobe_cmd()
        .current_dir(project.path())
        .args(["--json", "probe.ts"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let errors = json["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 2);
    let first = errors.values().next().unwrap();
    assert_eq!(first["receivedType"], "1");
    assert_eq!(first["expectedType"], "string");
    assert_eq!(first["assertionCallText"], "toBe");
}

#[test]
fn test_colored_output() {
    let project = TempProject::new();
    project.write("probe.ts", fixtures::failing_probe());

    typeprobe_cmd()
        .current_dir(project.path())
        .args(["--color=always", "probe.ts"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\x1b[31mreceived\x1b[39m"));
}

// ============================================================================
// ERROR TESTS
// ============================================================================

#[test]
fn test_no_inputs() {
    let project = TempProject::new();

    typeprobe_cmd()
        .current_dir(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input files specified"));
}

#[test]
fn test_malformed_config() {
    let project = TempProject::new();
    project.write("typeprobe.json", "{ not json");

    typeprobe_cmd()
        .current_dir(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file."));
}

#[test]
fn test_unknown_compiler_option() {
    let project = TempProject::new();
    project.write("typeprobe.json", fixtures::unknown_option_config());
    project.write("probes/a.ts", "expectType<number>().toBeNumber();\n");

    typeprobe_cmd()
        .current_dir(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("strictish"));
}

#[test]
fn test_diagnostics_flag_prints_type_errors() {
    let project = TempProject::new();
    project.write("probe.ts", "const a: number = \"x\";\nexpectType<typeof a>().toBeNumber();\n");

    typeprobe_cmd()
        .current_dir(project.path())
        .args(["--diagnostics", "--color=never", "probe.ts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("is not assignable to type 'number'"));
}
