use typeprobe_core::session::{Session, SessionError, SessionOptions};
use typeprobe_core::testing_error::StackFrame;
use typeprobe_test_helpers::compile::{memory_container, memory_path, strict_options, TempProject};
use typeprobe_test_helpers::fixtures;

fn memory_session(source: &str) -> Session {
    let (container, _) = memory_container(&[("probe.ts", source)]);
    Session::with_container(
        SessionOptions::from_files(strict_options(), [memory_path("probe.ts")]),
        container,
    )
}

#[test]
fn test_frames_from_a_runner_trace() {
    let mut session = memory_session(fixtures::failing_probe());
    let trace = format!(
        "Error\n    at Object.<anonymous> ({}:2:28)\n    at run (/runner/index.js:10:3)",
        memory_path("probe.ts")
    );
    let frames = StackFrame::parse_trace(&trace);

    let error = session
        .expect_type(&[])
        .unwrap()
        .to_be(&frames)
        .unwrap_err();
    let SessionError::Assertion(error) = error else {
        panic!("expected an assertion failure");
    };
    assert_eq!(error.name(), "TypesTestingError");
    assert_eq!(
        error.message(),
        "expectType<received>().toBe<expected>()\n\nExpected type: string\nReceived type: 1\n"
    );
    assert_eq!(error.location(), Some(StackFrame::new(memory_path("probe.ts"), 2, 28)));
}

#[test]
fn test_each_error_is_raised_once() {
    let mut session = memory_session(fixtures::failing_probe());
    let negated_site = [StackFrame::new(memory_path("probe.ts"), 3, 26)];

    assert!(session.expect_type(&[]).unwrap().not().to_be_string(&negated_site).is_err());
    assert!(session.expect_type(&[]).unwrap().not().to_be_string(&negated_site).is_ok());
    assert_eq!(session.compile_result().unwrap().errors.len(), 1);
}

#[test]
fn test_expect_site_raises_missing_type() {
    let mut session = memory_session(fixtures::missing_type_probe());
    let site = [StackFrame::new(memory_path("probe.ts"), 1, 1)];

    match session.expect_type(&site) {
        Err(SessionError::Assertion(error)) => {
            assert!(error.message().ends_with("Received type must be provided!\n"));
            assert!(error.message().starts_with("expectType()"));
        }
        Err(other) => panic!("unexpected {:?}", other),
        Ok(_) => panic!("expected the missing type to be raised"),
    };
}

#[test]
fn test_session_from_config_file() {
    let project = TempProject::new();
    project
        .write("typeprobe.json", fixtures::project_config())
        .write("probes/fail.ts", fixtures::failing_probe());

    let mut session = Session::new(SessionOptions {
        auto_prepare: false,
        ..SessionOptions::from_config_file(project.path(), "typeprobe.json")
    });
    assert!(matches!(session.expect_type(&[]), Err(SessionError::NotPrepared)));

    session.prepare(None).unwrap();
    let site = [StackFrame::new(project.file_path("probes/fail.ts"), 2, 28)];
    assert!(session.expect_type(&[]).unwrap().to_equal(&site).is_err());
}

#[test]
fn test_configuration_errors_surface_through_expect_type() {
    let mut session = Session::new(SessionOptions::default());
    match session.expect_type(&[]) {
        Err(SessionError::Compilation(error)) => {
            assert!(error.to_string().contains("configFileName"));
        }
        Err(other) => panic!("unexpected {:?}", other),
        Ok(_) => panic!("expected a compilation error"),
    };
}
