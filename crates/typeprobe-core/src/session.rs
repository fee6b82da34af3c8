//! Developer-facing façade over [`compile`].
//!
//! A [`Session`] compiles its probe files once and then answers
//! `expect_type` calls made from a test run. Every call hands in the frames
//! of the call site; a frame matching a recorded compile error raises that
//! error exactly once.

use crate::compiler::{compile, CompileResult};
use crate::config::{CompileOptions, ProjectReference, RawCompilerOptions};
use crate::di::Container;
use crate::errors::CompilationError;
use crate::fs::path_to_string;
use crate::testing_error::{StackFrame, TypesTestingError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("need to run prepare first.")]
    NotPrepared,

    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error(transparent)]
    Assertion(#[from] TypesTestingError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Compile on the first `expect_type` call when not yet prepared
    pub auto_prepare: bool,
    pub base_path: Option<PathBuf>,
    pub config_file_name: Option<String>,
    pub compiler_options: Option<RawCompilerOptions>,
    pub files: Option<Vec<String>>,
    pub project_references: Option<Vec<ProjectReference>>,
    /// Paint raised messages with ANSI colours
    pub colored: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            auto_prepare: true,
            base_path: None,
            config_file_name: None,
            compiler_options: None,
            files: None,
            project_references: None,
            colored: false,
        }
    }
}

impl SessionOptions {
    pub fn from_config_file(base_path: impl Into<PathBuf>, config_file_name: impl Into<String>) -> Self {
        SessionOptions {
            base_path: Some(base_path.into()),
            config_file_name: Some(config_file_name.into()),
            ..Self::default()
        }
    }

    pub fn from_files<I, S>(compiler_options: RawCompilerOptions, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SessionOptions {
            compiler_options: Some(compiler_options),
            files: Some(files.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            base_path: self.base_path.clone(),
            config_file_name: self.config_file_name.clone(),
            compiler_options: self.compiler_options.clone(),
            files: self.files.clone(),
            project_references: self.project_references.clone(),
        }
    }
}

/// Call-time replacements for the compile-related session options
pub type PrepareOverrides = CompileOptions;

pub struct Session {
    options: SessionOptions,
    container: Container,
    compile_result: Option<CompileResult>,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Session::with_container(options, Container::new())
    }

    pub fn with_container(options: SessionOptions, container: Container) -> Self {
        Session {
            options,
            container,
            compile_result: None,
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.compile_result.is_some()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Errors not raised yet, once prepared
    pub fn compile_result(&self) -> Option<&CompileResult> {
        self.compile_result.as_ref()
    }

    /// Compile the probe files unless already prepared
    pub fn prepare(&mut self, overrides: Option<&PrepareOverrides>) -> Result<&mut Self, CompilationError> {
        if self.is_prepared() {
            return Ok(self);
        }
        let options = match overrides {
            Some(overrides) => self.options.compile_options().merged_with(overrides),
            None => self.options.compile_options(),
        };
        let result = compile(&options, &self.container)?;
        debug!(pending = result.errors.len(), "session prepared");
        self.compile_result = Some(result);
        Ok(self)
    }

    /// Drop the compile result, then compile again when `rerun` is set.
    ///
    /// Does nothing when not prepared.
    pub fn reset(&mut self, rerun: bool) -> Result<(), CompilationError> {
        if !self.is_prepared() {
            return Ok(());
        }
        self.compile_result = None;
        if rerun {
            self.prepare(None)?;
        }
        Ok(())
    }

    /// Start an assertion chain for the call site described by `frames`
    pub fn expect_type(&mut self, frames: &[StackFrame]) -> Result<Assertions<'_>, SessionError> {
        if !self.is_prepared() {
            if !self.options.auto_prepare {
                return Err(SessionError::NotPrepared);
            }
            self.prepare(None)?;
        }
        self.raise_recorded(frames)?;
        Ok(Assertions {
            session: self,
            negated: false,
        })
    }

    /// Fail with the first recorded error matching `frames`, consuming it
    fn raise_recorded(&mut self, frames: &[StackFrame]) -> Result<(), TypesTestingError> {
        let Some(result) = self.compile_result.as_mut() else {
            return Ok(());
        };
        let fs = self.container.file_system();
        let located = TypesTestingError::locate(
            &result.errors,
            frames,
            |file| path_to_string(&fs.resolve_path(Path::new(file))),
            self.options.colored,
        );
        match located.key() {
            Some(key) => {
                result.errors.shift_remove(key);
                Err(located)
            }
            None => Ok(()),
        }
    }
}

/// Runtime counterpart of the `Assertions` marker type.
///
/// Every method only checks the call site against the recorded errors; the
/// assertion itself was decided at compile time.
pub struct Assertions<'s> {
    session: &'s mut Session,
    negated: bool,
}

impl<'s> Assertions<'s> {
    /// The mirror reached through `.not`
    pub fn not(self) -> Assertions<'s> {
        Assertions {
            session: self.session,
            negated: !self.negated,
        }
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Shared dispatch of every assertion method
    pub fn call(self, name: &str, frames: &[StackFrame]) -> Result<(), SessionError> {
        debug!(assertion = name, "checking call site");
        self.session.raise_recorded(frames)?;
        Ok(())
    }
}

macro_rules! assertion_methods {
    ($($method:ident => $name:literal),* $(,)?) => {
        impl<'s> Assertions<'s> {
            $(
                #[doc = concat!("Call site of `", $name, "`")]
                pub fn $method(self, frames: &[StackFrame]) -> Result<(), SessionError> {
                    self.call($name, frames)
                }
            )*
        }

        /// Assertion names reachable through [`Assertions`]
        pub const ASSERTION_METHOD_NAMES: &[&str] = &[$($name),*];
    };
}

assertion_methods! {
    to_be_any => "toBeAny",
    to_be_unknown => "toBeUnknown",
    to_be_never => "toBeNever",
    to_be_void => "toBeVoid",
    to_be_undefined => "toBeUndefined",
    to_be_null => "toBeNull",
    to_be_string => "toBeString",
    to_be_number => "toBeNumber",
    to_be_boolean => "toBeBoolean",
    to_be_string_literal => "toBeStringLiteral",
    to_be_number_literal => "toBeNumberLiteral",
    to_be_boolean_literal => "toBeBooleanLiteral",
    to_be_true => "toBeTrue",
    to_be_false => "toBeFalse",
    to_be_object => "toBeObject",
    to_be_array => "toBeArray",
    to_be_tuple => "toBeTuple",
    to_be_function => "toBeFunction",
    to_be_class => "toBeClass",
    to_be_union => "toBeUnion",
    to_be_intersection => "toBeIntersection",
    to_be => "toBe",
    to_equal => "toEqual",
    to_strict_equal => "toStrictEqual",
    to_extends => "toExtends",
    to_assignable => "toAssignable",
    to_compatible => "toCompatible",
    to_extends_mutually => "toExtendsMutually",
    to_assignable_mutually => "toAssignableMutually",
    to_mutual => "toMutual",
    to_extends_either_way => "toExtendsEitherWay",
    to_assignable_either_way => "toAssignableEitherWay",
    to_relate => "toRelate",
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions;
    use crate::diagnostics::CollectingDiagnosticHandler;
    use crate::fs::MockFileSystem;
    use std::sync::Arc;

    const PROBE: &str = "expectType<string>().toBeString();\nexpectType<number>().toBeString();";

    fn session(auto_prepare: bool) -> Session {
        let fs = MockFileSystem::with_current_dir("/p");
        fs.add_file("/p/probe.ts", PROBE);
        let container = Container::with_dependencies(
            Arc::new(CollectingDiagnosticHandler::new()),
            Arc::new(fs),
        );
        let options = SessionOptions {
            auto_prepare,
            ..SessionOptions::from_files(RawCompilerOptions::new(), ["/p/probe.ts"])
        };
        Session::with_container(options, container)
    }

    #[test]
    fn test_method_names_match_catalog() {
        let names: Vec<&str> = assertions::names().collect();
        assert_eq!(ASSERTION_METHOD_NAMES, names.as_slice());
    }

    #[test]
    fn test_not_prepared_without_auto_prepare() {
        let mut session = session(false);
        let error = session.expect_type(&[]).err().expect("should fail");
        assert!(matches!(error, SessionError::NotPrepared));
        assert_eq!(error.to_string(), "need to run prepare first.");
    }

    #[test]
    fn test_auto_prepare_on_first_call() {
        let mut session = session(true);
        assert!(!session.is_prepared());
        session.expect_type(&[]).unwrap().to_be_string(&[]).unwrap();
        assert!(session.is_prepared());
        assert_eq!(session.compile_result().unwrap().errors.len(), 1);
    }

    #[test]
    fn test_matching_frame_raises_once() {
        let mut session = session(true);
        let frame = [StackFrame::new("probe.ts", 2, 22)];

        let error = session
            .expect_type(&[])
            .unwrap()
            .to_be_string(&frame)
            .err()
            .expect("recorded failure");
        match error {
            SessionError::Assertion(error) => {
                assert_eq!(error.name(), "TypesTestingError");
                assert_eq!(error.key(), Some("/p/probe.ts:2:22"));
            }
            other => panic!("unexpected {:?}", other),
        }

        session.expect_type(&[]).unwrap().to_be_string(&frame).unwrap();
        assert!(session.compile_result().unwrap().errors.is_empty());
    }

    #[test]
    fn test_negated_mirror_shares_dispatch() {
        let mut session = session(true);
        let assertions = session.expect_type(&[]).unwrap().not();
        assert!(assertions.is_negated());
        assert!(assertions.not().call("toBe", &[StackFrame::new("/p/probe.ts", 2, 22)]).is_err());
    }

    #[test]
    fn test_reset_and_rerun() {
        let mut session = session(false);
        session.reset(true).unwrap();
        assert!(!session.is_prepared());

        session.prepare(None).unwrap();
        session
            .expect_type(&[])
            .unwrap()
            .to_be_string(&[StackFrame::new("/p/probe.ts", 2, 22)])
            .unwrap_err();
        assert!(session.compile_result().unwrap().errors.is_empty());

        session.reset(true).unwrap();
        assert!(session.is_prepared());
        assert_eq!(session.compile_result().unwrap().errors.len(), 1);

        session.reset(false).unwrap();
        assert!(!session.is_prepared());
    }

    #[test]
    fn test_prepare_overrides_win() {
        let mut session = session(false);
        let overrides = CompileOptions {
            files: Some(vec!["/p/missing.ts".to_string()]),
            ..CompileOptions::default()
        };
        session.prepare(Some(&overrides)).unwrap();
        assert_eq!(session.compile_result().unwrap().files, vec!["/p/missing.ts".to_string()]);
        assert!(session.compile_result().unwrap().errors.is_empty());
    }
}
