pub mod assertions;
pub mod ast;
pub mod compiler;
pub mod config;
pub mod di;
pub mod diagnostics;
pub mod errors;
pub mod fs;
pub mod lexer;
pub mod parser;
pub mod program;
pub mod session;
pub mod span;
pub mod testing_error;
pub mod typechecker;

pub use assertions::Assertion;
pub use compiler::{compile, CompileResult, CompileResultError};
pub use config::{CompileOptions, CompilerOptions, ConfigFile, ProjectReference, RawCompilerOptions};
pub use di::Container;
pub use diagnostics::{Diagnostic, DiagnosticHandler};
pub use errors::CompilationError;
pub use program::{Program, SourceFile};
pub use session::{Assertions, PrepareOverrides, Session, SessionError, SessionOptions};
pub use testing_error::{StackFrame, TypesTestingError};
pub use typechecker::{TypeChecker, TypeId};
