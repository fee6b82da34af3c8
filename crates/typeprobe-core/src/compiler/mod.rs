//! Compile-time evaluation of `expectType(...)` chains.
//!
//! [`compile`] builds a [`Program`](crate::program::Program), walks every
//! root file, classifies call expressions by their static type and evaluates
//! each assertion. Failures are collected under a `file:line:column` key.

mod compile;
mod error_key;
mod error_value;
mod introspect;
mod traverse;
mod validate;

pub use compile::{compile, compile_program, CompileResult};
pub use error_key::create_error_key;
pub use error_value::{create_error_value, CompileResultError};
pub use introspect::{post_identify_test_call, AssertionCall, CallerInfo, TestCall, TestCallClassifier};
pub use traverse::{traverse_node, traverse_source_file};
pub use validate::{validate_assertion, ValidateAssertionParams};
