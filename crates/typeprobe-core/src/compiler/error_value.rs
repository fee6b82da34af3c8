use super::error_key::create_error_key;
use super::introspect::CallerInfo;
use crate::program::SourceFile;
use serde::{Deserialize, Serialize};

/// A failed or malformed test call, located at its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResultError {
    /// Normalized absolute path of the probe file
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_call_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion_call_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<String>,
    #[serde(default)]
    pub is_negated: bool,
    #[serde(default)]
    pub needs_type_argument: bool,
}

impl CompileResultError {
    /// Attach the types of a failed assertion
    pub fn with_types(
        mut self,
        received_type: Option<String>,
        expected_type: Option<String>,
        is_negated: bool,
        needs_type_argument: bool,
    ) -> Self {
        self.received_type = received_type;
        self.expected_type = expected_type;
        self.is_negated = is_negated;
        self.needs_type_argument = needs_type_argument;
        self
    }

    /// `path:line:column` of the caller
    pub fn key(&self) -> String {
        create_error_key(&self.file_path, self.line, self.column)
    }
}

/// Error located at the start of the caller node, with 1-based position
pub fn create_error_value(source: &SourceFile, caller: &CallerInfo) -> CompileResultError {
    let (line, column) = source.line_and_column(caller.caller_span.start);
    CompileResultError {
        file_path: source.path.clone(),
        line,
        column,
        expect_call_text: caller.expect_call_text.clone(),
        assertion_call_text: caller.assertion_call_text.clone(),
        received_type: None,
        expected_type: None,
        is_negated: false,
        needs_type_argument: false,
    }
}
