//! Runtime side of a failed type assertion.
//!
//! A test run hands in the frames of the call being checked. The first frame
//! whose `file:line:column` names a recorded compile error turns into a
//! [`TypesTestingError`] with a readable message.

use crate::compiler::{create_error_key, CompileResultError};
use indexmap::IndexMap;
use std::fmt;

pub const ERROR_NAME: &str = "TypesTestingError";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const FOREGROUND_RESET: &str = "\x1b[39m";
const RESET: &str = "\x1b[0m";

/// One frame of a call stack, positions 1-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub function: Option<String>,
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl StackFrame {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        StackFrame {
            function: None,
            file: file.into(),
            line,
            column,
        }
    }

    /// Frame of the code calling this function
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        StackFrame::new(location.file(), location.line() as usize, location.column() as usize)
    }

    /// Parse a textual trace of `    at name (file:line:column)` or
    /// `    at file:line:column` lines; other lines are skipped
    pub fn parse_trace(trace: &str) -> Vec<StackFrame> {
        trace.lines().filter_map(StackFrame::parse_line).collect()
    }

    fn parse_line(line: &str) -> Option<StackFrame> {
        if !line.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = line.trim().strip_prefix("at ")?;

        let (function, location) = match rest.strip_suffix(')').and_then(|inner| inner.rsplit_once(" (")) {
            Some((function, location)) => (Some(function.to_string()), location),
            None => match rest.rsplit_once(' ') {
                Some((function, location)) => (Some(function.to_string()), location),
                None => (None, rest),
            },
        };
        let location = location.trim_start_matches('(');

        let mut parts = location.rsplitn(3, ':');
        let column = parts.next()?.parse().ok()?;
        let line = parts.next()?.parse().ok()?;
        let file = parts.next().filter(|file| !file.is_empty())?;

        Some(StackFrame {
            function,
            file: file.to_string(),
            line,
            column,
        })
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(f, "at {} ({}:{}:{})", function, self.file, self.line, self.column),
            None => write!(f, "at {}:{}:{}", self.file, self.line, self.column),
        }
    }
}

/// A recorded compile error matched to a runtime call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypesTestingError {
    name: String,
    message: String,
    key: Option<String>,
    error: Option<CompileResultError>,
}

impl TypesTestingError {
    /// Find the first frame whose resolved location is a key of `errors`.
    ///
    /// Without a match the result has an empty name and message.
    pub fn locate(
        errors: &IndexMap<String, CompileResultError>,
        frames: &[StackFrame],
        resolve: impl Fn(&str) -> String,
        colored: bool,
    ) -> TypesTestingError {
        for frame in frames {
            let key = create_error_key(&resolve(&frame.file), frame.line, frame.column);
            if let Some(found) = errors.get(&key) {
                return TypesTestingError {
                    name: ERROR_NAME.to_string(),
                    message: render_message(found, colored),
                    key: Some(key),
                    error: Some(found.clone()),
                };
            }
        }
        TypesTestingError::default()
    }

    pub fn is_located(&self) -> bool {
        self.key.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Key of the matched compile error
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn error(&self) -> Option<&CompileResultError> {
        self.error.as_ref()
    }

    /// The single frame worth showing: the probe location itself
    pub fn location(&self) -> Option<StackFrame> {
        self.error
            .as_ref()
            .map(|error| StackFrame::new(error.file_path.clone(), error.line, error.column))
    }
}

impl fmt::Display for TypesTestingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for TypesTestingError {}

fn paint(text: &str, color: &str, colored: bool) -> String {
    if colored {
        format!("{}{}{}", color, text, FOREGROUND_RESET)
    } else {
        text.to_string()
    }
}

/// Title naming the failing chain, a blank line, then the type detail
pub fn render_message(error: &CompileResultError, colored: bool) -> String {
    let expect_text = error.expect_call_text.as_ref().map(|text| match error.received_type {
        Some(_) => format!("{}<{}>()", text, paint("received", RED, colored)),
        None => format!("{}()", text),
    });
    let assertion_text = error.assertion_call_text.as_ref().map(|text| match error.expected_type {
        Some(_) => format!("{}<{}>()", text, paint("expected", GREEN, colored)),
        None => format!("{}()", text),
    });
    let title = match (expect_text, assertion_text) {
        (Some(expect), Some(assertion)) => format!("{}.{}", expect, assertion),
        (Some(text), None) | (None, Some(text)) => text,
        (None, None) => String::new(),
    };

    let detail = match (&error.received_type, &error.expected_type) {
        (None, _) => "Received type must be provided!\n".to_string(),
        (Some(_), None) if error.needs_type_argument => "Expected type must be provided!\n".to_string(),
        (Some(received), None) => format!("Received type: {}\n", paint(received, RED, colored)),
        (Some(received), Some(expected)) => format!(
            "Expected type: {}{}\nReceived type: {}\n",
            if error.is_negated { "not " } else { "" },
            paint(expected, GREEN, colored),
            paint(received, RED, colored)
        ),
    };

    let message = format!("{}\n\n{}", title, detail);
    if colored {
        format!("{}{}{}", RESET, message, RESET)
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(received: Option<&str>, expected: Option<&str>) -> CompileResultError {
        CompileResultError {
            file_path: "/p/probe.ts".to_string(),
            line: 3,
            column: 22,
            expect_call_text: Some("expectType".to_string()),
            assertion_call_text: Some("toBe".to_string()),
            received_type: received.map(str::to_string),
            expected_type: expected.map(str::to_string),
            is_negated: false,
            needs_type_argument: true,
        }
    }

    fn errors(list: Vec<CompileResultError>) -> IndexMap<String, CompileResultError> {
        list.into_iter().map(|error| (error.key(), error)).collect()
    }

    #[test]
    fn test_parse_trace_lines() {
        let trace = "Error\n    at Object.<anonymous> (/p/probe.test.ts:3:22)\n    at /p/runner.js:10:5\n  at async run (/p/a b.js:1:2)\nnot a frame";
        let frames = StackFrame::parse_trace(trace);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].function.as_deref(), Some("Object.<anonymous>"));
        assert_eq!(frames[0].file, "/p/probe.test.ts");
        assert_eq!((frames[0].line, frames[0].column), (3, 22));
        assert_eq!(frames[1], StackFrame::new("/p/runner.js", 10, 5));
        assert_eq!(frames[2].function.as_deref(), Some("async run"));
        assert_eq!(frames[2].file, "/p/a b.js");
    }

    #[test]
    fn test_caller_frame_points_here() {
        let frame = StackFrame::caller();
        assert!(frame.file.ends_with("testing_error.rs"));
        assert!(frame.line > 1);
    }

    #[test]
    fn test_full_message() {
        let message = render_message(&error(Some("1"), Some("string")), false);
        assert_eq!(
            message,
            "expectType<received>().toBe<expected>()\n\nExpected type: string\nReceived type: 1\n"
        );
    }

    #[test]
    fn test_negated_message() {
        let mut negated = error(Some("string"), Some("string"));
        negated.is_negated = true;
        assert!(render_message(&negated, false).contains("Expected type: not string\n"));
    }

    #[test]
    fn test_missing_types() {
        let mut bare = error(None, None);
        bare.assertion_call_text = None;
        assert_eq!(render_message(&bare, false), "expectType()\n\nReceived type must be provided!\n");

        assert_eq!(
            render_message(&error(Some("string"), None), false),
            "expectType<received>().toBe()\n\nExpected type must be provided!\n"
        );

        let mut unary = error(Some("number"), None);
        unary.needs_type_argument = false;
        unary.assertion_call_text = Some("toBeString".to_string());
        assert_eq!(
            render_message(&unary, false),
            "expectType<received>().toBeString()\n\nReceived type: number\n"
        );
    }

    #[test]
    fn test_colored_message() {
        let message = render_message(&error(Some("1"), Some("string")), true);
        assert!(message.starts_with(RESET));
        assert!(message.contains("\x1b[31mreceived\x1b[39m"));
        assert!(message.contains("\x1b[32mstring\x1b[39m"));
    }

    #[test]
    fn test_locate_first_matching_frame() {
        let recorded = errors(vec![error(Some("1"), Some("string"))]);
        let frames = vec![
            StackFrame::new("./probe.ts", 3, 22),
            StackFrame::new("/p/other.ts", 3, 22),
        ];
        let located = TypesTestingError::locate(
            &recorded,
            &frames,
            |file| file.replace("./", "/p/"),
            false,
        );
        assert!(located.is_located());
        assert_eq!(located.name(), ERROR_NAME);
        assert_eq!(located.key(), Some("/p/probe.ts:3:22"));
        assert_eq!(located.location(), Some(StackFrame::new("/p/probe.ts", 3, 22)));
        assert!(located.to_string().starts_with("TypesTestingError: expectType"));
    }

    #[test]
    fn test_no_match_is_empty() {
        let recorded = errors(vec![error(Some("1"), Some("string"))]);
        let located = TypesTestingError::locate(
            &recorded,
            &[StackFrame::new("/p/probe.ts", 4, 1)],
            str::to_string,
            false,
        );
        assert!(!located.is_located());
        assert_eq!(located.name(), "");
        assert_eq!(located.message(), "");
    }
}
