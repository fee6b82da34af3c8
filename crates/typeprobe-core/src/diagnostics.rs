use crate::span::Span;
use std::fmt;
use std::sync::Mutex;

/// An error message with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
    /// Normalized path of the file the diagnostic belongs to, if any
    pub file: Option<String>,
}

impl Diagnostic {
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            file: None,
        }
    }

    /// Diagnostic that is not tied to any source position (configuration problems)
    pub fn global(message: impl Into<String>) -> Self {
        Self::error(Span::dummy(), message)
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "error at {}:{}: {}", file, self.span, self.message),
            None => write!(f, "error: {}", self.message),
        }
    }
}

/// Trait for handling diagnostics
/// This allows for dependency injection and testing with mock handlers
pub trait DiagnosticHandler: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    fn error(&self, span: Span, message: &str) {
        self.report(Diagnostic::error(span, message));
    }

    fn has_errors(&self) -> bool;
    fn error_count(&self) -> usize;
    fn get_diagnostics(&self) -> Vec<Diagnostic>;
}

fn count(diagnostics: &Mutex<Vec<Diagnostic>>) -> usize {
    diagnostics.lock().map(|list| list.len()).unwrap_or(0)
}

fn snapshot(diagnostics: &Mutex<Vec<Diagnostic>>) -> Vec<Diagnostic> {
    diagnostics
        .lock()
        .map(|list| list.clone())
        .unwrap_or_default()
}

/// Console-based diagnostic handler that prints to stderr
pub struct ConsoleDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
    pretty: bool,
}

impl ConsoleDiagnosticHandler {
    pub fn new(pretty: bool) -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            pretty,
        }
    }
}

impl DiagnosticHandler for ConsoleDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        if self.pretty {
            eprintln!("\x1b[1m{}\x1b[0m", diagnostic);
        } else {
            eprintln!("{}", diagnostic);
        }

        if let Ok(mut list) = self.diagnostics.lock() {
            list.push(diagnostic);
        }
    }

    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn error_count(&self) -> usize {
        count(&self.diagnostics)
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        snapshot(&self.diagnostics)
    }
}

/// Collecting diagnostic handler
/// Collects all diagnostics without printing
pub struct CollectingDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnosticHandler {
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
        }
    }
}

impl Default for CollectingDiagnosticHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticHandler for CollectingDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut list) = self.diagnostics.lock() {
            list.push(diagnostic);
        }
    }

    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn error_count(&self) -> usize {
        count(&self.diagnostics)
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        snapshot(&self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let span = Span::new(0, 5, 1, 1);
        let diag = Diagnostic::error(span, "Test error");

        assert_eq!(diag.span, span);
        assert_eq!(diag.message, "Test error");
        assert!(diag.file.is_none());
    }

    #[test]
    fn test_display_with_file() {
        let diag = Diagnostic::error(Span::new(4, 9, 2, 5), "Cannot find name 'x'.")
            .in_file("/project/a.ts");
        assert_eq!(
            diag.to_string(),
            "error at /project/a.ts:2:5: Cannot find name 'x'."
        );
        assert_eq!(
            Diagnostic::global("Unknown compiler option 'foo'.").to_string(),
            "error: Unknown compiler option 'foo'."
        );
    }

    #[test]
    fn test_collecting_handler() {
        let handler = CollectingDiagnosticHandler::new();
        let span = Span::new(0, 5, 1, 1);

        handler.error(span, "Error 1");
        handler.report(Diagnostic::global("Error 2"));

        assert_eq!(handler.error_count(), 2);
        assert!(handler.has_errors());
        assert_eq!(handler.get_diagnostics()[1].message, "Error 2");
    }

    #[test]
    fn test_no_errors() {
        let handler = CollectingDiagnosticHandler::new();

        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
        assert!(handler.get_diagnostics().is_empty());
    }
}
