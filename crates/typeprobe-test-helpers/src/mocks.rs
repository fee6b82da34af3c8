//! Mock implementations for testing

use std::sync::{Arc, Mutex};
use typeprobe_core::diagnostics::{Diagnostic, DiagnosticHandler};

/// A mock diagnostic handler that collects diagnostics
#[derive(Debug, Default)]
pub struct MockDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl MockDiagnosticHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Messages of every collected diagnostic, in report order
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }
}

impl DiagnosticHandler for MockDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().unwrap().push(diagnostic);
    }

    fn has_errors(&self) -> bool {
        !self.diagnostics.lock().unwrap().is_empty()
    }

    fn error_count(&self) -> usize {
        self.diagnostics.lock().unwrap().len()
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().unwrap().clone()
    }
}
