use crate::diagnostics::{CollectingDiagnosticHandler, ConsoleDiagnosticHandler, DiagnosticHandler};
use crate::fs::{FileSystem, RealFileSystem};
use std::sync::Arc;

/// Dependency injection container
/// Holds the collaborators shared by the program builder and the compile pipeline
#[derive(Clone)]
pub struct Container {
    diagnostic_handler: Arc<dyn DiagnosticHandler>,
    file_system: Arc<dyn FileSystem>,
}

impl Container {
    /// Real file system; checker diagnostics are collected silently
    pub fn new() -> Self {
        Container {
            diagnostic_handler: Arc::new(CollectingDiagnosticHandler::new()),
            file_system: Arc::new(RealFileSystem::new()),
        }
    }

    /// Real file system; checker diagnostics are echoed to stderr
    pub fn with_console(pretty: bool) -> Self {
        Container {
            diagnostic_handler: Arc::new(ConsoleDiagnosticHandler::new(pretty)),
            file_system: Arc::new(RealFileSystem::new()),
        }
    }

    /// Create a container with custom dependencies (for testing)
    pub fn with_dependencies(
        diagnostic_handler: Arc<dyn DiagnosticHandler>,
        file_system: Arc<dyn FileSystem>,
    ) -> Self {
        Container {
            diagnostic_handler,
            file_system,
        }
    }

    pub fn diagnostic_handler(&self) -> &Arc<dyn DiagnosticHandler> {
        &self.diagnostic_handler
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.file_system
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostic_handler.has_errors()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostic_handler.error_count()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::span::Span;
    use std::path::Path;

    #[test]
    fn test_container_with_custom_dependencies() {
        let handler = Arc::new(CollectingDiagnosticHandler::new());
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/a.ts", "const a = 1;");

        let container = Container::with_dependencies(handler.clone(), fs);
        assert!(container.file_system().file_exists(Path::new("/a.ts")));

        container.diagnostic_handler().error(Span::dummy(), "boom");
        assert!(container.has_errors());
        assert_eq!(container.error_count(), 1);
        assert_eq!(handler.error_count(), 1);
    }
}
