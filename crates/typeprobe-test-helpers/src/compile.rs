//! Test compilation helpers for typeprobe
//!
//! Provides convenient functions for compiling probe scripts in tests,
//! using proper DI through the Container.

use crate::mocks::MockDiagnosticHandler;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use typeprobe_core::compiler::{compile, CompileResult};
use typeprobe_core::config::{CompileOptions, RawCompilerOptions};
use typeprobe_core::di::Container;
use typeprobe_core::errors::CompilationError;
use typeprobe_core::fs::MockFileSystem;

/// Directory in-memory probes are placed under
pub const MEMORY_ROOT: &str = "/project";

/// `{ "strict": true }`
pub fn strict_options() -> RawCompilerOptions {
    let mut options = RawCompilerOptions::new();
    options.insert("strict".to_string(), Value::Bool(true));
    options
}

/// Container over an in-memory file system holding `files`
///
/// # Arguments
/// * `files` - `(path, text)` pairs; relative paths land under [`MEMORY_ROOT`]
///
/// # Returns
/// The container and the handler receiving its diagnostics
pub fn memory_container(files: &[(&str, &str)]) -> (Container, Arc<MockDiagnosticHandler>) {
    let fs = MockFileSystem::with_current_dir(MEMORY_ROOT);
    for (path, text) in files {
        fs.add_file(path, *text);
    }
    let handler = MockDiagnosticHandler::new();
    let container = Container::with_dependencies(handler.clone(), Arc::new(fs));
    (container, handler)
}

/// Compile one in-memory probe at `/project/probe.ts` with strict options
///
/// # Arguments
/// * `source` - The probe script
///
/// # Returns
/// The compile result or the configuration error
pub fn compile_source(source: &str) -> Result<CompileResult, CompilationError> {
    compile_sources(&[("probe.ts", source)], &["probe.ts"])
}

/// Compile in-memory files, using `roots` as the program's root files
pub fn compile_sources(files: &[(&str, &str)], roots: &[&str]) -> Result<CompileResult, CompilationError> {
    let (container, _) = memory_container(files);
    let options = CompileOptions {
        base_path: Some(PathBuf::from(MEMORY_ROOT)),
        ..CompileOptions::from_files(strict_options(), roots.iter().copied())
    };
    compile(&options, &container)
}

/// Normalized in-memory path of a probe, as used in error keys
pub fn memory_path(relative: &str) -> String {
    format!("{}/{}", MEMORY_ROOT, relative)
}

/// A throwaway project directory on disk
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn new() -> Self {
        TempProject {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the project, `/`-separated
    pub fn file_path(&self, relative: &str) -> String {
        self.path().join(relative).to_string_lossy().replace('\\', "/")
    }

    /// Write `content` to `relative`, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create directories");
        }
        fs::write(&path, content).expect("failed to write file");
        self
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).expect("failed to read file")
    }

    /// Compile the project through its config file
    pub fn compile(&self, config_file_name: &str) -> Result<CompileResult, CompilationError> {
        compile(
            &CompileOptions::from_config_file(self.path(), config_file_name),
            &Container::new(),
        )
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}
