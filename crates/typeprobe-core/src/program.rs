//! Builds an immutable, type-checked [`Program`] from [`CompileOptions`].
//!
//! Two configuration shapes are accepted: a config file (`base_path` +
//! `config_file_name`) or direct input (`compiler_options` + `files`).
//! Configuration problems and root files that exist but cannot be read are
//! fatal. Missing roots and errors in the sources are only recorded on the
//! program.

use crate::ast::statement::Statement;
use crate::ast::Script;
use crate::config::{
    merge_compiler_options, union_references, CompileOptions, CompilerOptions, ParsedConfig,
    ProjectReference, RawCompilerOptions,
};
use crate::di::Container;
use crate::diagnostics::{CollectingDiagnosticHandler, Diagnostic, DiagnosticHandler};
use crate::errors::CompilationError;
use crate::fs::{normalize_path, path_to_string, FileSystem};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::span::Span;
use crate::typechecker::{CheckInput, TypeChecker};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Extension of probe scripts
pub const SOURCE_EXTENSION: &str = "ts";

/// One parsed file of a program
#[derive(Debug)]
pub struct SourceFile {
    /// Normalized absolute path, `/`-separated
    pub path: String,
    pub text: String,
    pub script: Script,
    /// Listed as a root of the program, not only reached through an import
    pub is_root: bool,
    /// Resolved module specifiers, as indices into the program's files
    pub imports: FxHashMap<String, usize>,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>, script: Script, is_root: bool) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        SourceFile {
            path: path.into(),
            text,
            script,
            is_root,
            imports: FxHashMap::default(),
            line_starts,
        }
    }

    /// 1-based line and column of a byte offset; columns count characters
    pub fn line_and_column(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self
            .text
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);
        (line + 1, column + 1)
    }

    /// Source text covered by `span`
    pub fn text_of(&self, span: Span) -> &str {
        self.text.get(span.start..span.end.min(self.text.len())).unwrap_or("")
    }
}

/// A fully checked set of files
pub struct Program {
    root_names: Vec<String>,
    options: CompilerOptions,
    references: Vec<ProjectReference>,
    source_files: Vec<SourceFile>,
    diagnostics: Vec<Diagnostic>,
    checker: TypeChecker,
}

/// Inputs after configuration has been resolved
struct ProgramInputs {
    root_names: Vec<PathBuf>,
    options: CompilerOptions,
    references: Vec<ProjectReference>,
}

impl Program {
    /// Resolve the configuration shape of `options`, then read, parse and
    /// check every file
    pub fn create(options: &CompileOptions, container: &Container) -> Result<Program, CompilationError> {
        let fs = container.file_system().as_ref();
        let inputs = match (
            &options.base_path,
            &options.config_file_name,
            &options.compiler_options,
            &options.files,
        ) {
            (Some(base_path), Some(config_file_name), _, _) => {
                inputs_from_config(fs, base_path, config_file_name, options)?
            }
            (_, _, Some(compiler_options), Some(files)) => {
                inputs_from_files(fs, options.base_path.as_deref(), compiler_options, files, options)?
            }
            _ => return Err(CompilationError::InvalidShape),
        };

        let program = Program::build(inputs, container)?;
        for diagnostic in &program.diagnostics {
            container.diagnostic_handler().report(diagnostic.clone());
        }
        Ok(program)
    }

    fn build(inputs: ProgramInputs, container: &Container) -> Result<Program, CompilationError> {
        let fs = container.file_system().as_ref();
        let mut diagnostics = Vec::new();
        let mut source_files: Vec<SourceFile> = Vec::new();
        let mut by_path: FxHashMap<String, usize> = FxHashMap::default();
        let mut next_node_id = 0;
        let mut pending: VecDeque<usize> = VecDeque::new();

        for root in &inputs.root_names {
            let key = path_to_string(root);
            if by_path.contains_key(&key) {
                continue;
            }
            match fs.read_file(root) {
                Ok(text) => {
                    let file = parse_source_file(&key, text, true, &mut next_node_id, &mut diagnostics);
                    by_path.insert(key, source_files.len());
                    pending.push_back(source_files.len());
                    source_files.push(file);
                }
                Err(error) if error.kind() != io::ErrorKind::NotFound => {
                    return Err(CompilationError::Io(error));
                }
                Err(error) => {
                    warn!(file = %key, %error, "skipping missing root file");
                    diagnostics.push(Diagnostic::global(format!("File '{}' not found.", key)));
                }
            }
        }

        while let Some(index) = pending.pop_front() {
            let directory = Path::new(&source_files[index].path)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let specifiers = import_specifiers(&source_files[index].script);

            for specifier in specifiers {
                let Some(resolved) = resolve_import(fs, &directory, &specifier) else {
                    continue;
                };
                let key = path_to_string(&resolved);
                let target = match by_path.get(&key) {
                    Some(target) => *target,
                    None => {
                        let Ok(text) = fs.read_file(&resolved) else {
                            continue;
                        };
                        let file = parse_source_file(&key, text, false, &mut next_node_id, &mut diagnostics);
                        let target = source_files.len();
                        by_path.insert(key, target);
                        pending.push_back(target);
                        source_files.push(file);
                        target
                    }
                };
                source_files[index].imports.insert(specifier, target);
            }
        }

        let inputs_to_check: Vec<CheckInput<'_>> = source_files
            .iter()
            .map(|file| CheckInput {
                script: &file.script,
                imports: file.imports.clone(),
            })
            .collect();
        let (checker, errors) = TypeChecker::check(&inputs_to_check, &inputs.options);

        for error in errors {
            let path = source_files[error.file].path.clone();
            diagnostics.push(Diagnostic::error(error.error.span, error.error.message).in_file(path));
        }

        debug!(
            roots = inputs.root_names.len(),
            files = source_files.len(),
            diagnostics = diagnostics.len(),
            "built program"
        );

        Ok(Program {
            root_names: inputs.root_names.iter().map(|p| path_to_string(p)).collect(),
            options: inputs.options,
            references: inputs.references,
            source_files,
            diagnostics,
            checker,
        })
    }

    /// Normalized root file names, in input order
    pub fn root_file_names(&self) -> &[String] {
        &self.root_names
    }

    pub fn compiler_options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compiler options as merged from config and caller, before validation
    pub fn project_references(&self) -> &[ProjectReference] {
        &self.references
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    pub fn source_file(&self, path: &str) -> Option<&SourceFile> {
        self.source_files.iter().find(|file| file.path == path)
    }

    /// Syntactic and semantic diagnostics of every file
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn type_checker(&self) -> &TypeChecker {
        &self.checker
    }
}

fn inputs_from_config(
    fs: &dyn FileSystem,
    base_path: &Path,
    config_file_name: &str,
    overrides: &CompileOptions,
) -> Result<ProgramInputs, CompilationError> {
    let base = fs.resolve_path(base_path);
    let config_path = normalize_path(&base, Path::new(config_file_name));
    debug!(config = %path_to_string(&config_path), "loading config file");

    let parsed = ParsedConfig::load(fs, &config_path, &base)?;
    let mut diagnostics = parsed.diagnostics.clone();

    let raw_options = match &overrides.compiler_options {
        Some(extra) => merge_compiler_options(&parsed.compiler_options, extra),
        None => parsed.compiler_options.clone(),
    };
    let (options, option_diagnostics) = CompilerOptions::realize(&raw_options);
    diagnostics.extend(option_diagnostics);

    let mut root_names = parsed.files.clone().unwrap_or_default();
    for file in expand_includes(fs, &parsed.include, &parsed.exclude) {
        if !root_names.contains(&file) {
            root_names.push(file);
        }
    }
    for file in overrides.files.iter().flatten() {
        let file = normalize_path(&base, Path::new(file));
        if !root_names.contains(&file) {
            root_names.push(file);
        }
    }
    if root_names.is_empty() {
        diagnostics.push(format!(
            "No inputs were found in config file '{}'. Specified 'include' paths were '{}' and 'exclude' paths were '{}'.",
            path_to_string(&config_path),
            json_list(&parsed.include),
            json_list(&parsed.exclude)
        ));
    }

    let extra_references = normalize_references(&base, overrides.project_references.as_deref());
    let references = union_references(&parsed.references, &extra_references);
    diagnostics.extend(missing_references(fs, &references));

    if !diagnostics.is_empty() {
        return Err(CompilationError::Diagnostics(diagnostics));
    }
    Ok(ProgramInputs {
        root_names,
        options,
        references,
    })
}

fn inputs_from_files(
    fs: &dyn FileSystem,
    base_path: Option<&Path>,
    raw_options: &RawCompilerOptions,
    files: &[String],
    overrides: &CompileOptions,
) -> Result<ProgramInputs, CompilationError> {
    let base = match base_path {
        Some(path) => fs.resolve_path(path),
        None => fs.current_dir(),
    };
    let (options, mut diagnostics) = CompilerOptions::realize(raw_options);

    let mut root_names: Vec<PathBuf> = Vec::new();
    for file in files {
        let file = normalize_path(&base, Path::new(file));
        if !root_names.contains(&file) {
            root_names.push(file);
        }
    }

    let references = normalize_references(&base, overrides.project_references.as_deref());
    diagnostics.extend(missing_references(fs, &references));

    if !diagnostics.is_empty() {
        return Err(CompilationError::Diagnostics(diagnostics));
    }
    Ok(ProgramInputs {
        root_names,
        options,
        references,
    })
}

/// Files matched by any of `include` and none of `exclude`
///
/// An exclude pattern naming a directory excludes everything below it.
fn expand_includes(fs: &dyn FileSystem, include: &[String], exclude: &[String]) -> Vec<PathBuf> {
    let exclude: Vec<glob::Pattern> = exclude
        .iter()
        .filter_map(|pattern| glob::Pattern::new(pattern).ok())
        .collect();
    let mut files = Vec::new();

    for pattern in include {
        let pattern = if !pattern.contains(['*', '?', '[']) && fs.directory_exists(Path::new(pattern)) {
            format!("{}/**/*", pattern.trim_end_matches('/'))
        } else {
            pattern.clone()
        };
        let Ok(compiled) = glob::Pattern::new(&pattern) else {
            warn!(%pattern, "ignoring malformed include pattern");
            continue;
        };
        let root = literal_prefix(&pattern);
        for file in fs.walk_files(&root) {
            let is_source = file
                .extension()
                .is_some_and(|ext| ext == SOURCE_EXTENSION);
            let excluded = file
                .ancestors()
                .any(|ancestor| exclude.iter().any(|p| p.matches_path(ancestor)));
            if is_source && !excluded && compiled.matches_path(&file) && !files.contains(&file) {
                files.push(file);
            }
        }
    }
    files
}

/// Directory part of a glob pattern before its first wildcard
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[']) {
            return prefix;
        }
        prefix.push(component.as_os_str());
    }
    prefix
}

fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_default()
}

fn normalize_references(base: &Path, references: Option<&[ProjectReference]>) -> Vec<ProjectReference> {
    references
        .unwrap_or_default()
        .iter()
        .map(|reference| ProjectReference {
            path: path_to_string(&normalize_path(base, Path::new(&reference.path))),
            prepend: reference.prepend,
        })
        .collect()
}

/// A reference names a config file or a directory holding one
fn missing_references(fs: &dyn FileSystem, references: &[ProjectReference]) -> Vec<String> {
    references
        .iter()
        .filter(|reference| {
            let path = Path::new(&reference.path);
            !fs.file_exists(path) && !fs.directory_exists(path)
        })
        .map(|reference| format!("File '{}' not found.", reference.path))
        .collect()
}

fn parse_source_file(
    path: &str,
    text: String,
    is_root: bool,
    next_node_id: &mut u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> SourceFile {
    let handler = Arc::new(CollectingDiagnosticHandler::new());
    let mut lexer = Lexer::new(&text, handler.clone());
    let tokens = lexer.tokenize();
    let mut parser = Parser::new(tokens, handler.clone()).with_first_node_id(*next_node_id);
    let script = match parser.parse() {
        Ok(script) => script,
        Err(error) => {
            handler.error(error.span, &error.message);
            Script::new(Vec::new(), Span::dummy())
        }
    };
    *next_node_id = parser.next_node_id();

    for diagnostic in handler.get_diagnostics() {
        diagnostics.push(diagnostic.in_file(path));
    }
    debug!(file = %path, statements = script.statements.len(), "parsed source file");
    SourceFile::new(path, text, script, is_root)
}

fn import_specifiers(script: &Script) -> Vec<String> {
    let mut specifiers = Vec::new();
    for statement in &script.statements {
        if let Statement::Import(import) = statement {
            if !specifiers.contains(&import.source.node) {
                specifiers.push(import.source.node.clone());
            }
        }
    }
    specifiers
}

/// `x`, `x.ts` and `x/index.ts`, for relative and absolute specifiers only
fn resolve_import(fs: &dyn FileSystem, directory: &Path, specifier: &str) -> Option<PathBuf> {
    let is_path = specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/');
    if !is_path {
        return None;
    }
    let base = normalize_path(directory, Path::new(specifier));
    let candidates = [
        base.clone(),
        PathBuf::from(format!("{}.{}", path_to_string(&base), SOURCE_EXTENSION)),
        base.join(format!("index.{}", SOURCE_EXTENSION)),
    ];
    candidates.into_iter().find(|candidate| fs.file_exists(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use serde_json::json;

    fn container(fs: MockFileSystem) -> Container {
        Container::with_dependencies(Arc::new(CollectingDiagnosticHandler::new()), Arc::new(fs))
    }

    fn raw(value: serde_json::Value) -> RawCompilerOptions {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_line_and_column_count_characters() {
        let file = SourceFile::new("/a.ts", "let a = 1;\nconst é = \"x\";", Script::new(Vec::new(), Span::dummy()), true);
        assert_eq!(file.line_and_column(0), (1, 1));
        assert_eq!(file.line_and_column(11), (2, 1));
        // byte offset of `=` after the two-byte `é`
        assert_eq!(file.line_and_column(20), (2, 9));
    }

    #[test]
    fn test_missing_shape_is_rejected() {
        let error = Program::create(&CompileOptions::default(), &container(MockFileSystem::new()))
            .err()
            .unwrap();
        assert!(matches!(error, CompilationError::InvalidShape));
    }

    #[test]
    fn test_direct_inputs_are_checked() {
        let fs = MockFileSystem::with_current_dir("/project");
        fs.add_file("/project/a.ts", "const a: number = \"x\";");
        let options = CompileOptions::from_files(raw(json!({ "strict": true })), ["a.ts"]);

        let program = Program::create(&options, &container(fs)).unwrap();
        assert_eq!(program.root_file_names(), &["/project/a.ts".to_string()]);
        assert_eq!(program.diagnostics().len(), 1);
        assert_eq!(program.diagnostics()[0].file.as_deref(), Some("/project/a.ts"));
    }

    #[test]
    fn test_unknown_option_fails_direct_inputs() {
        let fs = MockFileSystem::with_current_dir("/project");
        fs.add_file("/project/a.ts", "");
        let options = CompileOptions::from_files(raw(json!({ "strictNulls": true })), ["a.ts"]);

        let error = Program::create(&options, &container(fs)).err().unwrap();
        assert_eq!(error.causes(), vec!["Unknown compiler option 'strictNulls'.".to_string()]);
    }

    #[test]
    fn test_config_files_merge_with_overrides() {
        let fs = MockFileSystem::with_current_dir("/");
        fs.add_file(
            "/project/tsconfig.json",
            r#"{ "compilerOptions": { "strict": false }, "files": ["a.ts", "b.ts"] }"#,
        );
        fs.add_file("/project/a.ts", "");
        fs.add_file("/project/b.ts", "");
        fs.add_file("/project/c.ts", "");

        let options = CompileOptions {
            compiler_options: Some(raw(json!({ "strict": true }))),
            files: Some(vec!["./b.ts".to_string(), "c.ts".to_string()]),
            ..CompileOptions::from_config_file("/project", "tsconfig.json")
        };
        let program = Program::create(&options, &container(fs)).unwrap();
        assert_eq!(
            program.root_file_names(),
            &[
                "/project/a.ts".to_string(),
                "/project/b.ts".to_string(),
                "/project/c.ts".to_string()
            ]
        );
        assert_eq!(program.compiler_options().strict, Some(true));
    }

    #[test]
    fn test_include_and_exclude_patterns() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/project/tsconfig.json",
            r#"{ "include": ["probes/**/*"], "exclude": ["probes/skip"] }"#,
        );
        fs.add_file("/project/probes/a.ts", "");
        fs.add_file("/project/probes/nested/b.ts", "");
        fs.add_file("/project/probes/readme.md", "");
        fs.add_file("/project/probes/skip/c.ts", "");
        fs.add_file("/project/other/d.ts", "");

        let options = CompileOptions::from_config_file("/project", "tsconfig.json");
        let program = Program::create(&options, &container(fs)).unwrap();
        assert_eq!(
            program.root_file_names(),
            &[
                "/project/probes/a.ts".to_string(),
                "/project/probes/nested/b.ts".to_string()
            ]
        );
    }

    #[test]
    fn test_directory_include_matches_its_files() {
        let fs = MockFileSystem::new();
        fs.add_file("/project/tsconfig.json", r#"{ "include": ["src"] }"#);
        fs.add_file("/project/src/a.ts", "");

        let options = CompileOptions::from_config_file("/project", "tsconfig.json");
        let program = Program::create(&options, &container(fs)).unwrap();
        assert_eq!(program.root_file_names(), &["/project/src/a.ts".to_string()]);
    }

    #[test]
    fn test_no_inputs_is_a_config_error() {
        let fs = MockFileSystem::new();
        fs.add_file("/project/tsconfig.json", r#"{ "include": ["probes/*.ts"] }"#);

        let options = CompileOptions::from_config_file("/project", "tsconfig.json");
        let error = Program::create(&options, &container(fs)).err().unwrap();
        assert!(error.to_string().starts_with("No inputs were found in config file"));
    }

    #[test]
    fn test_missing_reference_is_a_config_error() {
        let fs = MockFileSystem::new();
        fs.add_file("/project/tsconfig.json", r#"{ "files": ["a.ts"], "references": [{ "path": "../lib" }] }"#);
        fs.add_file("/project/a.ts", "");

        let options = CompileOptions::from_config_file("/project", "tsconfig.json");
        let error = Program::create(&options, &container(fs)).err().unwrap();
        assert_eq!(error.causes(), vec!["File '/lib' not found.".to_string()]);
    }

    #[test]
    fn test_imports_are_pulled_in() {
        let fs = MockFileSystem::new();
        fs.add_file("/project/a.ts", "import { value } from \"./lib\";\nconst n: number = value;");
        fs.add_file("/project/lib/index.ts", "export const value = 1;");

        let options = CompileOptions::from_files(RawCompilerOptions::new(), ["/project/a.ts"]);
        let program = Program::create(&options, &container(fs)).unwrap();
        assert_eq!(program.source_files().len(), 2);
        let lib = program.source_file("/project/lib/index.ts").unwrap();
        assert!(!lib.is_root);
        assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());
    }

    #[test]
    fn test_unreadable_root_is_recorded_not_fatal() {
        let fs = MockFileSystem::new();
        let options = CompileOptions::from_files(RawCompilerOptions::new(), ["/missing.ts"]);
        let program = Program::create(&options, &container(fs)).unwrap();
        assert!(program.source_files().is_empty());
        assert_eq!(program.diagnostics()[0].message, "File '/missing.ts' not found.");
    }

    #[test]
    fn test_malformed_config_reports_read_error() {
        let fs = MockFileSystem::new();
        fs.add_file("/project/tsconfig.json", "{");
        let options = CompileOptions::from_config_file("/project", "tsconfig.json");
        let error = Program::create(&options, &container(fs)).err().unwrap();
        assert!(matches!(error, CompilationError::ReadConfig { .. }));
    }
}
