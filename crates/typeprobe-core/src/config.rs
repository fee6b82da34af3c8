use crate::errors::CompilationError;
use crate::fs::{normalize_path, path_to_string, FileSystem};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Compiler options exactly as written in a config file or passed by a caller
pub type RawCompilerOptions = serde_json::Map<String, Value>;

const TARGETS: &[&str] = &[
    "es3", "es5", "es6", "es2015", "es2016", "es2017", "es2018", "es2019", "es2020", "es2021",
    "es2022", "es2023", "esnext",
];

const MODULES: &[&str] = &[
    "none", "commonjs", "amd", "system", "umd", "es6", "es2015", "es2020", "es2022", "esnext",
    "node16", "nodenext", "preserve",
];

/// Compiler options after validation
///
/// Unset options keep the checker defaults, which are the non-strict ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_null_checks: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_function_types: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_implicit_any: Option<bool>,

    /// Language level, lower-cased (`es2020`, `esnext`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_emit: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_lib_check: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<bool>,
}

impl CompilerOptions {
    pub fn strict_null_checks_enabled(&self) -> bool {
        self.strict_null_checks.or(self.strict).unwrap_or(false)
    }

    pub fn strict_function_types_enabled(&self) -> bool {
        self.strict_function_types.or(self.strict).unwrap_or(false)
    }

    pub fn no_implicit_any_enabled(&self) -> bool {
        self.no_implicit_any.or(self.strict).unwrap_or(false)
    }

    /// Validate a raw option map.
    ///
    /// Every rejected key yields one diagnostic message; valid keys are kept.
    pub fn realize(raw: &RawCompilerOptions) -> (CompilerOptions, Vec<String>) {
        let mut options = CompilerOptions::default();
        let mut diagnostics = Vec::new();

        for (key, value) in raw {
            let outcome = match key.as_str() {
                "strict" => expect_bool(key, value).map(|v| options.strict = Some(v)),
                "strictNullChecks" => {
                    expect_bool(key, value).map(|v| options.strict_null_checks = Some(v))
                }
                "strictFunctionTypes" => {
                    expect_bool(key, value).map(|v| options.strict_function_types = Some(v))
                }
                "noImplicitAny" => {
                    expect_bool(key, value).map(|v| options.no_implicit_any = Some(v))
                }
                "noEmit" => expect_bool(key, value).map(|v| options.no_emit = Some(v)),
                "skipLibCheck" => expect_bool(key, value).map(|v| options.skip_lib_check = Some(v)),
                "composite" => expect_bool(key, value).map(|v| options.composite = Some(v)),
                "target" => {
                    expect_choice(key, value, TARGETS).map(|v| options.target = Some(v))
                }
                "module" => {
                    expect_choice(key, value, MODULES).map(|v| options.module = Some(v))
                }
                "lib" => expect_list(key, value).map(|v| options.lib = Some(v)),
                "types" => expect_list(key, value).map(|v| options.types = Some(v)),
                "rootDir" => expect_string(key, value).map(|v| options.root_dir = Some(v)),
                "baseUrl" => expect_string(key, value).map(|v| options.base_url = Some(v)),
                _ => Err(format!("Unknown compiler option '{}'.", key)),
            };

            if let Err(message) = outcome {
                diagnostics.push(message);
            }
        }

        (options, diagnostics)
    }
}

fn expect_bool(key: &str, value: &Value) -> Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| format!("Compiler option '{}' requires a value of type boolean.", key))
}

fn expect_string(key: &str, value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("Compiler option '{}' requires a value of type string.", key))
}

fn expect_list(key: &str, value: &Value) -> Result<Vec<String>, String> {
    let error = || format!("Compiler option '{}' requires a value of type list.", key);
    value
        .as_array()
        .ok_or_else(error)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(error))
        .collect()
}

fn expect_choice(key: &str, value: &Value, choices: &[&str]) -> Result<String, String> {
    let text = expect_string(key, value)?.to_ascii_lowercase();
    if choices.contains(&text.as_str()) {
        Ok(text)
    } else {
        let listed = choices
            .iter()
            .map(|choice| format!("'{}'", choice))
            .collect::<Vec<_>>()
            .join(", ");
        Err(format!(
            "Argument for '--{}' option must be: {}.",
            key, listed
        ))
    }
}

/// Shallow merge: every key of `overrides` replaces the same key of `base`
pub fn merge_compiler_options(
    base: &RawCompilerOptions,
    overrides: &RawCompilerOptions,
) -> RawCompilerOptions {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReference {
    pub path: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub prepend: bool,
}

impl ProjectReference {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prepend: false,
        }
    }
}

/// Append the references of `overrides` whose path is not already listed
pub fn union_references(
    base: &[ProjectReference],
    overrides: &[ProjectReference],
) -> Vec<ProjectReference> {
    let mut merged = base.to_vec();
    for reference in overrides {
        if !merged.iter().any(|existing| existing.path == reference.path) {
            merged.push(reference.clone());
        }
    }
    merged
}

/// On-disk project configuration (`typeprobe.json`, `tsconfig.json`, or YAML)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_options: Option<RawCompilerOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<ProjectReference>>,
}

impl ConfigFile {
    /// Parse config text; `.yaml`/`.yml` paths are read as YAML, everything else as JSON
    pub fn parse(path: &Path, text: &str) -> Result<ConfigFile, String> {
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            serde_yaml::from_str(text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(text).map_err(|e| e.to_string())
        }
    }

    /// Starter configuration written by `typeprobe --init`
    pub fn starter() -> ConfigFile {
        let mut compiler_options = RawCompilerOptions::new();
        compiler_options.insert("strict".to_string(), Value::Bool(true));
        compiler_options.insert("target".to_string(), Value::String("es2022".to_string()));
        ConfigFile {
            compiler_options: Some(compiler_options),
            include: Some(vec!["probes/**/*.ts".to_string()]),
            ..ConfigFile::default()
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, CompilationError> {
        serde_json::to_string_pretty(self).map_err(|e| CompilationError::ReadConfig {
            message: e.to_string(),
        })
    }
}

fn default_exclude() -> Vec<String> {
    vec!["node_modules".to_string(), "dist".to_string()]
}

fn default_include() -> Vec<String> {
    vec!["**/*".to_string()]
}

/// A config file with `extends` applied and every path made absolute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedConfig {
    pub compiler_options: RawCompilerOptions,
    /// Explicit `files` entries, absolute
    pub files: Option<Vec<PathBuf>>,
    /// Absolute glob patterns
    pub include: Vec<String>,
    /// Absolute glob patterns
    pub exclude: Vec<String>,
    pub references: Vec<ProjectReference>,
    /// Non-fatal problems found while reading; fatal once collected by the program builder
    pub diagnostics: Vec<String>,
}

impl ParsedConfig {
    /// Read `path` and every config it extends.
    ///
    /// Paths of the root config are resolved against `base_path`, paths of an
    /// extended config against that config's directory. Only an unreadable or
    /// malformed root config is a hard error.
    pub fn load(
        fs: &dyn FileSystem,
        path: &Path,
        base_path: &Path,
    ) -> Result<ParsedConfig, CompilationError> {
        let text = fs.read_file(path).map_err(|e| CompilationError::ReadConfig {
            message: e.to_string(),
        })?;
        let config = ConfigFile::parse(path, &text)
            .map_err(|message| CompilationError::ReadConfig { message })?;

        let mut chain = vec![path_to_string(path)];
        let mut parsed = ParsedConfig::default();
        let mut explicit_include = None;
        let mut explicit_exclude = None;
        parsed.apply(
            fs,
            config,
            base_path,
            &mut chain,
            &mut explicit_include,
            &mut explicit_exclude,
        );

        parsed.include = explicit_include.unwrap_or_else(|| {
            if parsed.files.is_some() {
                Vec::new()
            } else {
                absolute_patterns(base_path, &default_include())
            }
        });
        parsed.exclude =
            explicit_exclude.unwrap_or_else(|| absolute_patterns(base_path, &default_exclude()));

        Ok(parsed)
    }

    fn apply(
        &mut self,
        fs: &dyn FileSystem,
        config: ConfigFile,
        directory: &Path,
        chain: &mut Vec<String>,
        include: &mut Option<Vec<String>>,
        exclude: &mut Option<Vec<String>>,
    ) {
        if let Some(extends) = &config.extends {
            match resolve_extends(fs, directory, extends) {
                Some(base_path) => {
                    let key = path_to_string(&base_path);
                    if chain.contains(&key) {
                        chain.push(key);
                        self.diagnostics.push(format!(
                            "Circularity detected while resolving configuration: {}",
                            chain.join(" -> ")
                        ));
                    } else {
                        chain.push(key);
                        match fs
                            .read_file(&base_path)
                            .map_err(|e| e.to_string())
                            .and_then(|text| ConfigFile::parse(&base_path, &text))
                        {
                            Ok(base) => {
                                let base_dir = base_path
                                    .parent()
                                    .map(Path::to_path_buf)
                                    .unwrap_or_else(|| directory.to_path_buf());
                                self.apply(fs, base, &base_dir, chain, include, exclude);
                            }
                            Err(message) => self.diagnostics.push(format!(
                                "Failed to read extended config '{}'.\n{}",
                                extends, message
                            )),
                        }
                        chain.pop();
                    }
                }
                None => self
                    .diagnostics
                    .push(format!("File '{}' not found.", extends)),
            }
        }

        if let Some(options) = &config.compiler_options {
            self.compiler_options = merge_compiler_options(&self.compiler_options, options);
        }
        if let Some(files) = config.files {
            self.files = Some(
                files
                    .iter()
                    .map(|file| normalize_path(directory, Path::new(file)))
                    .collect(),
            );
        }
        if let Some(patterns) = config.include {
            *include = Some(absolute_patterns(directory, &patterns));
        }
        if let Some(patterns) = config.exclude {
            *exclude = Some(absolute_patterns(directory, &patterns));
        }
        if let Some(references) = config.references {
            self.references = references
                .into_iter()
                .map(|reference| ProjectReference {
                    path: path_to_string(&normalize_path(directory, Path::new(&reference.path))),
                    prepend: reference.prepend,
                })
                .collect();
        }
    }
}

fn resolve_extends(fs: &dyn FileSystem, directory: &Path, extends: &str) -> Option<PathBuf> {
    let candidate = normalize_path(directory, Path::new(extends));
    if fs.file_exists(&candidate) {
        return Some(candidate);
    }
    let with_extension = PathBuf::from(format!("{}.json", candidate.to_string_lossy()));
    fs.file_exists(&with_extension).then_some(with_extension)
}

fn absolute_patterns(directory: &Path, patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|pattern| path_to_string(&normalize_path(directory, Path::new(pattern))))
        .collect()
}

/// Caller-facing compile configuration
///
/// Either `base_path` + `config_file_name` or `compiler_options` + `files`
/// must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_options: Option<RawCompilerOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_references: Option<Vec<ProjectReference>>,
}

impl CompileOptions {
    pub fn from_config_file(base_path: impl Into<PathBuf>, config_file_name: impl Into<String>) -> Self {
        Self {
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
        Self {
            compiler_options: Some(compiler_options),
            files: Some(files.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Fields set on `overrides` replace the ones set here
    pub fn merged_with(&self, overrides: &CompileOptions) -> CompileOptions {
        CompileOptions {
            base_path: overrides.base_path.clone().or_else(|| self.base_path.clone()),
            config_file_name: overrides
                .config_file_name
                .clone()
                .or_else(|| self.config_file_name.clone()),
            compiler_options: overrides
                .compiler_options
                .clone()
                .or_else(|| self.compiler_options.clone()),
            files: overrides.files.clone().or_else(|| self.files.clone()),
            project_references: overrides
                .project_references
                .clone()
                .or_else(|| self.project_references.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use serde_json::json;

    fn raw(value: Value) -> RawCompilerOptions {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_realize_known_options() {
        let (options, diagnostics) = CompilerOptions::realize(&raw(json!({
            "strict": true,
            "target": "ES2020",
            "lib": ["es2020", "dom"],
        })));
        assert!(diagnostics.is_empty());
        assert_eq!(options.strict, Some(true));
        assert_eq!(options.target.as_deref(), Some("es2020"));
        assert!(options.strict_null_checks_enabled());
        assert!(options.strict_function_types_enabled());
    }

    #[test]
    fn test_realize_rejects_unknown_and_mistyped_options() {
        let (_, diagnostics) = CompilerOptions::realize(&raw(json!({
            "strictNulls": true,
            "strict": "yes",
            "target": "es1999",
        })));
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.contains(&"Unknown compiler option 'strictNulls'.".to_string()));
        assert!(diagnostics
            .contains(&"Compiler option 'strict' requires a value of type boolean.".to_string()));
        assert!(diagnostics
            .iter()
            .any(|d| d.starts_with("Argument for '--target' option must be:")));
    }

    #[test]
    fn test_specific_flag_beats_strict() {
        let (options, _) = CompilerOptions::realize(&raw(json!({
            "strict": true,
            "strictNullChecks": false,
        })));
        assert!(!options.strict_null_checks_enabled());
        assert!(options.strict_function_types_enabled());
    }

    #[test]
    fn test_merge_override_wins() {
        let base = raw(json!({ "strict": false, "target": "es5" }));
        let overrides = raw(json!({ "strict": true }));
        let merged = merge_compiler_options(&base, &overrides);
        assert_eq!(merged.get("strict"), Some(&json!(true)));
        assert_eq!(merged.get("target"), Some(&json!("es5")));
    }

    #[test]
    fn test_union_references_by_path() {
        let base = vec![ProjectReference::new("/a"), ProjectReference::new("/b")];
        let overrides = vec![ProjectReference::new("/b"), ProjectReference::new("/c")];
        let merged = union_references(&base, &overrides);
        let paths: Vec<_> = merged.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_parse_yaml_config() {
        let config = ConfigFile::parse(
            Path::new("typeprobe.yaml"),
            "compilerOptions:\n  strict: true\nfiles:\n  - a.ts\n",
        )
        .unwrap();
        assert_eq!(config.files, Some(vec!["a.ts".to_string()]));
        assert_eq!(
            config.compiler_options.unwrap().get("strict"),
            Some(&json!(true))
        );
    }

    #[test]
    fn test_load_applies_extends_and_defaults() {
        let fs = MockFileSystem::with_current_dir("/project");
        fs.add_file(
            "/project/base.json",
            r#"{ "compilerOptions": { "strict": true, "target": "es5" } }"#,
        );
        fs.add_file(
            "/project/tsconfig.json",
            r#"{ "extends": "./base", "compilerOptions": { "target": "esnext" } }"#,
        );

        let parsed = ParsedConfig::load(
            &fs,
            Path::new("/project/tsconfig.json"),
            Path::new("/project"),
        )
        .unwrap();
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.compiler_options.get("strict"), Some(&json!(true)));
        assert_eq!(parsed.compiler_options.get("target"), Some(&json!("esnext")));
        assert_eq!(parsed.include, vec!["/project/**/*".to_string()]);
        assert_eq!(
            parsed.exclude,
            vec!["/project/node_modules".to_string(), "/project/dist".to_string()]
        );
    }

    #[test]
    fn test_load_reports_extends_cycle() {
        let fs = MockFileSystem::new();
        fs.add_file("/a.json", r#"{ "extends": "./b.json" }"#);
        fs.add_file("/b.json", r#"{ "extends": "./a.json" }"#);

        let parsed = ParsedConfig::load(&fs, Path::new("/a.json"), Path::new("/")).unwrap();
        assert_eq!(parsed.diagnostics.len(), 1);
        assert!(parsed.diagnostics[0].starts_with("Circularity detected"));
    }

    #[test]
    fn test_load_malformed_config_fails() {
        let fs = MockFileSystem::new();
        fs.add_file("/tsconfig.json", "{ not json");
        let error = ParsedConfig::load(&fs, Path::new("/tsconfig.json"), Path::new("/"))
            .unwrap_err();
        assert!(error.to_string().starts_with("failed to read config file.\n"));
    }

    #[test]
    fn test_compile_options_merge() {
        let base = CompileOptions::from_config_file("/project", "tsconfig.json");
        let overrides = CompileOptions {
            files: Some(vec!["extra.ts".to_string()]),
            config_file_name: Some("other.json".to_string()),
            ..CompileOptions::default()
        };
        let merged = base.merged_with(&overrides);
        assert_eq!(merged.base_path, Some(PathBuf::from("/project")));
        assert_eq!(merged.config_file_name.as_deref(), Some("other.json"));
        assert_eq!(merged.files, Some(vec!["extra.ts".to_string()]));
    }
}
