use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use typeprobe_core::compiler::{compile, CompileResult};
use typeprobe_core::config::{CompileOptions, ConfigFile, RawCompilerOptions};
use typeprobe_core::di::Container;
use typeprobe_core::testing_error::render_message;

/// Config files looked up in the current directory, in order
const DEFAULT_CONFIG_FILES: &[&str] = &["typeprobe.json", "typeprobe.yaml", "tsconfig.json"];

/// typeprobe - compile-time type assertions for TypeScript probe scripts
#[derive(Parser, Debug, Clone)]
#[command(name = "typeprobe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Probe files to check
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to a typeprobe.json / tsconfig.json configuration file
    #[arg(short, long, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Enable every strict checking option
    #[arg(long)]
    strict: bool,

    /// When to colour the output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Print syntax and type errors found in the probe files
    #[arg(long)]
    diagnostics: bool,

    /// Print the compile result as JSON
    #[arg(long)]
    json: bool,

    /// Initialize a new typeprobe project
    #[arg(long)]
    init: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => std::io::stdout().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug for detailed logs
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.init {
        init_project()?;
        return Ok(());
    }

    let Some(options) = load_compile_options(&cli)? else {
        eprintln!("Error: No input files specified. Use --help for usage information.");
        std::process::exit(1);
    };
    debug!(?options, "resolved compile options");

    let colored = cli.color.enabled();
    let container = if cli.diagnostics {
        Container::with_console(colored)
    } else {
        Container::new()
    };

    let result = compile(&options, &container)?;
    info!(files = result.files.len(), failures = result.errors.len(), "compiled");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result, colored);
    }

    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

/// Compile options from the command line, or `None` when there is nothing to check
fn load_compile_options(cli: &Cli) -> anyhow::Result<Option<CompileOptions>> {
    let mut overrides = RawCompilerOptions::new();
    if cli.strict {
        overrides.insert("strict".to_string(), Value::Bool(true));
    }
    let files: Vec<String> = cli
        .files
        .iter()
        .map(|file| file.to_string_lossy().into_owned())
        .collect();

    let project = match &cli.project {
        Some(project) => Some(project.clone()),
        None if files.is_empty() => DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.is_file()),
        None => None,
    };

    if let Some(project) = project {
        let base_path = match project.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = project
            .file_name()
            .with_context(|| format!("Invalid project path: {}", project.display()))?
            .to_string_lossy()
            .into_owned();
        let mut options = CompileOptions::from_config_file(base_path, file_name);
        if !overrides.is_empty() {
            options.compiler_options = Some(overrides);
        }
        if !files.is_empty() {
            options.files = Some(files);
        }
        return Ok(Some(options));
    }

    if files.is_empty() {
        return Ok(None);
    }
    Ok(Some(CompileOptions::from_files(overrides, files)))
}

fn print_report(result: &CompileResult, colored: bool) {
    for (key, error) in &result.errors {
        let location = if colored {
            format!("\x1b[1m{}\x1b[0m", key)
        } else {
            key.clone()
        };
        println!("{}", location);
        println!("{}", render_message(error, colored));
    }

    let files = result.files.len();
    if result.has_errors() {
        let summary = format!("{} failing type assertion(s) in {} file(s)", result.errors.len(), files);
        if colored {
            println!("\x1b[31m{}\x1b[0m", summary);
        } else {
            println!("{}", summary);
        }
    } else {
        println!("All type assertions passed ({} file(s))", files);
    }
}

fn init_project() -> anyhow::Result<()> {
    println!("Initializing new typeprobe project...");

    let config_path = Path::new(DEFAULT_CONFIG_FILES[0]);
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }
    let config = ConfigFile::starter().to_json_pretty()?;
    std::fs::write(config_path, format!("{}\n", config))?;
    println!("Created {}", config_path.display());

    std::fs::create_dir_all("probes")?;
    println!("Created probes/ directory");

    let sample = r#"// Welcome to typeprobe!
// Every assertion below is checked at compile time.

interface User {
    name: string;
    age: number;
}

const user: User = { name: "Ada", age: 36 };

expectType(user).toBe<User>();
expectType(user.name).toBeString();
expectType<"admin" | "guest">().toBeUnion();
expectType(user.age).not.toBeString();
"#;

    std::fs::write("probes/example.ts", sample)?;
    println!("Created probes/example.ts");

    println!("\nProject initialized successfully!");
    println!("Run 'typeprobe' to check your probes.");

    Ok(())
}
