//! boxc — compile a `.box` markup file into HTML.
//!
//! Loads component plugins, compiles the input and writes the result next
//! to it. Exit status is 1 for setup failures (config, plugins, I/O) and 2
//! when compilation itself fails.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use boxc::config::BoxcConfig;
use boxc::dsl::{CompileError, Compiler};
use boxc::registry::{PluginDir, Registry};

#[derive(Debug, Parser)]
#[command(name = "boxc", version, about = "Compile box markup into HTML")]
struct Args {
    /// Input `.box` file.
    input: PathBuf,

    /// Plugin directory (repeatable). Replaces the configured directories.
    #[arg(long = "plugins", value_name = "DIR")]
    plugins: Vec<PathBuf>,

    /// Output file. Defaults to the input path with the output extension.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file. Defaults to ~/.boxc/config.yaml.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool, config_filter: Option<&str>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config_filter.unwrap_or("warn")))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_registry(dirs: &[PathBuf]) -> anyhow::Result<Registry> {
    let mut registry = Registry::new();
    for dir in dirs {
        registry
            .populate_from(&PluginDir::new(dir))
            .with_context(|| format!("failed to load plugins from {}", dir.display()))?;
    }

    tracing::info!(components = registry.len(), "Loaded plugins:");
    for meta in registry.metadata() {
        tracing::info!("- {meta}");
    }
    Ok(registry)
}

fn run(args: &Args, config: &BoxcConfig) -> anyhow::Result<PathBuf> {
    if !args.input.exists() {
        anyhow::bail!("File {} not found!", args.input.display());
    }

    let plugin_dirs = if args.plugins.is_empty() {
        &config.plugin_dirs
    } else {
        &args.plugins
    };
    let registry = load_registry(plugin_dirs)?;

    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let document = Compiler::compile(&source, &registry)?;
    if !document.warnings.is_empty() {
        tracing::info!(count = document.warnings.len(), "compiled with warnings");
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_path(&args.input));
    std::fs::write(&output, &document.html)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(output)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BoxcConfig::load_from(path),
        None => BoxcConfig::load(),
    };
    let config_filter = config.as_ref().ok().and_then(|c| c.log_filter.clone());
    init_tracing(args.verbose, config_filter.as_deref());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    match run(&args, &config) {
        Ok(output) => {
            println!("Compiled {} → {}", args.input.display(), output.display());
            ExitCode::SUCCESS
        }
        Err(e) if e.downcast_ref::<CompileError>().is_some() => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
