//! natpl CLI - Command-line interface for the natpl calculator language

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use natpl_core::{EvalResult, Runtime};

mod config;
mod repl;
mod report;

use config::Config;
use report::{describe_error, format_print};

#[derive(Parser)]
#[command(name = "natpl")]
#[command(version = natpl_core::VERSION)]
#[command(about = "A calculator language with units", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Significant digits kept by division (overrides the config file)
    #[arg(long, global = true)]
    precision: Option<u64>,

    /// Path to a config file (default: natpl/config.toml in the config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive REPL
    Repl,

    /// Run a natpl source file, showing its print lines
    Run {
        /// Path to the source file
        file: PathBuf,
    },

    /// Evaluate lines given on the command line
    Eval {
        /// Program lines, one per argument
        #[arg(required = true, allow_hyphen_values = true)]
        lines: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(precision) = cli.precision {
        config.precision = precision;
    }
    let runtime = prepare_runtime(&config)?;

    match cli.command {
        Some(Commands::Run { file }) => run_file(runtime, &file),
        Some(Commands::Eval { lines }) => eval_lines(runtime, &lines),
        Some(Commands::Repl) | None => {
            let mut repl = repl::Repl::new(runtime, &config)?;
            repl.run()
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// A runtime at the configured precision with the prelude files evaluated
fn prepare_runtime(config: &Config) -> Result<Runtime> {
    let mut runtime = Runtime::with_precision(config.precision);
    for path in &config.prelude {
        load_file(&mut runtime, path).context("Failed to load prelude")?;
    }
    Ok(runtime)
}

/// Evaluate a source file into `runtime`
pub(crate) fn load_file(runtime: &mut Runtime, path: &Path) -> Result<Vec<EvalResult>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file '{}': {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "loading file");

    let origin = path.display().to_string();
    runtime
        .eval_source(&source)
        .map_err(|e| anyhow::anyhow!(describe_error(&source, Some(&origin), &e)))
}

/// Run a natpl source file
fn run_file(mut runtime: Runtime, path: &Path) -> Result<()> {
    let results = load_file(&mut runtime, path)?;
    for line in results.iter().filter_map(format_print) {
        println!("{line}");
    }
    Ok(())
}

/// Evaluate command-line arguments as consecutive program lines
fn eval_lines(mut runtime: Runtime, lines: &[String]) -> Result<()> {
    let source = lines.join("\n");
    let results = runtime
        .eval_source(&source)
        .map_err(|e| anyhow::anyhow!(describe_error(&source, None, &e)))?;

    for line in results.iter().filter_map(format_print) {
        println!("{line}");
    }
    if let Some(EvalResult::Value(value)) = results.last() {
        println!("{value}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["natpl", "run", "calc.natpl"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Run { .. })));

        let cli = Cli::try_parse_from(["natpl", "--precision", "8", "eval", "1 / 3"]).unwrap();
        assert_eq!(cli.precision, Some(8));
        assert!(matches!(cli.command, Some(Commands::Eval { ref lines }) if lines.len() == 1));

        let cli = Cli::try_parse_from(["natpl"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn eval_accepts_negative_lines() {
        let cli = Cli::try_parse_from(["natpl", "eval", "-2^2"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Eval { ref lines }) if lines[0] == "-2^2"));
    }

    #[test]
    fn eval_requires_lines() {
        assert!(Cli::try_parse_from(["natpl", "eval"]).is_err());
    }

    #[test]
    fn prelude_is_evaluated() {
        let dir = tempfile::tempdir().unwrap();
        let prelude = dir.path().join("si.natpl");
        std::fs::write(&prelude, "unit m\nunit s\n").unwrap();

        let config = Config {
            precision: 12,
            prelude: vec![prelude],
            ..Config::default()
        };
        let runtime = prepare_runtime(&config).unwrap();
        assert_eq!(runtime.units().len(), 2);
        assert_eq!(runtime.precision(), 12);
    }

    #[test]
    fn failing_prelude_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let prelude = dir.path().join("bad.natpl");
        std::fs::write(&prelude, "unit m\nunit m\n").unwrap();

        let config = Config {
            prelude: vec![prelude],
            ..Config::default()
        };
        let err = prepare_runtime(&config).unwrap_err();
        assert!(format!("{err:#}").contains("unit redeclared: m"));
    }
}
