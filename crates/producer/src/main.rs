//! Synthetic Data Producer
//!
//! Feeds monitoring dashboards with plausible test data. Invoked with
//! `--initialize` it prints the metric schema; invoked any other way it
//! prints one round of freshly sampled values. Either way the whole of
//! stdout is a single JSON array, and logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use producer_lib::{Catalog, Generator, Mode, RunLogger};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod output;

const PRODUCER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Synthetic Data Producer
#[derive(Parser, Debug)]
#[command(name = "synthetic-data-producer")]
#[command(
    author,
    version,
    about = "Synthetic metric producer for monitoring dashboards",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Print metric definitions instead of sampled values
    #[arg(long)]
    pub initialize: bool,

    /// Catalog file (TOML, JSON or YAML) replacing the built-in catalog
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.initialize {
            Mode::Schema
        } else {
            Mode::Sample
        }
    }
}

/// Parse arguments without ever rejecting them.
///
/// There are no help or version flags: stdout only ever carries the
/// metric document. Anything clap cannot parse, `-h` and `--version`
/// included, falls back to a plain scan for `--initialize`; the parse
/// error is returned so it can be logged.
fn parse_args(args: Vec<String>) -> (Cli, Option<String>) {
    match Cli::try_parse_from(&args) {
        Ok(cli) => (cli, None),
        Err(err) => {
            let cli = Cli {
                initialize: args.iter().skip(1).any(|a| a == "--initialize"),
                catalog: None,
            };
            let details = err.to_string().lines().next().unwrap_or_default().to_string();
            (cli, Some(details))
        }
    }
}

fn main() -> Result<()> {
    let config = config::ProducerConfig::load()?;

    // JSON logs on stderr; stdout is reserved for the metric document
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let (cli, fallback) = parse_args(std::env::args().collect());
    let mode = cli.mode();

    let catalog_path = cli.catalog.or(config.catalog);
    let logger = RunLogger::new(match &catalog_path {
        Some(path) => path.display().to_string(),
        None => "builtin".to_string(),
    });
    logger.log_startup(PRODUCER_VERSION, mode);
    if let Some(details) = fallback {
        logger.log_argument_fallback(&details, mode);
    }

    let catalog = match &catalog_path {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("Failed to load catalog {}", logger.catalog_source()))?,
        None => Catalog::builtin(),
    };
    let generator = Generator::new(catalog).context("Invalid catalog")?;
    logger.log_catalog(
        generator.catalog().groups.len(),
        generator.catalog().entity_count(),
        generator.catalog().record_count(),
    );

    let stdout = std::io::stdout();
    let records = match mode {
        Mode::Schema => output::write_document(stdout.lock(), &generator.describe())?,
        Mode::Sample => output::write_document(stdout.lock(), &generator.sample())?,
    };
    logger.log_emitted(mode, records);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("synthetic-data-producer")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_no_arguments_is_sample_mode() {
        let (cli, fallback) = parse_args(args(&[]));
        assert_eq!(cli.mode(), Mode::Sample);
        assert!(fallback.is_none());
    }

    #[test]
    fn test_initialize_is_schema_mode() {
        let (cli, fallback) = parse_args(args(&["--initialize"]));
        assert_eq!(cli.mode(), Mode::Schema);
        assert!(fallback.is_none());
    }

    #[test]
    fn test_catalog_option() {
        let (cli, _) =
            parse_args(args(&["--catalog", "/tmp/catalog.toml", "--initialize"]));
        assert_eq!(cli.catalog, Some(PathBuf::from("/tmp/catalog.toml")));
        assert_eq!(cli.mode(), Mode::Schema);
    }

    #[test]
    fn test_unknown_argument_falls_back_to_sample() {
        let (cli, fallback) = parse_args(args(&["--bogus", "extra"]));
        assert_eq!(cli.mode(), Mode::Sample);
        assert!(cli.catalog.is_none());
        assert!(fallback.is_some());
    }

    #[test]
    fn test_initialize_survives_unknown_arguments() {
        let (cli, fallback) = parse_args(args(&["--verbose", "--initialize"]));
        assert_eq!(cli.mode(), Mode::Schema);
        assert!(fallback.is_some());
    }

    #[test]
    fn test_repeated_flag_stays_schema_mode() {
        let (cli, _) = parse_args(args(&["--initialize", "--initialize"]));
        assert_eq!(cli.mode(), Mode::Schema);
    }

    #[test]
    fn test_help_flags_fall_back_to_sample() {
        for flag in ["-h", "--help", "-V", "--version"] {
            let (cli, fallback) = parse_args(args(&[flag]));
            assert_eq!(cli.mode(), Mode::Sample, "{flag} should sample");
            assert!(fallback.is_some(), "{flag} should be reported as unrecognized");
        }
    }

    #[test]
    fn test_help_flag_keeps_schema_mode() {
        let (cli, _) = parse_args(args(&["--help", "--initialize"]));
        assert_eq!(cli.mode(), Mode::Schema);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
