//! Meridian command-line tool.
//!
//! Converts FHIR resources between JSON and XML and works with HL7 v2.x
//! messages: acknowledgments, diffs and merges. Logs go to stderr.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

use commands::convert::ConvertCommand;
use commands::hl7::{AckCommand, DiffCommand, MergeCommand};

#[derive(Debug, Parser)]
#[command(name = "meridian")]
#[command(about = "FHIR JSON/XML conversion and HL7 v2 message tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level for the meridian crates (`RUST_LOG` takes precedence).
    #[arg(long, global = true, env = "MERIDIAN_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a FHIR resource between JSON and XML
    Convert(ConvertCommand),
    /// Print the acknowledgment for an HL7 v2 message
    Ack(AckCommand),
    /// Compare two HL7 v2 messages (exit code 1 when they differ)
    Diff(DiffCommand),
    /// Merge HL7 v2 messages into one
    Merge(MergeCommand),
}

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "meridian_cli={level},meridian_serde={level},meridian_hl7v2={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Convert(cmd) => cmd.execute(),
        Commands::Ack(cmd) => cmd.execute(),
        Commands::Diff(cmd) => cmd.execute(),
        Commands::Merge(cmd) => cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert_flags() {
        let cli = Cli::try_parse_from([
            "meridian",
            "convert",
            "patient.json",
            "--to",
            "xml",
            "--include-version",
            "--fhir-version",
            "R5",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "warn");
        assert!(matches!(cli.command, Commands::Convert(_)));
    }

    #[test]
    fn test_unknown_merge_strategy_rejected() {
        let result = Cli::try_parse_from(["meridian", "merge", "a.hl7", "--strategy", "union"]);
        assert!(result.is_err());
    }
}
