//! mdsync CLI - Markdown to Confluence.
//!
//! Provides commands for:
//! - `upload`: Insert the Markdown files of a directory into a page
//! - `export`: Write a page (with children) or a space as Markdown files

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExportArgs, UploadArgs};
use output::Output;

/// mdsync - Markdown to Confluence without duplicates.
#[derive(Parser)]
#[command(name = "mdsync", version, about)]
struct Cli {
    /// Enable verbose output (info level logging).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert Markdown files into a Confluence page.
    Upload(UploadArgs),
    /// Export Confluence pages to Markdown files.
    Export(ExportArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Upload(args) => args.execute(),
        Commands::Export(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
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
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["mdsync", "upload", "--verbose", "--page-id", "1"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Upload(_)));
    }

    #[test]
    fn test_export_requires_url() {
        assert!(Cli::try_parse_from(["mdsync", "export"]).is_err());
    }
}
