//! `mdsync export` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdsync_config::{CliSettings, Config};
use mdsync_confluence::ConfluenceClient;
use mdsync_confluence::export::{ExportSource, Exporter};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Page URL (exports the page and its children) or space URL.
    source_url: String,

    /// Directory to write Markdown files to (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdsync.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not recognised, configuration is
    /// invalid, the page cannot be fetched or files cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let source = ExportSource::from_url(&self.source_url)?;

        let cli_settings = CliSettings {
            output_dir: self.output_dir.clone(),
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let conf_config = config.require_confluence()?;
        let output_dir = &config.export_resolved.output_dir;

        match &source {
            ExportSource::Page(id) => output.info(&format!("Exporting page {id} and its children...")),
            ExportSource::Space(key) => output.info(&format!("Exporting space {key}...")),
        }

        let client = ConfluenceClient::from_config(conf_config);
        let result = Exporter::new(&client).export(&source, output_dir)?;

        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }
        for path in &result.written {
            output.info(&format!("  -> {}", path.display()));
        }
        output.success(&format!(
            "\nExported {} page(s) to {}",
            result.written.len(),
            output_dir.display()
        ));

        Ok(())
    }
}
