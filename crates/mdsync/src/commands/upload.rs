//! `mdsync upload` command implementation.

use std::io::BufRead;
use std::path::PathBuf;

use clap::Args;
use mdsync_config::{CliSettings, Config, InsertPosition};
use mdsync_confluence::updater::{DryRunResult, UnitReport, UnitStatus, UpdateResult};
use mdsync_confluence::{ConfluenceClient, PageUpdater, UpdateConfig, load_sources};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the upload command.
#[derive(Args)]
pub(crate) struct UploadArgs {
    /// Confluence page ID to insert into (prompted for when omitted).
    #[arg(short, long, env = "MDSYNC_PAGE_ID")]
    page_id: Option<String>,

    /// Directory with the Markdown files (overrides config).
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Where new sections go: append, prepend or replace (overrides config).
    #[arg(long)]
    position: Option<InsertPosition>,

    /// Version message for the update.
    #[arg(short, long)]
    message: Option<String>,

    /// Preview changes without updating Confluence.
    #[arg(long)]
    dry_run: bool,

    /// Path to configuration file (default: auto-discover mdsync.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl UploadArgs {
    /// Execute the upload command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input loading or the update fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            input_dir: self.input_dir.clone(),
            position: self.position,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let conf_config = config.require_confluence()?;
        let upload = &config.upload_resolved;

        let units = load_sources(&upload.input_dir)?;
        output.info(&format!(
            "Found {} Markdown file(s) in {}",
            units.len(),
            upload.input_dir.display()
        ));

        let page_id = resolve_page_id(self.page_id, &output, &mut std::io::stdin().lock())?;

        let client = ConfluenceClient::from_config(conf_config);
        let updater = PageUpdater::new(&client, UpdateConfig::from(upload));

        if self.dry_run {
            let result = updater.dry_run(&page_id, &units)?;
            print_dry_run_result(&output, &result);
        } else {
            let result = updater.update(&page_id, &units, self.message.as_deref())?;
            print_update_result(&output, &result);
        }

        Ok(())
    }
}

/// Use the given page ID or ask for one.
fn resolve_page_id(
    page_id: Option<String>,
    output: &Output,
    input: &mut impl BufRead,
) -> Result<String, CliError> {
    let page_id = match page_id {
        Some(id) => id.trim().to_owned(),
        None => output.prompt("Confluence page ID: ", input)?,
    };
    if page_id.is_empty() {
        return Err(CliError::Validation("No page ID provided.".to_owned()));
    }
    Ok(page_id)
}

fn print_units(output: &Output, units: &[UnitReport]) {
    for unit in units {
        match (unit.status, &unit.marker) {
            (UnitStatus::Prepared, Some(marker)) => {
                output.success(&format!("  + {} ({marker})", unit.file_name));
            }
            (UnitStatus::AlreadyPresent, Some(marker)) => {
                output.info(&format!("  = {} ({marker}, already on page)", unit.file_name));
            }
            (UnitStatus::Empty, _) => {
                output.warning(&format!("  - {} (empty, skipped)", unit.file_name));
            }
            (_, None) => output.info(&format!("  ? {}", unit.file_name)),
        }
    }
}

fn print_dry_run_result(output: &Output, result: &DryRunResult) {
    output.highlight("\n[DRY RUN] No changes made.");
    output.info(&format!(
        "Current page: \"{}\" (v{})",
        result.current_title, result.current_version
    ));
    print_units(output, &result.units);

    if result.has_changes() {
        output.info(&format!(
            "\nWould add {} section(s) as v{}. Resulting body ({} bytes):",
            result.prepared_count(),
            result.current_version + 1,
            result.html.len()
        ));
        output.separator();
        output.info(&result.html);
        output.separator();
    } else {
        output.success("\nNo new content to add.");
    }
}

fn print_update_result(output: &Output, result: &UpdateResult) {
    print_units(output, &result.units);

    match &result.page {
        Some(page) => {
            output.success(&format!(
                "\nPage updated successfully! Added {} section(s).",
                result.prepared_count()
            ));
            output.info(&format!("ID: {}", page.id));
            output.info(&format!("Title: {}", page.title));
            output.info(&format!(
                "Version: {} -> {}",
                result.previous_version, page.version.number
            ));
        }
        None => output.success("\nNo new content to add."),
    }
    output.info(&format!("URL: {}", result.url));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_page_id_from_argument() {
        let mut input = Cursor::new("ignored\n");
        let id = resolve_page_id(Some(" 123 ".to_owned()), &Output::new(), &mut input).unwrap();
        assert_eq!(id, "123");
    }

    #[test]
    fn test_page_id_prompted() {
        let mut input = Cursor::new("  456\n");
        let id = resolve_page_id(None, &Output::new(), &mut input).unwrap();
        assert_eq!(id, "456");
    }

    #[test]
    fn test_empty_page_id_rejected() {
        let mut input = Cursor::new("\n");
        let err = resolve_page_id(None, &Output::new(), &mut input).unwrap_err();
        assert_eq!(err.to_string(), "No page ID provided.");
    }

    #[test]
    fn test_page_id_at_end_of_input() {
        let mut input = Cursor::new("");
        assert!(resolve_page_id(None, &Output::new(), &mut input).is_err());
    }
}
