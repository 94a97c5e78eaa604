//! CLI error types.

use mdsync_config::ConfigError;
use mdsync_confluence::UpdateError;
use mdsync_confluence::export::ExportError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Update(#[from] UpdateError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Validation(String),
}
