//! CLI error types.

use cedoc_annotate::{SessionError, SiteError};
use cedoc_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Validation(String),
}
