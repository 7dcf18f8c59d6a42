//! CLI error types.

use docgraph_config::ConfigError;
use docgraph_site::{MarkerError, ParseCategoryError, StoreError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Category(#[from] ParseCategoryError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("invalid marker: {0}")]
    Marker(#[from] MarkerError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}
