//! CLI error type.

use pocketshop_client::api::ApiError;
use pocketshop_client::storage::StorageError;
use pocketshop_client::StoreError;
use thiserror::Error;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Building the HTTP client failed.
    #[error("Client error: {0}")]
    Api(#[from] ApiError),

    /// A store operation failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The persisted session could not be read.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Reading from the terminal or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be rendered as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The command needs a signed-in session.
    #[error("Not signed in. Run `pocketshop login` first.")]
    NotSignedIn,
}
