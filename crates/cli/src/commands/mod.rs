//! Command implementations.

pub mod reference;
pub mod submit;

use checkout_kit::CheckoutError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A checkout operation failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The draft file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadDraft {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Output could not be serialized.
    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    /// The country code is not well formed.
    #[error("Invalid country code: {0}")]
    InvalidCountryCode(String),
}
