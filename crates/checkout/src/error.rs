//! Checkout error type and Sentry helpers.
//!
//! Invalid user input is not an error at this level until submit: it lives
//! on the controls as [`FieldErrorKind`](crate::validators::FieldErrorKind)s.
//! `CheckoutError` covers everything that stops an operation outright.

use thiserror::Error;

use crate::config::ConfigError;
use crate::form::{FieldPath, FormError, GroupName};
use crate::reference::ReferenceDataError;

/// Errors returned by checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// States were requested for a group with no country selected.
    #[error("no country selected in {group}")]
    NoCountrySelected { group: GroupName },

    /// Submit was attempted while fields were invalid.
    #[error("checkout form has {} invalid field(s)", fields.len())]
    InvalidForm { fields: Vec<FieldPath> },

    /// A country or state code did not match the loaded reference data.
    #[error("unknown reference: {0}")]
    UnknownReference(String),

    /// Structural misuse of the form.
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// A reference-data lookup failed.
    #[error("Reference data error: {0}")]
    ReferenceData(#[from] ReferenceDataError),

    /// A checkout draft could not be parsed.
    #[error("Invalid draft: {0}")]
    InvalidDraft(#[from] serde_json::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CheckoutError {
    /// Whether repeating the operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ReferenceData(ReferenceDataError::Http(_)) => true,
            Self::ReferenceData(ReferenceDataError::Api { status, .. }) => {
                *status >= 500 || *status == 429
            }
            _ => false,
        }
    }
}

/// Result type alias for `CheckoutError`.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Add a breadcrumb for a checkout step.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of steps
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Shipping country selected", Some(&[("country", "US")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
