//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `CHECKOUT_REFERENCE_DATA_URL` - Base URL of the reference-data REST API.
//!   When unset, the countries and states bundled with the crate are used.
//! - `CHECKOUT_REFERENCE_DATA_TOKEN` - Bearer token for the reference-data API
//! - `CHECKOUT_REFERENCE_CACHE_TTL_SECS` - Reference response cache TTL (default: 300)
//! - `CHECKOUT_CARD_YEAR_WINDOW` - Years offered after the current one, 1 to 50 (default: 10)
//! - `CHECKOUT_CURRENCY` - Currency of the cart summary (default: USD)
//! - `CHECKOUT_STATE_SELECTION` - `first` or `none` (default: first)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use checkout_kit_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::controller::StateSelectionPolicy;
use crate::reference::card_dates::{DEFAULT_YEAR_WINDOW, MAX_YEAR_WINDOW};

const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Accepted range for `CHECKOUT_CARD_YEAR_WINDOW`.
const YEAR_WINDOW_RANGE: std::ops::RangeInclusive<u32> = 1..=MAX_YEAR_WINDOW;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Checkout configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Where countries and states come from
    pub reference_data: ReferenceDataConfig,
    /// Years offered after the current one for card expiration
    pub card_year_window: u32,
    /// Currency of the cart summary
    pub currency: CurrencyCode,
    /// What to do with the state field after a state list arrives
    pub state_selection: StateSelectionPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Reference data source.
#[derive(Debug, Clone)]
pub enum ReferenceDataConfig {
    /// Countries and states bundled with the crate.
    Bundled,
    /// A REST backend.
    Http(ReferenceApiConfig),
}

/// Reference-data REST API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ReferenceApiConfig {
    /// Base URL the `countries` and `states` endpoints hang off
    pub base_url: Url,
    /// Optional bearer token
    pub access_token: Option<SecretString>,
    /// How long responses stay cached
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for ReferenceApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            reference_data: ReferenceDataConfig::Bundled,
            card_year_window: DEFAULT_YEAR_WINDOW,
            currency: CurrencyCode::USD,
            state_selection: StateSelectionPolicy::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for unparseable values and
    /// `ConfigError::MissingEnvVar` when a token is given without a URL.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let reference_data = match get("CHECKOUT_REFERENCE_DATA_URL") {
            Some(raw) => {
                let base_url = Url::parse(raw.trim()).map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "CHECKOUT_REFERENCE_DATA_URL".to_string(),
                        e.to_string(),
                    )
                })?;
                let cache_ttl = parse_or_default(
                    get("CHECKOUT_REFERENCE_CACHE_TTL_SECS"),
                    "CHECKOUT_REFERENCE_CACHE_TTL_SECS",
                    DEFAULT_CACHE_TTL_SECS,
                )?;
                if cache_ttl == 0 {
                    return Err(ConfigError::InvalidEnvVar(
                        "CHECKOUT_REFERENCE_CACHE_TTL_SECS".to_string(),
                        "must be greater than zero".to_string(),
                    ));
                }
                ReferenceDataConfig::Http(ReferenceApiConfig {
                    base_url,
                    access_token: get("CHECKOUT_REFERENCE_DATA_TOKEN").map(SecretString::from),
                    cache_ttl: Duration::from_secs(cache_ttl),
                })
            }
            None if get("CHECKOUT_REFERENCE_DATA_TOKEN").is_some() => {
                return Err(ConfigError::MissingEnvVar(
                    "CHECKOUT_REFERENCE_DATA_URL".to_string(),
                ));
            }
            None => ReferenceDataConfig::Bundled,
        };

        let card_year_window = parse_or_default(
            get("CHECKOUT_CARD_YEAR_WINDOW"),
            "CHECKOUT_CARD_YEAR_WINDOW",
            DEFAULT_YEAR_WINDOW,
        )?;
        if !YEAR_WINDOW_RANGE.contains(&card_year_window) {
            return Err(ConfigError::InvalidEnvVar(
                "CHECKOUT_CARD_YEAR_WINDOW".to_string(),
                format!(
                    "must be between {} and {}",
                    YEAR_WINDOW_RANGE.start(),
                    YEAR_WINDOW_RANGE.end()
                ),
            ));
        }
        let currency = parse_or_default(get("CHECKOUT_CURRENCY"), "CHECKOUT_CURRENCY", CurrencyCode::USD)?;
        let state_selection = parse_or_default(
            get("CHECKOUT_STATE_SELECTION"),
            "CHECKOUT_STATE_SELECTION",
            StateSelectionPolicy::default(),
        )?;

        Ok(Self {
            reference_data,
            card_year_window,
            currency,
            state_selection,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional value, falling back to `default` when unset.
fn parse_or_default<T>(raw: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CheckoutConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CheckoutConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(matches!(config.reference_data, ReferenceDataConfig::Bundled));
        assert_eq!(config.card_year_window, 10);
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.state_selection, StateSelectionPolicy::AutoSelectFirst);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_http_reference_data() {
        let config = load(&[
            ("CHECKOUT_REFERENCE_DATA_URL", "http://localhost:8080/api"),
            ("CHECKOUT_REFERENCE_DATA_TOKEN", "s3cr3t-t0ken"),
            ("CHECKOUT_REFERENCE_CACHE_TTL_SECS", "60"),
        ])
        .unwrap();

        let ReferenceDataConfig::Http(api) = config.reference_data else {
            panic!("expected HTTP reference data");
        };
        assert_eq!(api.base_url.as_str(), "http://localhost:8080/api");
        assert_eq!(api.cache_ttl, Duration::from_secs(60));
        assert!(api.access_token.is_some());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[
            ("CHECKOUT_REFERENCE_DATA_URL", "http://localhost:8080/api"),
            ("CHECKOUT_REFERENCE_DATA_TOKEN", "s3cr3t-t0ken"),
        ])
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cr3t-t0ken"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_token_without_url() {
        let err = load(&[("CHECKOUT_REFERENCE_DATA_TOKEN", "s3cr3t")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "CHECKOUT_REFERENCE_DATA_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("CHECKOUT_REFERENCE_DATA_URL", "not a url"),
            ("CHECKOUT_CARD_YEAR_WINDOW", "ten"),
            ("CHECKOUT_CURRENCY", "XYZ"),
            ("CHECKOUT_STATE_SELECTION", "last"),
        ];
        for (key, value) in cases {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(k, _) if k == key),
                "{key}={value} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let err = load(&[
            ("CHECKOUT_REFERENCE_DATA_URL", "http://localhost:8080/api"),
            ("CHECKOUT_REFERENCE_CACHE_TTL_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_year_window_out_of_range() {
        for value in ["0", "51", "4000000000"] {
            let err = load(&[("CHECKOUT_CARD_YEAR_WINDOW", value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(k, _) if k == "CHECKOUT_CARD_YEAR_WINDOW"),
                "{value} gave {err:?}"
            );
        }

        let config = load(&[("CHECKOUT_CARD_YEAR_WINDOW", "50")]).unwrap();
        assert_eq!(config.card_year_window, 50);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CHECKOUT_CARD_YEAR_WINDOW", "5"),
            ("CHECKOUT_CURRENCY", "eur"),
            ("CHECKOUT_STATE_SELECTION", "none"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
            ("SENTRY_ENVIRONMENT", "staging"),
        ])
        .unwrap();
        assert_eq!(config.card_year_window, 5);
        assert_eq!(config.currency, CurrencyCode::EUR);
        assert_eq!(config.state_selection, StateSelectionPolicy::LeaveUnselected);
        assert_eq!(config.sentry_environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[("CHECKOUT_REFERENCE_DATA_URL", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert!(matches!(config.reference_data, ReferenceDataConfig::Bundled));
        assert!(config.sentry_dsn.is_none());
    }
}
