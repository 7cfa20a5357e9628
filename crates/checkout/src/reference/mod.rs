//! Reference data for the checkout dropdowns.
//!
//! # Providers
//!
//! - [`StaticReferenceData`] - Countries and states bundled with the crate
//!   (or supplied by the caller)
//! - [`HttpReferenceData`] - A REST backend exposing `countries` and
//!   `states/search/findByCountryCode`, cached in memory via `moka`
//!
//! Card expiration months and years are computed locally by both providers
//! (see [`card_dates`]).

pub mod card_dates;
mod cache;
mod http;
mod static_data;

use std::future::Future;
use std::sync::Arc;

use checkout_kit_core::{Country, CountryCode, State};
use thiserror::Error;

pub use http::HttpReferenceData;
pub use static_data::StaticReferenceData;

use crate::clock::Clock;
use crate::config::{CheckoutConfig, ReferenceDataConfig};

/// Errors that can occur while fetching reference data.
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The bundled data file is malformed.
    #[error("Bundled reference data is invalid: {0}")]
    Bundle(#[from] serde_json::Error),
}

/// Supplies countries, states, and card expiration ranges.
pub trait ReferenceData: Send + Sync {
    /// Months offered for card expiration, starting at `start_month`.
    fn credit_card_months(
        &self,
        start_month: u32,
    ) -> impl Future<Output = Result<Vec<u32>, ReferenceDataError>> + Send;

    /// Years offered for card expiration, starting at the current year.
    fn credit_card_years(&self) -> impl Future<Output = Result<Vec<i32>, ReferenceDataError>> + Send;

    /// All countries that can be shipped to or billed in.
    fn countries(&self) -> impl Future<Output = Result<Vec<Country>, ReferenceDataError>> + Send;

    /// States of one country. Unknown countries have no states.
    fn states(
        &self,
        country_code: &CountryCode,
    ) -> impl Future<Output = Result<Vec<State>, ReferenceDataError>> + Send;
}

/// The provider selected by configuration.
#[derive(Clone)]
pub enum ReferenceSource {
    Bundled(StaticReferenceData),
    Http(HttpReferenceData),
}

impl ReferenceSource {
    /// Build the configured provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data is malformed or the HTTP client
    /// cannot be built.
    pub fn from_config(
        config: &CheckoutConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ReferenceDataError> {
        match &config.reference_data {
            ReferenceDataConfig::Bundled => Ok(Self::Bundled(
                StaticReferenceData::bundled(clock)?.with_year_window(config.card_year_window),
            )),
            ReferenceDataConfig::Http(api) => Ok(Self::Http(HttpReferenceData::new(
                api,
                clock,
                config.card_year_window,
            )?)),
        }
    }
}

impl ReferenceData for ReferenceSource {
    async fn credit_card_months(&self, start_month: u32) -> Result<Vec<u32>, ReferenceDataError> {
        match self {
            Self::Bundled(data) => data.credit_card_months(start_month).await,
            Self::Http(data) => data.credit_card_months(start_month).await,
        }
    }

    async fn credit_card_years(&self) -> Result<Vec<i32>, ReferenceDataError> {
        match self {
            Self::Bundled(data) => data.credit_card_years().await,
            Self::Http(data) => data.credit_card_years().await,
        }
    }

    async fn countries(&self) -> Result<Vec<Country>, ReferenceDataError> {
        match self {
            Self::Bundled(data) => data.countries().await,
            Self::Http(data) => data.countries().await,
        }
    }

    async fn states(&self, country_code: &CountryCode) -> Result<Vec<State>, ReferenceDataError> {
        match self {
            Self::Bundled(data) => data.states(country_code).await,
            Self::Http(data) => data.states(country_code).await,
        }
    }
}
