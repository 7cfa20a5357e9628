//! REST reference-data client.
//!
//! Talks to a Spring Data REST style backend:
//!
//! - `GET {base}/countries`
//! - `GET {base}/states/search/findByCountryCode?code={code}`
//!
//! Both return HAL documents with the rows under `_embedded`. Results are
//! cached with `moka` for the configured TTL.

use std::sync::Arc;

use checkout_kit_core::{Country, CountryCode, State};
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::card_dates;
use super::{ReferenceData, ReferenceDataError};
use crate::clock::Clock;
use crate::config::ReferenceApiConfig;

const COUNTRIES_PATH: &str = "countries";
const STATES_BY_COUNTRY_PATH: &str = "states/search/findByCountryCode";

/// Longest response excerpt kept in an error message.
const ERROR_BODY_LIMIT: usize = 200;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct HalPage<T> {
    #[serde(rename = "_embedded", default = "Embedded::empty")]
    embedded: Embedded<T>,
}

#[derive(Debug, Deserialize)]
struct Embedded<T> {
    #[serde(default = "Vec::new", alias = "countries", alias = "states")]
    rows: Vec<T>,
}

impl<T> Embedded<T> {
    const fn empty() -> Self {
        Self { rows: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
struct CountryDto {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct StateDto {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    name: String,
}

impl StateDto {
    /// The backend's state rows may carry only a numeric id.
    fn into_state(self, country_code: &CountryCode) -> State {
        let code = self
            .code
            .or_else(|| {
                self.id.map(|id| match id {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
            })
            .unwrap_or_else(|| self.name.clone());
        State::new(code, self.name, country_code.clone())
    }
}

// =============================================================================
// HttpReferenceData
// =============================================================================

/// Reference data fetched from a REST backend.
#[derive(Clone)]
pub struct HttpReferenceData {
    inner: Arc<HttpReferenceDataInner>,
}

struct HttpReferenceDataInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
    clock: Arc<dyn Clock>,
    year_window: u32,
}

impl HttpReferenceData {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError::Http`] if the HTTP client cannot be built,
    /// or [`ReferenceDataError::Parse`] if the access token is not a valid
    /// header value.
    pub fn new(
        config: &ReferenceApiConfig,
        clock: Arc<dyn Clock>,
        year_window: u32,
    ) -> Result<Self, ReferenceDataError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| ReferenceDataError::Parse("access token is not a valid header".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpReferenceDataInner {
                client,
                base_url: directory_url(&config.base_url),
                cache,
                clock,
                year_window,
            }),
        })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ReferenceDataError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Reference API returned non-success status"
            );
            return Err(ReferenceDataError::Api {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse reference API response");
            ReferenceDataError::Parse(e.to_string())
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ReferenceDataError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ReferenceDataError::Parse(format!("invalid endpoint {path}: {e}")))
    }
}

impl ReferenceData for HttpReferenceData {
    async fn credit_card_months(&self, start_month: u32) -> Result<Vec<u32>, ReferenceDataError> {
        Ok(card_dates::credit_card_months(start_month))
    }

    async fn credit_card_years(&self) -> Result<Vec<i32>, ReferenceDataError> {
        Ok(card_dates::credit_card_years(
            self.inner.clock.current_year(),
            self.inner.year_window,
        ))
    }

    #[instrument(skip(self))]
    async fn countries(&self) -> Result<Vec<Country>, ReferenceDataError> {
        if let Some(CacheValue::Countries(countries)) =
            self.inner.cache.get(&CacheKey::Countries).await
        {
            debug!("Cache hit for countries");
            return Ok(countries);
        }

        let page: HalPage<CountryDto> = self.get_json(self.endpoint(COUNTRIES_PATH)?).await?;
        let countries = page
            .embedded
            .rows
            .into_iter()
            .map(|dto| {
                CountryCode::parse(&dto.code)
                    .map(|code| Country::new(code, dto.name))
                    .map_err(|e| ReferenceDataError::Parse(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.inner
            .cache
            .insert(CacheKey::Countries, CacheValue::Countries(countries.clone()))
            .await;

        Ok(countries)
    }

    #[instrument(skip(self), fields(country = %country_code))]
    async fn states(&self, country_code: &CountryCode) -> Result<Vec<State>, ReferenceDataError> {
        let key = CacheKey::States(country_code.clone());
        if let Some(CacheValue::States(states)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for states");
            return Ok(states);
        }

        let mut url = self.endpoint(STATES_BY_COUNTRY_PATH)?;
        url.query_pairs_mut()
            .append_pair("code", country_code.as_str());

        let page: HalPage<StateDto> = self.get_json(url).await?;
        let states: Vec<State> = page
            .embedded
            .rows
            .into_iter()
            .map(|dto| dto.into_state(country_code))
            .collect();

        self.inner
            .cache
            .insert(key, CacheValue::States(states.clone()))
            .await;

        Ok(states)
    }
}

/// `Url::join` drops the last segment unless the path ends in `/`.
fn directory_url(base: &Url) -> Url {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
