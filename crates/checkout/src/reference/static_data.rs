//! In-memory reference data.

use std::sync::Arc;

use checkout_kit_core::{Country, CountryCode, State};
use serde::Deserialize;

use super::card_dates::{self, DEFAULT_YEAR_WINDOW};
use super::{ReferenceData, ReferenceDataError};
use crate::clock::Clock;

const BUNDLED: &str = include_str!("../../data/reference.json");

#[derive(Deserialize)]
struct BundleFile {
    countries: Vec<BundleCountry>,
}

#[derive(Deserialize)]
struct BundleCountry {
    code: CountryCode,
    name: String,
    #[serde(default)]
    states: Vec<BundleState>,
}

#[derive(Deserialize)]
struct BundleState {
    code: String,
    name: String,
}

/// Reference data held in memory.
#[derive(Clone)]
pub struct StaticReferenceData {
    countries: Arc<[Country]>,
    states: Arc<[State]>,
    clock: Arc<dyn Clock>,
    year_window: u32,
}

impl StaticReferenceData {
    /// Use caller-supplied countries and states.
    #[must_use]
    pub fn new(countries: Vec<Country>, states: Vec<State>, clock: Arc<dyn Clock>) -> Self {
        Self {
            countries: countries.into(),
            states: states.into(),
            clock,
            year_window: DEFAULT_YEAR_WINDOW,
        }
    }

    /// Load the countries and states bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError::Bundle`] if the bundled file is malformed.
    pub fn bundled(clock: Arc<dyn Clock>) -> Result<Self, ReferenceDataError> {
        Self::from_json(BUNDLED, clock)
    }

    /// Parse a reference file of the bundled shape:
    /// `{"countries": [{"code", "name", "states": [{"code", "name"}]}]}`.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError::Bundle`] if the JSON does not match.
    pub fn from_json(json: &str, clock: Arc<dyn Clock>) -> Result<Self, ReferenceDataError> {
        let file: BundleFile = serde_json::from_str(json)?;

        let mut countries = Vec::with_capacity(file.countries.len());
        let mut states = Vec::new();
        for country in file.countries {
            states.extend(
                country
                    .states
                    .into_iter()
                    .map(|state| State::new(state.code, state.name, country.code.clone())),
            );
            countries.push(Country::new(country.code, country.name));
        }

        Ok(Self::new(countries, states, clock))
    }

    /// Offer `window` years after the current one.
    #[must_use]
    pub fn with_year_window(mut self, window: u32) -> Self {
        self.year_window = window;
        self
    }
}

impl ReferenceData for StaticReferenceData {
    async fn credit_card_months(&self, start_month: u32) -> Result<Vec<u32>, ReferenceDataError> {
        Ok(card_dates::credit_card_months(start_month))
    }

    async fn credit_card_years(&self) -> Result<Vec<i32>, ReferenceDataError> {
        Ok(card_dates::credit_card_years(
            self.clock.current_year(),
            self.year_window,
        ))
    }

    async fn countries(&self) -> Result<Vec<Country>, ReferenceDataError> {
        Ok(self.countries.to_vec())
    }

    async fn states(&self, country_code: &CountryCode) -> Result<Vec<State>, ReferenceDataError> {
        Ok(self
            .states
            .iter()
            .filter(|state| &state.country_code == country_code)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::on(2026, 10).unwrap())
    }

    fn code(s: &str) -> CountryCode {
        CountryCode::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_bundled_data_loads() {
        let data = StaticReferenceData::bundled(clock()).unwrap();
        let countries = data.countries().await.unwrap();
        assert!(countries.iter().any(|c| c.code == code("US")));
        assert!(countries.iter().any(|c| c.code == code("BR")));

        let states = data.states(&code("CA")).await.unwrap();
        assert!(states.iter().any(|s| s.name == "Ontario"));
        assert!(states.iter().all(|s| s.country_code == code("CA")));
    }

    #[tokio::test]
    async fn test_unknown_country_has_no_states() {
        let data = StaticReferenceData::bundled(clock()).unwrap();
        assert!(data.states(&code("ZZ")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_json_keeps_file_order() {
        let json = r#"{"countries": [
            {"code": "CA", "name": "Country One", "states": [
                {"code": "S1", "name": "State One"},
                {"code": "S2", "name": "State Two"}
            ]},
            {"code": "CB", "name": "Country Two"}
        ]}"#;
        let data = StaticReferenceData::from_json(json, clock()).unwrap();

        let states = data.states(&code("CA")).await.unwrap();
        let codes: Vec<_> = states.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, ["S1", "S2"]);
        assert!(data.states(&code("CB")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let result = StaticReferenceData::from_json("{\"countries\": 3}", clock());
        assert!(matches!(result, Err(ReferenceDataError::Bundle(_))));
    }

    #[tokio::test]
    async fn test_card_dates_follow_clock() {
        let data = StaticReferenceData::bundled(clock())
            .unwrap()
            .with_year_window(2);
        assert_eq!(data.credit_card_years().await.unwrap(), vec![2026, 2027, 2028]);
        assert_eq!(data.credit_card_months(11).await.unwrap(), vec![11, 12]);
    }
}
