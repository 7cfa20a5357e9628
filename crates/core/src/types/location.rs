//! Countries and their states/provinces.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a country code is malformed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CountryCodeError {
    /// The code is empty after trimming.
    #[error("country code cannot be empty")]
    Empty,
    /// The code contains characters other than ASCII letters.
    #[error("country code must be ASCII letters: {0}")]
    InvalidCharacters(String),
}

/// An upper-cased country code such as `US` or `BR`.
///
/// ```
/// use checkout_kit_core::CountryCode;
///
/// let code = CountryCode::parse(" br ").unwrap();
/// assert_eq!(code.as_str(), "BR");
/// assert!(CountryCode::parse("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse and normalize a country code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is empty or not purely ASCII letters.
    pub fn parse(s: &str) -> Result<Self, CountryCodeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CountryCodeError::Empty);
        }
        if !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CountryCodeError::InvalidCharacters(s.to_string()));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CountryCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// A country offered in the address dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    /// Unique country code.
    pub code: CountryCode,
    /// Display name.
    pub name: String,
}

impl Country {
    /// Create a new country.
    #[must_use]
    pub fn new(code: CountryCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

/// A state or province belonging to a country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// State code, unique within its country.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Code of the owning country.
    pub country_code: CountryCode,
}

impl State {
    /// Create a new state.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, country_code: CountryCode) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            country_code,
        }
    }

    /// Whether this state belongs to the given country.
    #[must_use]
    pub fn belongs_to(&self, country: &Country) -> bool {
        self.country_code == country.code
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_normalizes() {
        assert_eq!(CountryCode::parse("us").unwrap().as_str(), "US");
        assert_eq!(CountryCode::parse(" de ").unwrap().to_string(), "DE");
    }

    #[test]
    fn test_country_code_rejects_bad_input() {
        assert_eq!(CountryCode::parse("  "), Err(CountryCodeError::Empty));
        assert!(matches!(
            CountryCode::parse("U5"),
            Err(CountryCodeError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn test_state_belongs_to() {
        let us = Country::new(CountryCode::parse("US").unwrap(), "United States");
        let ca = Country::new(CountryCode::parse("CA").unwrap(), "Canada");
        let texas = State::new("TX", "Texas", us.code.clone());

        assert!(texas.belongs_to(&us));
        assert!(!texas.belongs_to(&ca));
    }

    #[test]
    fn test_state_serde_field_names() {
        let state = State::new("ON", "Ontario", CountryCode::parse("CA").unwrap());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["countryCode"], "CA");
        assert_eq!(json["code"], "ON");
    }
}
