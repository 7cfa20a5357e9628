//! Cache types for reference API responses.

use checkout_kit_core::{Country, CountryCode, State};

/// Cache key for reference lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Countries,
    States(CountryCode),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Countries(Vec<Country>),
    States(Vec<State>),
}
