//! Core types for the checkout kit.
//!
//! This module provides type-safe wrappers for checkout domain concepts.

pub mod card;
pub mod cart;
pub mod email;
pub mod location;
pub mod price;

pub use card::{CardType, CardTypeError};
pub use cart::CartSummary;
pub use email::{Email, EmailError};
pub use location::{Country, CountryCode, CountryCodeError, State};
pub use price::{CurrencyCode, CurrencyCodeError, Price};
