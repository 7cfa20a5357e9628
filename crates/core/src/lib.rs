//! Checkout Kit Core - Shared domain types.
//!
//! This crate provides the types exchanged by every checkout component:
//! - `checkout` - Form model, validators, reference data, and controller
//! - `cli` - Command-line front end for scripted checkouts
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Emails, prices, locations, card types, and cart summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
