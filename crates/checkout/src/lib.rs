//! Checkout Kit - Headless checkout form.
//!
//! Everything behind a checkout page except the rendering: the form model
//! and its validators, the reference lists for the dropdowns, the cart
//! totals feed, and the controller that ties them together.
//!
//! # Modules
//!
//! - [`validators`] - Field validators and their error kinds
//! - [`form`] - Checkout form groups, controls, and the submit payload
//! - [`reference`] - Countries, states, and card expiration ranges
//! - [`cart`] - Cart totals subscription
//! - [`controller`] - The checkout controller
//! - [`draft`] - Scripted checkout input
//! - [`config`] - Environment configuration
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use checkout_kit::cart::CartService;
//! use checkout_kit::clock::SystemClock;
//! use checkout_kit::config::CheckoutConfig;
//! use checkout_kit::controller::CheckoutController;
//!
//! # async fn run() -> checkout_kit::error::Result<()> {
//! let config = CheckoutConfig::from_env()?;
//! let cart = CartService::new(config.currency);
//!
//! let mut checkout = CheckoutController::from_config(&config, Arc::new(SystemClock))?;
//! checkout.init(&cart).await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod clock;
pub mod config;
pub mod controller;
pub mod draft;
pub mod error;
pub mod form;
pub mod reference;
pub mod validators;

pub use controller::{CheckoutController, LookupOutcome, StateSelectionPolicy, StatesLookup};
pub use error::CheckoutError;
