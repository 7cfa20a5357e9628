//! Scripted checkout command.
//!
//! # Usage
//!
//! ```bash
//! checkout-cli submit order.json --copy-shipping --total 59.90 --quantity 3
//! ```
//!
//! On success the payload is printed as JSON with the card number masked.
//! Otherwise each invalid field is printed with its error and the command
//! exits non-zero.

use std::path::Path;

use checkout_kit::CheckoutError;
use checkout_kit::cart::CartService;
use checkout_kit::controller::CheckoutController;
use checkout_kit::draft::{CheckoutDraft, apply_draft};
use checkout_kit::reference::ReferenceSource;
use checkout_kit_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

use super::CliError;

/// Cart and billing options for a scripted checkout.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub copy_shipping: bool,
    pub total: Decimal,
    pub quantity: u32,
    pub currency: CurrencyCode,
}

/// Fill the form from the draft at `path` and submit it.
///
/// # Errors
///
/// Returns an error if the draft cannot be read or applied, or the form is
/// invalid at submit.
pub async fn run(
    mut controller: CheckoutController<ReferenceSource>,
    path: &Path,
    options: &SubmitOptions,
) -> Result<(), CliError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::ReadDraft {
            path: path.display().to_string(),
            source,
        })?;
    let draft = CheckoutDraft::from_json(&json)?;

    let cart = CartService::new(options.currency);
    cart.publish(Price::new(options.total, options.currency), options.quantity);

    controller.init(&cart).await?;
    apply_draft(&mut controller, &draft, options.copy_shipping).await?;

    let result = controller.submit();
    controller.teardown();

    match result {
        Ok(payload) => {
            print_payload(&serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(CheckoutError::InvalidForm { fields }) => {
            for path in &fields {
                let reason = controller
                    .form()
                    .control(path)
                    .error()
                    .map_or_else(|| "is invalid".to_string(), |kind| kind.to_string());
                print_field_error(&path.to_string(), &reason);
            }
            Err(CheckoutError::InvalidForm { fields }.into())
        }
        Err(e) => Err(e.into()),
    }
}

#[allow(clippy::print_stdout)]
fn print_payload(json: &str) {
    println!("{json}");
}

#[allow(clippy::print_stderr)]
fn print_field_error(path: &str, reason: &str) {
    eprintln!("{path}: {reason}");
}
