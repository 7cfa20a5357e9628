//! Reference data listing commands.
//!
//! # Usage
//!
//! ```bash
//! checkout-cli countries
//! checkout-cli states BR
//! checkout-cli card-dates --year 2027
//! ```

use checkout_kit::CheckoutError;
use checkout_kit::controller::CheckoutController;
use checkout_kit::form::AddressGroup;
use checkout_kit::reference::ReferenceSource;
use checkout_kit_core::CountryCode;

use super::CliError;

/// Print every country as `CODE<TAB>Name`.
///
/// # Errors
///
/// Returns an error if the countries cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn countries(mut controller: CheckoutController<ReferenceSource>) -> Result<(), CliError> {
    controller.load_reference_data().await?;

    for country in controller.countries() {
        println!("{}\t{}", country.code, country.name);
    }
    Ok(())
}

/// Print the states of one country as `CODE<TAB>Name`.
///
/// The country goes through the same selection a customer would make, so
/// the listing matches what the state dropdown would offer.
///
/// # Errors
///
/// Returns an error if the code is malformed or unknown, or a lookup fails.
#[allow(clippy::print_stdout)]
pub async fn states(
    mut controller: CheckoutController<ReferenceSource>,
    code: &str,
) -> Result<(), CliError> {
    let code = CountryCode::parse(code).map_err(|_| CliError::InvalidCountryCode(code.to_owned()))?;

    controller.load_reference_data().await?;
    let country = controller
        .countries()
        .iter()
        .find(|c| c.code == code)
        .cloned()
        .ok_or_else(|| CheckoutError::UnknownReference(format!("country {code}")))?;

    tracing::info!("Loading states for {}", country.name);
    controller.select_country(AddressGroup::Shipping, country).await?;

    for state in controller.states(AddressGroup::Shipping) {
        println!("{}\t{}", state.code, state.name);
    }
    Ok(())
}

/// Print the expiration months and years offered for cards.
///
/// With `year`, months are listed as they would be after picking that year.
///
/// # Errors
///
/// Returns an error if the year is not offered or a lookup fails.
#[allow(clippy::print_stdout)]
pub async fn card_dates(
    mut controller: CheckoutController<ReferenceSource>,
    year: Option<i32>,
) -> Result<(), CliError> {
    controller.load_reference_data().await?;

    if let Some(year) = year {
        if !controller.credit_card_years().contains(&year) {
            return Err(CheckoutError::UnknownReference(format!("expiration year {year}")).into());
        }
        controller.select_expiration_year(year).await?;
    }

    let months = join(controller.credit_card_months());
    let years = join(controller.credit_card_years());

    println!("months: {months}");
    println!("years:  {years}");
    Ok(())
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join(&[10, 11, 12]), "10 11 12");
        assert_eq!(join::<u32>(&[]), "");
    }
}
