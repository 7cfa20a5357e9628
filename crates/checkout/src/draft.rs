//! Scripted checkout input.
//!
//! A [`CheckoutDraft`] is what a customer would type into the form, with
//! countries and states named by code. [`apply_draft`] plays it into a
//! controller the same way the page would: pick a country, wait for its
//! states, pick a state, fill in the rest.
//!
//! ```json
//! {
//!   "customer": {"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"},
//!   "shippingAddress": {"street": "12 Analytical Way", "city": "Austin",
//!                       "country": "US", "state": "TX", "zipCode": "73301"},
//!   "creditCard": {"cardType": "Visa", "nameOnCard": "Ada Lovelace",
//!                  "cardNumber": "4111111111111111", "securityCode": "123",
//!                  "expirationMonth": 11, "expirationYear": 2027}
//! }
//! ```

use core::fmt;

use checkout_kit_core::{CardType, CountryCode};
use serde::Deserialize;
use tracing::instrument;

use crate::controller::CheckoutController;
use crate::error::{CheckoutError, Result};
use crate::form::{AddressGroup, FieldPath, FieldValue, GroupName, fields};
use crate::reference::ReferenceData;

/// Values to enter into the checkout form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    #[serde(default)]
    pub customer: DraftCustomer,
    #[serde(default)]
    pub shipping_address: DraftAddress,
    /// Ignored when billing is copied from shipping.
    #[serde(default)]
    pub billing_address: Option<DraftAddress>,
    #[serde(default)]
    pub credit_card: DraftCreditCard,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftAddress {
    pub street: String,
    pub city: String,
    /// Country code, e.g. `US`.
    pub country: Option<String>,
    /// State code within the country.
    pub state: Option<String>,
    pub zip_code: String,
}

/// Card details as entered.
///
/// Implements `Debug` manually to redact the card number and security code.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftCreditCard {
    /// Card type name, matched leniently (`visa`, `American Express`, `amex`).
    pub card_type: Option<String>,
    pub name_on_card: String,
    pub card_number: String,
    pub security_code: String,
    pub expiration_month: Option<i32>,
    pub expiration_year: Option<i32>,
}

impl fmt::Debug for DraftCreditCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftCreditCard")
            .field("card_type", &self.card_type)
            .field("name_on_card", &self.name_on_card)
            .field("card_number", &"[REDACTED]")
            .field("security_code", &"[REDACTED]")
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .finish()
    }
}

impl CheckoutDraft {
    /// Parse a draft from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidDraft`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Enter a draft into the controller's form.
///
/// With `copy_shipping`, billing is copied from shipping after shipping is
/// filled in; otherwise the draft's billing address is entered, if any.
/// Nothing is validated here: invalid input shows up on the controls and is
/// reported by [`CheckoutController::submit`].
///
/// # Errors
///
/// Returns [`CheckoutError::UnknownReference`] for a country, state, or card
/// type that is not offered, and any state or month lookup failure.
#[instrument(skip_all, fields(copy_shipping = copy_shipping))]
pub async fn apply_draft<R: ReferenceData>(
    controller: &mut CheckoutController<R>,
    draft: &CheckoutDraft,
    copy_shipping: bool,
) -> Result<()> {
    let customer = &draft.customer;
    set(controller, GroupName::Customer, fields::FIRST_NAME, customer.first_name.as_str())?;
    set(controller, GroupName::Customer, fields::LAST_NAME, customer.last_name.as_str())?;
    set(controller, GroupName::Customer, fields::EMAIL, customer.email.as_str())?;

    enter_address(controller, AddressGroup::Shipping, &draft.shipping_address).await?;

    if copy_shipping {
        controller.copy_shipping_to_billing(true)?;
    } else if let Some(billing) = &draft.billing_address {
        enter_address(controller, AddressGroup::Billing, billing).await?;
    }

    enter_credit_card(controller, &draft.credit_card).await
}

async fn enter_address<R: ReferenceData>(
    controller: &mut CheckoutController<R>,
    group: AddressGroup,
    address: &DraftAddress,
) -> Result<()> {
    let name = group.group_name();
    set(controller, name, fields::STREET, address.street.as_str())?;
    set(controller, name, fields::CITY, address.city.as_str())?;
    set(controller, name, fields::ZIP_CODE, address.zip_code.as_str())?;

    let Some(country_code) = &address.country else {
        return Ok(());
    };
    let code = CountryCode::parse(country_code)
        .map_err(|_| CheckoutError::UnknownReference(format!("country {country_code}")))?;
    let country = controller
        .countries()
        .iter()
        .find(|c| c.code == code)
        .cloned()
        .ok_or_else(|| CheckoutError::UnknownReference(format!("country {code}")))?;

    controller.select_country(group, country).await?;

    match &address.state {
        Some(state_code) => {
            let state = controller
                .states(group)
                .iter()
                .find(|s| s.code.eq_ignore_ascii_case(state_code.trim()))
                .cloned()
                .ok_or_else(|| {
                    CheckoutError::UnknownReference(format!("state {state_code} in {code}"))
                })?;
            set(controller, name, fields::STATE, state)
        }
        // Keep whatever the selection policy picked
        None => Ok(()),
    }
}

async fn enter_credit_card<R: ReferenceData>(
    controller: &mut CheckoutController<R>,
    card: &DraftCreditCard,
) -> Result<()> {
    let group = GroupName::CreditCard;

    let card_type = card
        .card_type
        .as_deref()
        .map(|name| {
            name.parse::<CardType>()
                .map_err(|_| CheckoutError::UnknownReference(format!("card type {name}")))
        })
        .transpose()?;
    set(controller, group, fields::CARD_TYPE, card_type)?;
    set(controller, group, fields::NAME_ON_CARD, card.name_on_card.as_str())?;
    set(controller, group, fields::CARD_NUMBER, card.card_number.as_str())?;
    set(controller, group, fields::SECURITY_CODE, card.security_code.as_str())?;

    if let Some(year) = card.expiration_year {
        controller.select_expiration_year(year).await?;
    }
    set(controller, group, fields::EXPIRATION_MONTH, card.expiration_month)
}

fn set<R: ReferenceData>(
    controller: &mut CheckoutController<R>,
    group: GroupName,
    field: &str,
    value: impl Into<FieldValue>,
) -> Result<()> {
    let path = FieldPath::new(group, field)?;
    controller.form_mut().set_value(&path, value)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::{Clock, FixedClock};
    use crate::reference::StaticReferenceData;

    fn controller() -> CheckoutController<StaticReferenceData> {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(2026, 10).unwrap());
        let reference = StaticReferenceData::bundled(Arc::clone(&clock)).unwrap();
        CheckoutController::new(reference, clock)
    }

    const DRAFT: &str = r#"{
        "customer": {"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"},
        "shippingAddress": {"street": "12 Analytical Way", "city": "Austin",
                            "country": "us", "state": "tx", "zipCode": "73301"},
        "creditCard": {"cardType": "visa", "nameOnCard": "Ada Lovelace",
                       "cardNumber": "4111111111111111", "securityCode": "123",
                       "expirationMonth": 11, "expirationYear": 2026}
    }"#;

    #[tokio::test]
    async fn test_apply_draft_with_copy() {
        let mut controller = controller();
        controller.load_reference_data().await.unwrap();

        let draft = CheckoutDraft::from_json(DRAFT).unwrap();
        apply_draft(&mut controller, &draft, true).await.unwrap();

        assert!(controller.form().is_valid(), "{:?}", controller.form().invalid_fields());
        assert_eq!(controller.credit_card_months(), [10, 11, 12]);

        let payload = controller.submit().unwrap();
        assert_eq!(payload.billing_address.state.name, "Texas");
        assert_eq!(payload.credit_card.card_type, CardType::Visa);
        assert_eq!(payload.credit_card.expiration_month, Some(11));
    }

    #[tokio::test]
    async fn test_missing_billing_is_invalid() {
        let mut controller = controller();
        controller.load_reference_data().await.unwrap();

        let draft = CheckoutDraft::from_json(DRAFT).unwrap();
        apply_draft(&mut controller, &draft, false).await.unwrap();

        let invalid = controller.form().invalid_fields();
        assert!(!invalid.is_empty());
        assert!(invalid.iter().all(|p| p.group() == GroupName::BillingAddress));
    }

    #[tokio::test]
    async fn test_unknown_state() {
        let mut controller = controller();
        controller.load_reference_data().await.unwrap();

        let mut draft = CheckoutDraft::from_json(DRAFT).unwrap();
        draft.shipping_address.state = Some("ZZ".to_string());
        let err = apply_draft(&mut controller, &draft, true).await.unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownReference(msg) if msg.contains("ZZ")));
    }

    #[tokio::test]
    async fn test_unknown_country_before_reference_data() {
        let mut controller = controller();
        let draft = CheckoutDraft::from_json(DRAFT).unwrap();
        let err = apply_draft(&mut controller, &draft, true).await.unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownReference(_)));
    }

    #[test]
    fn test_debug_redacts_card() {
        let draft = CheckoutDraft::from_json(DRAFT).unwrap();
        let debug = format!("{draft:?}");
        assert!(!debug.contains("4111111111111111"));
        assert!(!debug.contains("\"123\""));
    }

    #[test]
    fn test_partial_draft() {
        let draft = CheckoutDraft::from_json(r#"{"customer": {"firstName": "Ada"}}"#).unwrap();
        assert_eq!(draft.customer.first_name, "Ada");
        assert!(draft.shipping_address.country.is_none());
        assert!(draft.billing_address.is_none());
    }
}
