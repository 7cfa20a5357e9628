//! End-to-end checkout flows over the bundled reference data.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use checkout_kit::cart::CartService;
use checkout_kit::controller::CheckoutController;
use checkout_kit::draft::{CheckoutDraft, apply_draft};
use checkout_kit::form::{AddressGroup, FieldPath, GroupName};
use checkout_kit::reference::StaticReferenceData;
use checkout_kit::validators::FieldErrorKind;
use checkout_kit::CheckoutError;
use checkout_kit_core::{CartSummary, CurrencyCode, Price};
use checkout_kit_integration_tests::{US_DRAFT, october_2026};
use rust_decimal::Decimal;

fn controller() -> CheckoutController<StaticReferenceData> {
    let reference = StaticReferenceData::bundled(october_2026()).unwrap();
    CheckoutController::new(reference, october_2026())
}

fn path(p: &str) -> FieldPath {
    p.parse().unwrap()
}

fn usd(amount: &str) -> Price {
    Price::new(amount.parse::<Decimal>().unwrap(), CurrencyCode::USD)
}

async fn wait_for_cart(controller: &CheckoutController<StaticReferenceData>, expected: CartSummary) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while controller.cart_summary() != expected {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_full_checkout_with_copied_billing() {
    let cart = CartService::new(CurrencyCode::USD);
    cart.publish(usd("59.90"), 3);

    let mut controller = controller();
    controller.init(&cart).await.unwrap();
    assert_eq!(controller.cart_summary().total_quantity, 3);

    let draft = CheckoutDraft::from_json(US_DRAFT).unwrap();
    apply_draft(&mut controller, &draft, true).await.unwrap();

    // The cart keeps moving while the customer types
    cart.publish(usd("79.85"), 4);
    wait_for_cart(
        &controller,
        CartSummary {
            total_price: usd("79.85"),
            total_quantity: 4,
        },
    )
    .await;

    let payload = controller.submit().unwrap();
    assert_eq!(payload.cart.total_quantity, 4);
    assert_eq!(payload.cart.total_price.to_string(), "$79.85");
    assert_eq!(payload.shipping_address.state.name, "Texas");
    assert_eq!(payload.billing_address, payload.shipping_address);

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["creditCard"]["cardNumber"], "************1111");
    assert!(json["creditCard"].get("securityCode").is_none());
    assert_eq!(json["customer"]["email"], "ada@example.com");
    assert_eq!(json["billingAddress"]["country"]["code"], "US");

    controller.teardown();
    assert!(!controller.is_subscribed());
}

#[tokio::test]
async fn test_separate_billing_address() {
    let mut controller = controller();
    controller.load_reference_data().await.unwrap();

    let mut draft = CheckoutDraft::from_json(US_DRAFT).unwrap();
    draft.billing_address = Some(checkout_kit::draft::DraftAddress {
        street: "1 Rue Principale".to_string(),
        city: "Toronto".to_string(),
        country: Some("CA".to_string()),
        state: Some("ON".to_string()),
        zip_code: "M5V 2T6".to_string(),
    });
    apply_draft(&mut controller, &draft, false).await.unwrap();

    assert_eq!(controller.states(AddressGroup::Billing).len(), 13);
    let payload = controller.submit().unwrap();
    assert_eq!(payload.billing_address.state.name, "Ontario");
    assert_eq!(payload.shipping_address.country.name, "United States");
}

#[tokio::test]
async fn test_invalid_input_is_reported_per_field() {
    let mut controller = controller();
    controller.load_reference_data().await.unwrap();

    let mut draft = CheckoutDraft::from_json(US_DRAFT).unwrap();
    draft.customer.first_name = "   ".to_string();
    draft.customer.last_name = "L".to_string();
    draft.customer.email = "ada@example".to_string();
    draft.credit_card.card_number = "4111 1111 1111 1111".to_string();
    draft.credit_card.security_code = "12".to_string();
    apply_draft(&mut controller, &draft, true).await.unwrap();

    let err = controller.submit().unwrap_err();
    let CheckoutError::InvalidForm { fields } = err else {
        panic!("expected InvalidForm");
    };

    let error = |p: &str| controller.form().control(&path(p)).error();
    assert_eq!(error("customer.firstName"), Some(FieldErrorKind::BlankValue));
    assert_eq!(
        error("customer.lastName"),
        Some(FieldErrorKind::TooShort { min: 2, actual: 1 })
    );
    assert_eq!(error("customer.email"), Some(FieldErrorKind::FormatMismatch));
    assert_eq!(error("creditCard.cardNumber"), Some(FieldErrorKind::FormatMismatch));
    assert_eq!(error("creditCard.securityCode"), Some(FieldErrorKind::FormatMismatch));
    assert_eq!(fields.len(), 5);

    // Errors are now displayed
    assert!(controller.form().control(&path("customer.firstName")).shows_error());
    // Nothing was cleared
    assert!(!controller.form().value(&path("shippingAddress.street")).is_empty());
}

#[tokio::test]
async fn test_state_from_another_country_is_rejected() {
    let mut controller = controller();
    controller.load_reference_data().await.unwrap();

    let draft = CheckoutDraft::from_json(US_DRAFT).unwrap();
    apply_draft(&mut controller, &draft, true).await.unwrap();
    assert!(controller.form().is_valid());

    let canada = controller
        .countries()
        .iter()
        .find(|c| c.code.as_str() == "CA")
        .cloned()
        .unwrap();
    let texas = controller
        .form()
        .value(&path("billingAddress.state"))
        .as_state()
        .cloned()
        .unwrap();

    // Country changed without a state refresh
    controller
        .form_mut()
        .set_value(&path("billingAddress.country"), canada)
        .unwrap();
    assert_eq!(
        controller.form().control(&path("billingAddress.state")).error(),
        Some(FieldErrorKind::StateNotInCountry)
    );
    assert_eq!(
        controller.form().value(&path("billingAddress.state")).as_state(),
        Some(&texas)
    );

    // Refreshing the states picks a matching one again
    controller.get_states(AddressGroup::Billing).await.unwrap();
    assert!(controller.form().control(&path("billingAddress.state")).is_valid());
    assert!(controller.form().is_valid());
}

#[tokio::test]
async fn test_copy_toggle_round_trip() {
    let mut controller = controller();
    controller.load_reference_data().await.unwrap();

    let draft = CheckoutDraft::from_json(US_DRAFT).unwrap();
    apply_draft(&mut controller, &draft, true).await.unwrap();
    assert_eq!(
        controller.states(AddressGroup::Billing),
        controller.states(AddressGroup::Shipping)
    );

    controller.copy_shipping_to_billing(false).unwrap();
    assert!(controller.states(AddressGroup::Billing).is_empty());
    assert!(
        controller
            .form()
            .invalid_fields()
            .iter()
            .all(|p| p.group() == GroupName::BillingAddress)
    );
    assert!(!controller.form().is_valid());

    controller.copy_shipping_to_billing(true).unwrap();
    assert!(controller.form().is_valid());
}

#[tokio::test]
async fn test_expiration_months_follow_year() {
    let mut controller = controller();
    controller.load_reference_data().await.unwrap();
    assert_eq!(controller.credit_card_months(), [10, 11, 12]);
    assert_eq!(controller.credit_card_years().first(), Some(&2026));
    assert_eq!(controller.credit_card_years().last(), Some(&2036));

    controller.select_expiration_year(2030).await.unwrap();
    assert_eq!(controller.credit_card_months().len(), 12);

    controller.select_expiration_year(2026).await.unwrap();
    assert_eq!(controller.credit_card_months(), [10, 11, 12]);
}
