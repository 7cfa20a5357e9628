//! Checkout form model.
//!
//! The form is a fixed set of four groups (customer, shipping address,
//! billing address, credit card). Every control carries its validators and
//! a derived error that is recomputed synchronously on each write, and the
//! whole-form validity is a pure aggregation over the controls.
//!
//! # Example
//!
//! ```
//! use checkout_kit::form::{CheckoutForm, FieldPath};
//!
//! let mut form = CheckoutForm::new();
//! let path: FieldPath = "customer.email".parse().unwrap();
//!
//! form.set_value(&path, "ada@example.com").unwrap();
//! assert!(form.control(&path).is_valid());
//! assert!(!form.is_valid());
//! ```

mod control;
mod group;
mod path;
mod payload;
mod value;

pub use control::Control;
pub use group::{FormGroup, GroupRule, GroupValues};
pub use path::{AddressGroup, FieldPath, GroupName, fields};
pub use payload::{Address, CheckoutPayload, CreditCard, Customer};
pub use value::{FieldKind, FieldValue};

use checkout_kit_core::EmailError;
use thiserror::Error;

use crate::validators::{FieldPattern, Validator, required_text};

/// Errors raised by structural misuse of the form.
///
/// Invalid user input is never an error here; it shows up as a control's
/// [`FieldErrorKind`](crate::validators::FieldErrorKind).
#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown form group: {0}")]
    UnknownGroup(String),

    #[error("unknown field path: {0}")]
    UnknownPath(String),

    #[error("{0} is not an address group")]
    NotAnAddressGroup(GroupName),

    #[error("{path} expects a {expected} value")]
    KindMismatch { path: FieldPath, expected: FieldKind },

    #[error("missing value for {path}")]
    MissingGroupField { path: FieldPath },

    #[error("{group} has no field named {field}")]
    UnexpectedGroupField { group: GroupName, field: String },

    #[error("{path} is not filled in")]
    Incomplete { path: FieldPath },

    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
}

/// The checkout form: customer, shipping, billing, and card details.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    customer: FormGroup,
    shipping_address: FormGroup,
    billing_address: FormGroup,
    credit_card: FormGroup,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutForm {
    /// Create an empty form with the standard validators attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            customer: customer_group(),
            shipping_address: address_group(GroupName::ShippingAddress),
            billing_address: address_group(GroupName::BillingAddress),
            credit_card: credit_card_group(),
        }
    }

    #[must_use]
    pub const fn group(&self, name: GroupName) -> &FormGroup {
        match name {
            GroupName::Customer => &self.customer,
            GroupName::ShippingAddress => &self.shipping_address,
            GroupName::BillingAddress => &self.billing_address,
            GroupName::CreditCard => &self.credit_card,
        }
    }

    const fn group_mut(&mut self, name: GroupName) -> &mut FormGroup {
        match name {
            GroupName::Customer => &mut self.customer,
            GroupName::ShippingAddress => &mut self.shipping_address,
            GroupName::BillingAddress => &mut self.billing_address,
            GroupName::CreditCard => &mut self.credit_card,
        }
    }

    /// All groups in form order.
    pub fn groups(&self) -> impl Iterator<Item = &FormGroup> {
        GroupName::ALL.into_iter().map(|name| self.group(name))
    }

    /// The control at a path.
    ///
    /// # Panics
    ///
    /// Never: a [`FieldPath`] can only name fields present in the layout.
    #[must_use]
    pub fn control(&self, path: &FieldPath) -> &Control {
        self.group(path.group())
            .control(path.field())
            .expect("field paths always name a control in the layout")
    }

    /// Look up a control by dotted path, e.g. `shippingAddress.state`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownPath`] for paths outside the layout.
    pub fn get(&self, path: &str) -> Result<&Control, FormError> {
        let path: FieldPath = path.parse()?;
        Ok(self.control(&path))
    }

    /// The current value at a path.
    #[must_use]
    pub fn value(&self, path: &FieldPath) -> &FieldValue {
        self.control(path).value()
    }

    /// Write one field and revalidate its group.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::KindMismatch`] if the value does not fit the
    /// control; the form is unchanged in that case.
    pub fn set_value(
        &mut self,
        path: &FieldPath,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        self.group_mut(path.group())
            .set_field(path.field(), value.into())
    }

    /// A deep copy of a group's values.
    #[must_use]
    pub fn group_value(&self, name: GroupName) -> GroupValues {
        self.group(name).value()
    }

    /// Replace a whole group atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is missing, unknown, or of the wrong
    /// kind; nothing is written in that case.
    pub fn set_group_value(
        &mut self,
        name: GroupName,
        values: GroupValues,
    ) -> Result<(), FormError> {
        self.group_mut(name).set_value(values)
    }

    /// Clear a group back to empty, untouched controls.
    pub fn reset_group(&mut self, name: GroupName) {
        self.group_mut(name).reset();
    }

    /// Whether every control in every group is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.groups().all(FormGroup::is_valid)
    }

    /// Paths of every invalid control, in form order.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<FieldPath> {
        self.groups().flat_map(FormGroup::invalid_fields).collect()
    }

    /// Mark every control as touched so that errors are displayed.
    pub fn mark_all_as_touched(&mut self) {
        for name in GroupName::ALL {
            self.group_mut(name).mark_all_as_touched();
        }
    }
}

fn customer_group() -> FormGroup {
    FormGroup::new(
        GroupName::Customer,
        vec![
            (fields::FIRST_NAME, Control::new(FieldKind::Text, required_text())),
            (fields::LAST_NAME, Control::new(FieldKind::Text, required_text())),
            (
                fields::EMAIL,
                Control::new(
                    FieldKind::Text,
                    vec![Validator::Required, Validator::Pattern(FieldPattern::Email)],
                ),
            ),
        ],
        Vec::new(),
    )
}

fn address_group(name: GroupName) -> FormGroup {
    FormGroup::new(
        name,
        vec![
            (fields::STREET, Control::new(FieldKind::Text, required_text())),
            (fields::CITY, Control::new(FieldKind::Text, required_text())),
            (
                fields::STATE,
                Control::new(FieldKind::State, vec![Validator::Required]),
            ),
            (
                fields::COUNTRY,
                Control::new(FieldKind::Country, vec![Validator::Required]),
            ),
            (fields::ZIP_CODE, Control::new(FieldKind::Text, required_text())),
        ],
        vec![GroupRule::StateBelongsToCountry],
    )
}

fn credit_card_group() -> FormGroup {
    FormGroup::new(
        GroupName::CreditCard,
        vec![
            (
                fields::CARD_TYPE,
                Control::new(FieldKind::CardType, vec![Validator::Required]),
            ),
            (fields::NAME_ON_CARD, Control::new(FieldKind::Text, required_text())),
            (
                fields::CARD_NUMBER,
                Control::new(
                    FieldKind::Text,
                    vec![
                        Validator::Required,
                        Validator::Pattern(FieldPattern::CardNumber),
                        Validator::MaxLength(16),
                    ],
                ),
            ),
            (
                fields::SECURITY_CODE,
                Control::new(
                    FieldKind::Text,
                    vec![
                        Validator::Required,
                        Validator::Pattern(FieldPattern::SecurityCode),
                    ],
                ),
            ),
            // Expiration selects accept anything, including no selection.
            (fields::EXPIRATION_MONTH, Control::new(FieldKind::Number, Vec::new())),
            (fields::EXPIRATION_YEAR, Control::new(FieldKind::Number, Vec::new())),
        ],
        Vec::new(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use checkout_kit_core::{Country, CountryCode, State};

    use super::*;
    use crate::validators::FieldErrorKind;

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    fn us() -> Country {
        Country::new(CountryCode::parse("US").unwrap(), "United States")
    }

    fn canada() -> Country {
        Country::new(CountryCode::parse("CA").unwrap(), "Canada")
    }

    fn texas() -> State {
        State::new("TX", "Texas", CountryCode::parse("US").unwrap())
    }

    fn shipping_values() -> GroupValues {
        GroupValues::from([
            ("street".to_string(), FieldValue::from("1 Main")),
            ("city".to_string(), FieldValue::from("Austin")),
            ("state".to_string(), FieldValue::from(texas())),
            ("country".to_string(), FieldValue::from(us())),
            ("zipCode".to_string(), FieldValue::from("73301")),
        ])
    }

    #[test]
    fn test_new_form_is_empty_and_invalid() {
        let form = CheckoutForm::new();
        assert!(!form.is_valid());
        for group in form.groups() {
            for (_, control) in group.controls() {
                assert_eq!(control.value(), &FieldValue::Empty);
                assert!(!control.is_touched());
            }
        }
    }

    #[test]
    fn test_required_fields_report_missing_then_blank() {
        let required_text = [
            "customer.firstName",
            "customer.lastName",
            "shippingAddress.street",
            "shippingAddress.city",
            "shippingAddress.zipCode",
            "billingAddress.street",
            "billingAddress.city",
            "billingAddress.zipCode",
            "creditCard.nameOnCard",
        ];

        let mut form = CheckoutForm::new();
        for field in required_text {
            let field = path(field);
            assert_eq!(
                form.control(&field).error(),
                Some(FieldErrorKind::MissingValue),
                "{field} when empty"
            );

            form.set_value(&field, "   ").unwrap();
            assert_eq!(
                form.control(&field).error(),
                Some(FieldErrorKind::BlankValue),
                "{field} when whitespace only"
            );
        }
    }

    #[test]
    fn test_expiration_fields_have_no_validators() {
        let form = CheckoutForm::new();
        assert!(form.control(&path("creditCard.expirationMonth")).is_valid());
        assert!(form.control(&path("creditCard.expirationYear")).is_valid());
    }

    #[test]
    fn test_get_by_dotted_path() {
        let form = CheckoutForm::new();
        assert!(form.get("shippingAddress.state").is_ok());
        assert!(matches!(
            form.get("shippingAddress.planet"),
            Err(FormError::UnknownPath(_))
        ));
    }

    #[test]
    fn test_set_value_rejects_wrong_kind() {
        let mut form = CheckoutForm::new();
        let state = path("shippingAddress.state");
        let result = form.set_value(&state, "TX");
        assert!(matches!(
            result,
            Err(FormError::KindMismatch {
                expected: FieldKind::State,
                ..
            })
        ));
        assert_eq!(form.value(&state), &FieldValue::Empty);
    }

    #[test]
    fn test_set_group_value_replaces_whole_group() {
        let mut form = CheckoutForm::new();
        form.set_group_value(GroupName::ShippingAddress, shipping_values())
            .unwrap();

        assert!(form.group(GroupName::ShippingAddress).is_valid());
        assert_eq!(
            form.group_value(GroupName::ShippingAddress),
            shipping_values()
        );
    }

    #[test]
    fn test_set_group_value_is_atomic() {
        let mut form = CheckoutForm::new();
        let mut values = shipping_values();
        values.insert("state".to_string(), FieldValue::from("TX"));

        assert!(form
            .set_group_value(GroupName::ShippingAddress, values)
            .is_err());
        assert_eq!(
            form.value(&path("shippingAddress.street")),
            &FieldValue::Empty
        );

        let mut missing = shipping_values();
        missing.remove("zipCode");
        assert!(matches!(
            form.set_group_value(GroupName::ShippingAddress, missing),
            Err(FormError::MissingGroupField { .. })
        ));

        let mut extra = shipping_values();
        extra.insert("phone".to_string(), FieldValue::from("555"));
        assert!(matches!(
            form.set_group_value(GroupName::ShippingAddress, extra),
            Err(FormError::UnexpectedGroupField { .. })
        ));
        assert_eq!(
            form.value(&path("shippingAddress.city")),
            &FieldValue::Empty
        );
    }

    #[test]
    fn test_group_value_is_a_deep_copy() {
        let mut form = CheckoutForm::new();
        form.set_group_value(GroupName::ShippingAddress, shipping_values())
            .unwrap();
        let copy = form.group_value(GroupName::ShippingAddress);
        form.set_group_value(GroupName::BillingAddress, copy).unwrap();

        form.set_value(&path("billingAddress.street"), "2 Elm").unwrap();
        assert_eq!(
            form.value(&path("shippingAddress.street")),
            &FieldValue::from("1 Main")
        );
    }

    #[test]
    fn test_reset_group() {
        let mut form = CheckoutForm::new();
        form.set_group_value(GroupName::BillingAddress, shipping_values())
            .unwrap();
        form.mark_all_as_touched();

        form.reset_group(GroupName::BillingAddress);
        let billing = form.group(GroupName::BillingAddress);
        for (_, control) in billing.controls() {
            assert_eq!(control.value(), &FieldValue::Empty);
            assert!(!control.is_touched());
        }
        assert_eq!(
            form.control(&path("billingAddress.street")).error(),
            Some(FieldErrorKind::MissingValue)
        );
        assert!(form.control(&path("customer.email")).is_touched());
    }

    #[test]
    fn test_state_must_belong_to_country() {
        let mut form = CheckoutForm::new();
        form.set_group_value(GroupName::ShippingAddress, shipping_values())
            .unwrap();
        let state = path("shippingAddress.state");
        assert!(form.control(&state).is_valid());

        form.set_value(&path("shippingAddress.country"), canada())
            .unwrap();
        assert_eq!(
            form.control(&state).error(),
            Some(FieldErrorKind::StateNotInCountry)
        );

        form.set_value(&path("shippingAddress.country"), us()).unwrap();
        assert!(form.control(&state).is_valid());
    }

    #[test]
    fn test_invalid_fields_in_form_order() {
        let form = CheckoutForm::new();
        let invalid = form.invalid_fields();
        assert_eq!(invalid.first(), Some(&path("customer.firstName")));
        assert_eq!(invalid.last(), Some(&path("creditCard.securityCode")));
        assert!(!invalid.contains(&path("creditCard.expirationYear")));
    }

    #[test]
    fn test_mark_all_as_touched() {
        let mut form = CheckoutForm::new();
        form.mark_all_as_touched();
        assert!(form
            .groups()
            .all(|group| group.controls().all(|(_, control)| control.is_touched())));
        assert!(form.control(&path("creditCard.cardNumber")).shows_error());
    }
}
