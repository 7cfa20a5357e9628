//! Typed values assembled from a valid form.

use core::fmt;

use checkout_kit_core::{CardType, CartSummary, Country, Email, State};
use secrecy::{ExposeSecret, SecretString};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use super::group::GroupValues;
use super::path::{FieldPath, GroupName, fields};
use super::value::FieldValue;
use super::{CheckoutForm, FormError};

/// Customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
}

/// A shipping or billing address with resolved reference entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: State,
    pub country: Country,
    pub zip_code: String,
}

impl Address {
    /// The address as a full set of group values, for
    /// [`CheckoutForm::set_group_value`].
    #[must_use]
    pub fn to_group_values(&self) -> GroupValues {
        GroupValues::from([
            (fields::STREET.to_string(), FieldValue::from(self.street.as_str())),
            (fields::CITY.to_string(), FieldValue::from(self.city.as_str())),
            (fields::STATE.to_string(), FieldValue::from(self.state.clone())),
            (
                fields::COUNTRY.to_string(),
                FieldValue::from(self.country.clone()),
            ),
            (
                fields::ZIP_CODE.to_string(),
                FieldValue::from(self.zip_code.as_str()),
            ),
        ])
    }
}

/// Payment card details.
///
/// The card number and security code are secrets: `Debug` redacts them and
/// serialization only exposes the last four digits of the number.
#[derive(Clone)]
pub struct CreditCard {
    pub card_type: CardType,
    pub name_on_card: String,
    pub card_number: SecretString,
    pub security_code: SecretString,
    pub expiration_month: Option<u32>,
    pub expiration_year: Option<i32>,
}

impl CreditCard {
    /// The card number with all but the last four digits masked.
    #[must_use]
    pub fn masked_number(&self) -> String {
        let number = self.card_number.expose_secret();
        let visible = number.len().saturating_sub(4);
        number
            .char_indices()
            .map(|(i, c)| if i < visible { '*' } else { c })
            .collect()
    }
}

impl fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreditCard")
            .field("card_type", &self.card_type)
            .field("name_on_card", &self.name_on_card)
            .field("card_number", &self.masked_number())
            .field("security_code", &"[REDACTED]")
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .finish()
    }
}

impl Serialize for CreditCard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CreditCard", 5)?;
        state.serialize_field("cardType", &self.card_type)?;
        state.serialize_field("nameOnCard", &self.name_on_card)?;
        state.serialize_field("cardNumber", &self.masked_number())?;
        state.serialize_field("expirationMonth", &self.expiration_month)?;
        state.serialize_field("expirationYear", &self.expiration_year)?;
        state.end()
    }
}

/// Everything gathered by a successful checkout submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    /// Correlates log lines for one submission.
    pub submission_id: Uuid,
    pub customer: Customer,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub credit_card: CreditCard,
    pub cart: CartSummary,
}

impl CheckoutPayload {
    /// Assemble the payload from a form.
    ///
    /// Text values are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Incomplete`] if a required value is missing, or
    /// [`FormError::Email`] if the email cannot be parsed. Neither happens
    /// for a form whose [`CheckoutForm::is_valid`] is true.
    pub fn from_form(form: &CheckoutForm, cart: CartSummary) -> Result<Self, FormError> {
        let reader = Reader { form };
        Ok(Self {
            submission_id: Uuid::new_v4(),
            customer: reader.customer()?,
            shipping_address: reader.address(GroupName::ShippingAddress)?,
            billing_address: reader.address(GroupName::BillingAddress)?,
            credit_card: reader.credit_card()?,
            cart,
        })
    }
}

struct Reader<'a> {
    form: &'a CheckoutForm,
}

impl Reader<'_> {
    fn get(&self, group: GroupName, field: &str) -> Result<(FieldPath, &FieldValue), FormError> {
        let path = FieldPath::new(group, field)?;
        Ok((path, self.form.value(&path)))
    }

    fn text(&self, group: GroupName, field: &str) -> Result<String, FormError> {
        match self.get(group, field)? {
            (_, FieldValue::Text(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            (path, _) => Err(FormError::Incomplete { path }),
        }
    }

    fn number(&self, group: GroupName, field: &str) -> Result<Option<i32>, FormError> {
        Ok(self.get(group, field)?.1.as_number())
    }

    fn customer(&self) -> Result<Customer, FormError> {
        let group = GroupName::Customer;
        Ok(Customer {
            first_name: self.text(group, fields::FIRST_NAME)?,
            last_name: self.text(group, fields::LAST_NAME)?,
            email: Email::parse(&self.text(group, fields::EMAIL)?)?,
        })
    }

    fn address(&self, group: GroupName) -> Result<Address, FormError> {
        let (state_path, state) = self.get(group, fields::STATE)?;
        let state = state
            .as_state()
            .cloned()
            .ok_or(FormError::Incomplete { path: state_path })?;
        let (country_path, country) = self.get(group, fields::COUNTRY)?;
        let country = country
            .as_country()
            .cloned()
            .ok_or(FormError::Incomplete { path: country_path })?;

        Ok(Address {
            street: self.text(group, fields::STREET)?,
            city: self.text(group, fields::CITY)?,
            state,
            country,
            zip_code: self.text(group, fields::ZIP_CODE)?,
        })
    }

    fn credit_card(&self) -> Result<CreditCard, FormError> {
        let group = GroupName::CreditCard;
        let (card_type_path, card_type) = self.get(group, fields::CARD_TYPE)?;
        let card_type = card_type
            .as_card_type()
            .ok_or(FormError::Incomplete {
                path: card_type_path,
            })?;

        Ok(CreditCard {
            card_type,
            name_on_card: self.text(group, fields::NAME_ON_CARD)?,
            card_number: SecretString::from(self.text(group, fields::CARD_NUMBER)?),
            security_code: SecretString::from(self.text(group, fields::SECURITY_CODE)?),
            expiration_month: self
                .number(group, fields::EXPIRATION_MONTH)?
                .and_then(|month| u32::try_from(month).ok()),
            expiration_year: self.number(group, fields::EXPIRATION_YEAR)?,
        })
    }
}
