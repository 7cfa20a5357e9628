//! Group names and dotted field paths.

use core::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::FormError;

/// Field names used by the checkout form layout.
pub mod fields {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";

    pub const STREET: &str = "street";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const COUNTRY: &str = "country";
    pub const ZIP_CODE: &str = "zipCode";

    pub const CARD_TYPE: &str = "cardType";
    pub const NAME_ON_CARD: &str = "nameOnCard";
    pub const CARD_NUMBER: &str = "cardNumber";
    pub const SECURITY_CODE: &str = "securityCode";
    pub const EXPIRATION_MONTH: &str = "expirationMonth";
    pub const EXPIRATION_YEAR: &str = "expirationYear";
}

const CUSTOMER_FIELDS: &[&str] = &[fields::FIRST_NAME, fields::LAST_NAME, fields::EMAIL];

const ADDRESS_FIELDS: &[&str] = &[
    fields::STREET,
    fields::CITY,
    fields::STATE,
    fields::COUNTRY,
    fields::ZIP_CODE,
];

const CREDIT_CARD_FIELDS: &[&str] = &[
    fields::CARD_TYPE,
    fields::NAME_ON_CARD,
    fields::CARD_NUMBER,
    fields::SECURITY_CODE,
    fields::EXPIRATION_MONTH,
    fields::EXPIRATION_YEAR,
];

/// A named group of the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupName {
    Customer,
    ShippingAddress,
    BillingAddress,
    CreditCard,
}

impl GroupName {
    /// All groups in form order.
    pub const ALL: [Self; 4] = [
        Self::Customer,
        Self::ShippingAddress,
        Self::BillingAddress,
        Self::CreditCard,
    ];

    /// The group's name as used in dotted paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::ShippingAddress => "shippingAddress",
            Self::BillingAddress => "billingAddress",
            Self::CreditCard => "creditCard",
        }
    }

    /// Field names of this group, in form order.
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Customer => CUSTOMER_FIELDS,
            Self::ShippingAddress | Self::BillingAddress => ADDRESS_FIELDS,
            Self::CreditCard => CREDIT_CARD_FIELDS,
        }
    }

    /// Look up one of this group's field names.
    #[must_use]
    pub fn field(self, name: &str) -> Option<&'static str> {
        self.fields().iter().copied().find(|field| *field == name)
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GroupName {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| FormError::UnknownGroup(s.to_string()))
    }
}

/// One of the two address groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressGroup {
    Shipping,
    Billing,
}

impl AddressGroup {
    /// The form group holding this address.
    #[must_use]
    pub const fn group_name(self) -> GroupName {
        match self {
            Self::Shipping => GroupName::ShippingAddress,
            Self::Billing => GroupName::BillingAddress,
        }
    }

    /// Path of one of this address's fields.
    #[must_use]
    pub(crate) const fn path(self, field: &'static str) -> FieldPath {
        FieldPath {
            group: self.group_name(),
            field,
        }
    }
}

impl fmt::Display for AddressGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_name().as_str())
    }
}

impl From<AddressGroup> for GroupName {
    fn from(group: AddressGroup) -> Self {
        group.group_name()
    }
}

impl TryFrom<GroupName> for AddressGroup {
    type Error = FormError;

    fn try_from(group: GroupName) -> Result<Self, Self::Error> {
        match group {
            GroupName::ShippingAddress => Ok(Self::Shipping),
            GroupName::BillingAddress => Ok(Self::Billing),
            other => Err(FormError::NotAnAddressGroup(other)),
        }
    }
}

/// A validated `group.field` path such as `shippingAddress.state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    group: GroupName,
    field: &'static str,
}

impl FieldPath {
    /// Build a path from a group and one of its field names.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownPath`] if the group has no such field.
    pub fn new(group: GroupName, field: &str) -> Result<Self, FormError> {
        group
            .field(field)
            .map(|field| Self { group, field })
            .ok_or_else(|| FormError::UnknownPath(format!("{group}.{field}")))
    }

    /// The group this path points into.
    #[must_use]
    pub const fn group(&self) -> GroupName {
        self.group
    }

    /// The field name within the group.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.field)
    }
}

impl std::str::FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, field) = s
            .split_once('.')
            .ok_or_else(|| FormError::UnknownPath(s.to_string()))?;
        let group = group
            .parse::<GroupName>()
            .map_err(|_| FormError::UnknownPath(s.to_string()))?;
        Self::new(group, field)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_path() {
        let path: FieldPath = "shippingAddress.state".parse().unwrap();
        assert_eq!(path.group(), GroupName::ShippingAddress);
        assert_eq!(path.field(), fields::STATE);
        assert_eq!(path.to_string(), "shippingAddress.state");
    }

    #[test]
    fn test_parse_rejects_unknown_paths() {
        assert!(matches!(
            "shipping.state".parse::<FieldPath>(),
            Err(FormError::UnknownPath(_))
        ));
        assert!(matches!(
            "customer.state".parse::<FieldPath>(),
            Err(FormError::UnknownPath(_))
        ));
        assert!(matches!(
            "customer".parse::<FieldPath>(),
            Err(FormError::UnknownPath(_))
        ));
    }

    #[test]
    fn test_address_group_conversion() {
        assert_eq!(
            AddressGroup::try_from(GroupName::BillingAddress).unwrap(),
            AddressGroup::Billing
        );
        assert!(matches!(
            AddressGroup::try_from(GroupName::CreditCard),
            Err(FormError::NotAnAddressGroup(GroupName::CreditCard))
        ));
    }

    #[test]
    fn test_group_name_round_trip() {
        for group in GroupName::ALL {
            assert_eq!(group.as_str().parse::<GroupName>().unwrap(), group);
        }
    }
}
