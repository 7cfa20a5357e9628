//! Values held by form controls.

use core::fmt;
use std::borrow::Cow;

use checkout_kit_core::{CardType, Country, State};

/// What kind of value a control accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Number,
    Country,
    State,
    CardType,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Country => "country",
            Self::State => "state",
            Self::CardType => "card type",
        })
    }
}

/// The current value of a form control.
///
/// Dropdown selections hold the full reference entity so that a submitted
/// payload never has to look anything up again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// Untouched or cleared.
    #[default]
    Empty,
    Text(String),
    Number(i32),
    Country(Country),
    State(State),
    CardType(CardType),
}

impl FieldValue {
    /// The kind of value held, or `None` when empty.
    #[must_use]
    pub const fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Empty => None,
            Self::Text(_) => Some(FieldKind::Text),
            Self::Number(_) => Some(FieldKind::Number),
            Self::Country(_) => Some(FieldKind::Country),
            Self::State(_) => Some(FieldKind::State),
            Self::CardType(_) => Some(FieldKind::CardType),
        }
    }

    /// Whether this value can be stored in a control of `kind`.
    #[must_use]
    pub fn fits(&self, kind: FieldKind) -> bool {
        self.kind().is_none_or(|own| own == kind)
    }

    /// Whether there is nothing selected or typed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// The text that validators see.
    ///
    /// Selections are represented by their codes.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Country(country) => Cow::Borrowed(country.code.as_str()),
            Self::State(state) => Cow::Borrowed(&state.code),
            Self::CardType(card_type) => Cow::Borrowed(card_type.as_str()),
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<i32> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_country(&self) -> Option<&Country> {
        match self {
            Self::Country(country) => Some(country),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_state(&self) -> Option<&State> {
        match self {
            Self::State(state) => Some(state),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_card_type(&self) -> Option<CardType> {
        match self {
            Self::CardType(card_type) => Some(*card_type),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Number(n)
    }
}

impl From<Country> for FieldValue {
    fn from(country: Country) -> Self {
        Self::Country(country)
    }
}

impl From<State> for FieldValue {
    fn from(state: State) -> Self {
        Self::State(state)
    }
}

impl From<CardType> for FieldValue {
    fn from(card_type: CardType) -> Self {
        Self::CardType(card_type)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use checkout_kit_core::CountryCode;

    use super::*;

    #[test]
    fn test_empty_fits_every_kind() {
        assert!(FieldValue::Empty.fits(FieldKind::State));
        assert!(FieldValue::Empty.fits(FieldKind::Text));
    }

    #[test]
    fn test_kind_mismatch() {
        assert!(!FieldValue::from("US").fits(FieldKind::Country));
        assert!(FieldValue::from(2027).fits(FieldKind::Number));
    }

    #[test]
    fn test_selections_validate_by_code() {
        let code = CountryCode::parse("CA").unwrap();
        let state = State::new("ON", "Ontario", code.clone());
        assert_eq!(FieldValue::from(state).as_text(), "ON");
        assert_eq!(
            FieldValue::from(Country::new(code, "Canada")).as_text(),
            "CA"
        );
    }

    #[test]
    fn test_blank_text_is_not_empty() {
        assert!(FieldValue::from("").is_empty());
        assert!(!FieldValue::from("  ").is_empty());
        assert!(FieldValue::from(None::<State>).is_empty());
    }
}
