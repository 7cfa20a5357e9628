//! Credit card types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a card type name is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown card type: {0}")]
pub struct CardTypeError(pub String);

/// Card brands accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Visa,
    Mastercard,
    #[serde(rename = "American Express")]
    AmericanExpress,
    Discover,
}

impl CardType {
    /// All card types in dropdown order.
    pub const ALL: [Self; 4] = [
        Self::Visa,
        Self::Mastercard,
        Self::AmericanExpress,
        Self::Discover,
    ];

    /// Display name of the card type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::AmericanExpress => "American Express",
            Self::Discover => "Discover",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CardType {
    type Err = CardTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "visa" => Ok(Self::Visa),
            "mastercard" => Ok(Self::Mastercard),
            "americanexpress" | "amex" => Ok(Self::AmericanExpress),
            "discover" => Ok(Self::Discover),
            _ => Err(CardTypeError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!("visa".parse::<CardType>().unwrap(), CardType::Visa);
        assert_eq!("MasterCard".parse::<CardType>().unwrap(), CardType::Mastercard);
        assert_eq!(
            "american express".parse::<CardType>().unwrap(),
            CardType::AmericanExpress
        );
        assert_eq!("AMEX".parse::<CardType>().unwrap(), CardType::AmericanExpress);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "Diners".parse::<CardType>(),
            Err(CardTypeError("Diners".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for card_type in CardType::ALL {
            assert_eq!(card_type.to_string().parse::<CardType>().unwrap(), card_type);
        }
    }
}
