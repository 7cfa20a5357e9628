//! Field validators for the checkout form.
//!
//! Validators are pure predicates over a field's current text. A field holds
//! an ordered list of them; the first one that fails decides the reported
//! error, so the order is part of the field's contract.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,4}$")
        .case_insensitive(true)
        .build()
        .expect("Invalid regex")
});

static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("Invalid regex"));

static SECURITY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}$").expect("Invalid regex"));

/// Why a field is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldErrorKind {
    /// The field is empty.
    #[error("is required")]
    MissingValue,
    /// The trimmed value is shorter than allowed.
    #[error("must be at least {min} characters long")]
    TooShort { min: usize, actual: usize },
    /// The value is longer than allowed.
    #[error("must be at most {max} characters long")]
    TooLong { max: usize, actual: usize },
    /// The value is non-empty but only whitespace.
    #[error("must not be only whitespace")]
    BlankValue,
    /// The value does not match the expected format.
    #[error("has an invalid format")]
    FormatMismatch,
    /// The selected state belongs to a different country.
    #[error("must belong to the selected country")]
    StateNotInCountry,
}

/// Built-in formats checked by [`Validator::Pattern`].
#[derive(Debug, Clone)]
pub enum FieldPattern {
    /// Basic email address, case-insensitive.
    Email,
    /// Exactly sixteen digits.
    CardNumber,
    /// Exactly three digits.
    SecurityCode,
    /// Any other expression, anchored by [`FieldPattern::custom`].
    Custom(Regex),
}

impl FieldPattern {
    /// Build a custom pattern that must match the whole value.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression does not compile.
    pub fn custom(expr: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{expr})$")).map(Self::Custom)
    }

    fn regex(&self) -> &Regex {
        match self {
            Self::Email => &*EMAIL_RE,
            Self::CardNumber => &*CARD_NUMBER_RE,
            Self::SecurityCode => &*SECURITY_CODE_RE,
            Self::Custom(regex) => regex,
        }
    }

    /// Whether the whole value matches the pattern.
    #[must_use]
    pub fn is_full_match(&self, value: &str) -> bool {
        self.regex()
            .find(value)
            .is_some_and(|m| m.start() == 0 && m.end() == value.len())
    }
}

/// A single check applied to a field value.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Fails with [`FieldErrorKind::MissingValue`] if the value is empty.
    Required,
    /// Fails with [`FieldErrorKind::TooShort`] if the trimmed value has
    /// fewer characters. Blank values are left to the other validators.
    MinLength(usize),
    /// Fails with [`FieldErrorKind::TooLong`] if the value has more characters.
    MaxLength(usize),
    /// Fails with [`FieldErrorKind::BlankValue`] if the value trims to empty.
    NotOnlyWhitespace,
    /// Fails with [`FieldErrorKind::FormatMismatch`] if a non-empty value
    /// does not fully match.
    Pattern(FieldPattern),
}

impl Validator {
    /// Check a single value.
    ///
    /// # Errors
    ///
    /// Returns the error kind this validator reports for the value.
    pub fn check(&self, value: &str) -> Result<(), FieldErrorKind> {
        match self {
            Self::Required => {
                if value.is_empty() {
                    return Err(FieldErrorKind::MissingValue);
                }
            }
            Self::MinLength(min) => {
                let trimmed = value.trim();
                let actual = trimmed.chars().count();
                if !trimmed.is_empty() && actual < *min {
                    return Err(FieldErrorKind::TooShort { min: *min, actual });
                }
            }
            Self::MaxLength(max) => {
                let actual = value.chars().count();
                if actual > *max {
                    return Err(FieldErrorKind::TooLong { max: *max, actual });
                }
            }
            Self::NotOnlyWhitespace => {
                if !value.is_empty() && value.trim().is_empty() {
                    return Err(FieldErrorKind::BlankValue);
                }
            }
            Self::Pattern(pattern) => {
                if !value.is_empty() && !pattern.is_full_match(value) {
                    return Err(FieldErrorKind::FormatMismatch);
                }
            }
        }
        Ok(())
    }
}

/// Run validators in order and report the first failure.
///
/// # Errors
///
/// Returns the error kind of the first failing validator.
pub fn validate(validators: &[Validator], value: &str) -> Result<(), FieldErrorKind> {
    validators.iter().try_for_each(|validator| validator.check(value))
}

/// Validators for a required free-text field such as a name or street.
#[must_use]
pub fn required_text() -> Vec<Validator> {
    vec![
        Validator::Required,
        Validator::MinLength(2),
        Validator::NotOnlyWhitespace,
    ]
}
