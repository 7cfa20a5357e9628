//! A single form control.

use crate::validators::{FieldErrorKind, Validator, validate};

use super::value::{FieldKind, FieldValue};

/// A form field: its value, its validators, and the derived error.
///
/// The error is recomputed on every write, so it never lags behind the value.
#[derive(Debug, Clone)]
pub struct Control {
    kind: FieldKind,
    value: FieldValue,
    validators: Vec<Validator>,
    error: Option<FieldErrorKind>,
    touched: bool,
}

impl Control {
    /// Create an empty control.
    #[must_use]
    pub fn new(kind: FieldKind, validators: Vec<Validator>) -> Self {
        let mut control = Self {
            kind,
            value: FieldValue::Empty,
            validators,
            error: None,
            touched: false,
        };
        control.revalidate();
        control
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }

    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// The first failing check, if any.
    #[must_use]
    pub const fn error(&self) -> Option<FieldErrorKind> {
        self.error
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    #[must_use]
    pub const fn is_touched(&self) -> bool {
        self.touched
    }

    /// Whether an error should be shown to the user.
    #[must_use]
    pub const fn shows_error(&self) -> bool {
        self.touched && self.error.is_some()
    }

    pub fn mark_as_touched(&mut self) {
        self.touched = true;
    }

    pub(crate) fn accepts(&self, value: &FieldValue) -> bool {
        value.fits(self.kind)
    }

    /// Store a value already checked with [`Control::accepts`].
    pub(crate) fn replace_value(&mut self, value: FieldValue) {
        self.value = value;
        self.revalidate();
    }

    pub(crate) fn reset(&mut self) {
        self.value = FieldValue::Empty;
        self.touched = false;
        self.revalidate();
    }

    pub(crate) fn revalidate(&mut self) {
        self.error = validate(&self.validators, &self.value.as_text()).err();
    }

    /// Record a cross-field failure unless a field-level one is already shown.
    pub(crate) fn flag(&mut self, kind: FieldErrorKind) {
        if self.error.is_none() {
            self.error = Some(kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::validators::required_text;

    use super::*;

    #[test]
    fn test_new_control_reflects_untouched_state() {
        let control = Control::new(FieldKind::Text, required_text());
        assert_eq!(control.error(), Some(FieldErrorKind::MissingValue));
        assert!(!control.is_touched());
        assert!(!control.shows_error());
    }

    #[test]
    fn test_error_recomputed_on_write() {
        let mut control = Control::new(FieldKind::Text, required_text());
        control.replace_value("Ada".into());
        assert!(control.is_valid());

        control.replace_value("  ".into());
        assert_eq!(control.error(), Some(FieldErrorKind::BlankValue));
    }

    #[test]
    fn test_reset_clears_touched() {
        let mut control = Control::new(FieldKind::Text, required_text());
        control.replace_value("Ada".into());
        control.mark_as_touched();

        control.reset();
        assert_eq!(control.value(), &FieldValue::Empty);
        assert!(!control.is_touched());
        assert_eq!(control.error(), Some(FieldErrorKind::MissingValue));
    }

    #[test]
    fn test_control_without_validators_is_always_valid() {
        let control = Control::new(FieldKind::Number, Vec::new());
        assert!(control.is_valid());
    }
}
