//! Named groups of controls.

use std::collections::BTreeMap;

use crate::validators::FieldErrorKind;

use super::FormError;
use super::control::Control;
use super::path::{FieldPath, GroupName, fields};
use super::value::FieldValue;

/// A full set of values for one group, keyed by field name.
pub type GroupValues = BTreeMap<String, FieldValue>;

/// Checks spanning several controls of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRule {
    /// The selected state must belong to the selected country.
    StateBelongsToCountry,
}

/// An ordered set of controls forming one part of the checkout form.
#[derive(Debug, Clone)]
pub struct FormGroup {
    name: GroupName,
    controls: Vec<(&'static str, Control)>,
    rules: Vec<GroupRule>,
}

impl FormGroup {
    pub(crate) fn new(
        name: GroupName,
        controls: Vec<(&'static str, Control)>,
        rules: Vec<GroupRule>,
    ) -> Self {
        let mut group = Self {
            name,
            controls,
            rules,
        };
        group.refresh();
        group
    }

    #[must_use]
    pub const fn name(&self) -> GroupName {
        self.name
    }

    /// Look up a control by field name.
    #[must_use]
    pub fn control(&self, field: &str) -> Option<&Control> {
        self.controls
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, control)| control)
    }

    fn control_mut(&mut self, field: &str) -> Option<&mut Control> {
        self.controls
            .iter_mut()
            .find(|(name, _)| *name == field)
            .map(|(_, control)| control)
    }

    /// Controls in form order.
    pub fn controls(&self) -> impl Iterator<Item = (&'static str, &Control)> {
        self.controls.iter().map(|(name, control)| (*name, control))
    }

    /// A deep copy of every value in the group.
    #[must_use]
    pub fn value(&self) -> GroupValues {
        self.controls
            .iter()
            .map(|(name, control)| ((*name).to_string(), control.value().clone()))
            .collect()
    }

    /// Whether every control in the group is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.controls.iter().all(|(_, control)| control.is_valid())
    }

    /// Paths of the invalid controls, in form order.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<FieldPath> {
        self.controls
            .iter()
            .filter(|(_, control)| !control.is_valid())
            .filter_map(|(name, _)| FieldPath::new(self.name, name).ok())
            .collect()
    }

    pub(crate) fn mark_all_as_touched(&mut self) {
        for (_, control) in &mut self.controls {
            control.mark_as_touched();
        }
    }

    pub(crate) fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FormError> {
        let path = FieldPath::new(self.name, field)?;
        let control = self
            .control_mut(field)
            .ok_or_else(|| FormError::UnknownPath(path.to_string()))?;
        if !control.accepts(&value) {
            return Err(FormError::KindMismatch {
                path,
                expected: control.kind(),
            });
        }
        control.replace_value(value);
        self.refresh();
        Ok(())
    }

    /// Replace every value at once.
    ///
    /// All keys are checked before anything is written, so a rejected call
    /// leaves the group untouched.
    pub(crate) fn set_value(&mut self, mut values: GroupValues) -> Result<(), FormError> {
        if let Some(extra) = values.keys().find(|key| self.name.field(key).is_none()) {
            return Err(FormError::UnexpectedGroupField {
                group: self.name,
                field: extra.clone(),
            });
        }

        for (name, control) in &self.controls {
            let path = FieldPath::new(self.name, name)?;
            let value = values
                .get(*name)
                .ok_or(FormError::MissingGroupField { path })?;
            if !control.accepts(value) {
                return Err(FormError::KindMismatch {
                    path,
                    expected: control.kind(),
                });
            }
        }

        for (name, control) in &mut self.controls {
            let value = values.remove(*name).unwrap_or_default();
            control.replace_value(value);
        }
        self.refresh();
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        for (_, control) in &mut self.controls {
            control.reset();
        }
        self.refresh();
    }

    /// Re-run every validator and group rule.
    fn refresh(&mut self) {
        for (_, control) in &mut self.controls {
            control.revalidate();
        }

        for rule in self.rules.clone() {
            match rule {
                GroupRule::StateBelongsToCountry => self.check_state_country(),
            }
        }
    }

    fn check_state_country(&mut self) {
        let mismatch = match (
            self.control(fields::STATE).map(Control::value),
            self.control(fields::COUNTRY).map(Control::value),
        ) {
            (Some(FieldValue::State(state)), Some(FieldValue::Country(country))) => {
                !state.belongs_to(country)
            }
            _ => false,
        };

        if mismatch && let Some(state) = self.control_mut(fields::STATE) {
            state.flag(FieldErrorKind::StateNotInCountry);
        }
    }
}
