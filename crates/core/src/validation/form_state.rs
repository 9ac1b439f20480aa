//! Live form state: values, client errors and merged server errors.

use std::collections::BTreeMap;

use super::rule_set::RuleSet;
use super::values::{FieldErrors, FieldValue, FormValues};

/// A server-side field error and the value it was reported against.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServerError {
    message: String,
    value: Option<FieldValue>,
}

/// The values and errors of one form while the user edits it.
///
/// Client errors are recomputed from scratch on every [`validate`](Self::validate).
/// Server errors merged with [`merge_server_errors`](Self::merge_server_errors)
/// stay attached to their field only while its value is unchanged, so
/// correcting one field clears exactly that field's error.
#[derive(Debug, Clone)]
pub struct FormState {
    rules: RuleSet,
    values: FormValues,
    errors: FieldErrors,
    server_errors: BTreeMap<String, ServerError>,
}

impl FormState {
    /// A form with initial values and no errors shown yet.
    #[must_use]
    pub fn new(rules: RuleSet, values: FormValues) -> Self {
        Self {
            rules,
            values,
            errors: FieldErrors::new(),
            server_errors: BTreeMap::new(),
        }
    }

    /// Current values.
    #[must_use]
    pub const fn values(&self) -> &FormValues {
        &self.values
    }

    /// Errors as of the last validation or merge.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Update one field. Errors are left as they are until the next
    /// [`validate`](Self::validate).
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.set(field, value);
    }

    /// Recompute errors for the current values.
    ///
    /// Returns `true` when the form is valid and may be submitted.
    pub fn validate(&mut self) -> bool {
        let mut errors = self.rules.validate(&self.values);

        let values = &self.values;
        self.server_errors
            .retain(|field, error| values.get(field) == error.value.as_ref());
        for (field, error) in &self.server_errors {
            if errors.get(field).is_none() {
                errors.insert(field.clone(), error.message.clone());
            }
        }

        self.errors = errors;
        self.errors.is_valid()
    }

    /// Fold server-reported field errors into the form, remembering the
    /// value each was reported against.
    pub fn merge_server_errors(&mut self, errors: &FieldErrors) {
        for (field, message) in errors.iter() {
            self.server_errors.insert(
                field.to_owned(),
                ServerError {
                    message: message.to_owned(),
                    value: self.values.get(field).cloned(),
                },
            );
            self.errors.insert(field, message);
        }
    }

    /// `true` iff no errors are currently shown.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_valid()
    }
}
