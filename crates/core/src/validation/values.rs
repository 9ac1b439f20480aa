//! Form values and field error maps.

use std::borrow::Cow;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The current value of one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text as typed, untrimmed.
    Text(String),
    /// A value that is already numeric.
    Number(Decimal),
    /// Multi-valued fields (materials, interested categories).
    List(Vec<String>),
}

impl FieldValue {
    /// Whether the field counts as "not filled in".
    ///
    /// Whitespace-only text and empty lists are empty; numbers never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) => false,
            Self::List(items) => items.is_empty(),
        }
    }

    /// The value as trimmed text. Lists are joined with `", "`.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text.trim()),
            Self::Number(number) => Cow::Owned(number.normalize().to_string()),
            Self::List(items) => Cow::Owned(items.join(", ")),
        }
    }

    /// The value as a decimal, if it is a number or numeric text.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => text.trim().parse().ok(),
            Self::List(_) => None,
        }
    }

    /// The individual entries of a list value; scalars yield themselves.
    #[must_use]
    pub fn entries(&self) -> Vec<Cow<'_, str>> {
        match self {
            Self::List(items) => items.iter().map(|item| Cow::Borrowed(item.as_str())).collect(),
            other => vec![other.as_text()],
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Field name to current value for one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Builder-style insert that skips `None`.
    #[must_use]
    pub fn with_opt<V: Into<FieldValue>>(
        mut self,
        field: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        if let Some(value) = value {
            self.set(field, value);
        }
        self
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Get a field's value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// A field's value, treating absent and empty alike.
    #[must_use]
    pub fn filled(&self, field: &str) -> Option<&FieldValue> {
        self.get(field).filter(|value| !value.is_empty())
    }

    /// Iterate over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    /// Build form values from a JSON object, as submitted by a raw form.
    ///
    /// Strings become text, numbers become decimals, arrays become lists
    /// (non-string entries are stringified), booleans become `"true"` or
    /// `"false"`. `null` fields are omitted; nested objects are ignored.
    /// Returns `None` when `value` is not an object.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut values = Self::new();
        for (field, raw) in object {
            let converted = match raw {
                serde_json::Value::String(text) => FieldValue::Text(text.clone()),
                serde_json::Value::Number(number) => {
                    let text = number.to_string();
                    text.parse::<Decimal>()
                        .or_else(|_| Decimal::from_scientific(&text))
                        .map_or(FieldValue::Text(text), FieldValue::Number)
                }
                serde_json::Value::Bool(flag) => FieldValue::from(*flag),
                serde_json::Value::Array(items) => FieldValue::List(
                    items
                        .iter()
                        .map(|item| match item {
                            serde_json::Value::String(text) => text.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                ),
                serde_json::Value::Null | serde_json::Value::Object(_) => continue,
            };
            values.set(field.clone(), converted);
        }
        Some(values)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

/// Field name to human-readable error.
///
/// A field absent from the map is valid. Ordered by field name so the
/// output is stable across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single error, for checks that live outside a rule set.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// `true` iff there are no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Same as [`Self::is_valid`], for collection-style call sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The error for one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Record an error. Empty messages are ignored.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        if !message.is_empty() {
            self.0.insert(field.into(), message);
        }
    }

    /// Remove and return a field's error.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    /// Add every error from `other`, replacing errors on the same field.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Iterate over `(field, message)` in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.insert(field, message);
        }
        errors
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}
