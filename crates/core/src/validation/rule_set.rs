//! Declarative per-field rule sets and the validator entry point.

use super::rule::Rule;
use super::values::{FieldErrors, FormValues};
use crate::forms::FormControl;

/// The rules for one field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    name: String,
    label: String,
    required: bool,
    rules: Vec<Rule>,
}

impl FieldRules {
    /// The field name as it appears in form values and error maps.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an empty value is an error.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// The rules applied to a non-empty value, in order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First failing message for this field, if any.
    fn check(&self, values: &FormValues) -> Option<String> {
        let Some(value) = values.filled(&self.name) else {
            return self
                .required
                .then(|| format!("{} is required", self.label));
        };
        self.rules
            .iter()
            .find_map(|rule| rule.check(&self.label, value, values).err())
    }
}

/// An ordered set of field rules for one form.
///
/// Built once per form and reused for every validation pass; validation
/// itself never mutates the set.
///
/// ```
/// use bazaar_core::validation::{FormValues, Rule, RuleSet};
///
/// let rules = RuleSet::new()
///     .field("title", "Title")
///     .required("title")
///     .rule("title", Rule::MinLength(3));
///
/// let errors = rules.validate(&FormValues::new().with("title", "ab"));
/// assert_eq!(errors.get("title"), Some("Title must be at least 3 characters"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
}

impl RuleSet {
    /// An empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an optional field with its display label.
    ///
    /// Re-declaring an existing field only updates its label.
    #[must_use]
    pub fn field(mut self, name: &str, label: &str) -> Self {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => label.clone_into(&mut field.label),
            None => self.fields.push(FieldRules {
                name: name.to_owned(),
                label: label.to_owned(),
                required: false,
                rules: Vec::new(),
            }),
        }
        self
    }

    /// Declare one field per control, labelled as the control is, with the
    /// rules its options imply.
    #[must_use]
    pub fn from_controls(controls: &[FormControl]) -> Self {
        controls.iter().fold(Self::new(), |set, control| {
            let set = set.field(control.name(), control.label());
            match control.implied_rule() {
                Some(rule) => set.rule(control.name(), rule),
                None => set,
            }
        })
    }

    /// Mark a field as required, declaring it if needed.
    #[must_use]
    pub fn required(mut self, name: &str) -> Self {
        self.entry(name).required = true;
        self
    }

    /// Append a rule to a field, declaring it if needed.
    #[must_use]
    pub fn rule(mut self, name: &str, rule: Rule) -> Self {
        self.entry(name).rules.push(rule);
        self
    }

    /// Append several rules to a field.
    #[must_use]
    pub fn rules(mut self, name: &str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.entry(name).rules.extend(rules);
        self
    }

    /// Validate every declared field.
    ///
    /// Pure: the result depends only on `values`. Each invalid field maps to
    /// the message of its first failing rule; fields not declared in the set
    /// are ignored.
    #[must_use]
    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        self.fields
            .iter()
            .filter_map(|field| field.check(values).map(|message| (field.name.clone(), message)))
            .collect()
    }

    /// Validate a single field, e.g. on blur.
    #[must_use]
    pub fn validate_field(&self, name: &str, values: &FormValues) -> Option<String> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .and_then(|field| field.check(values))
    }

    /// The declared fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldRules> {
        self.fields.iter()
    }

    #[allow(clippy::indexing_slicing)] // index comes from position() or the push
    fn entry(&mut self, name: &str) -> &mut FieldRules {
        let index = match self.fields.iter().position(|field| field.name == name) {
            Some(index) => index,
            None => {
                self.fields.push(FieldRules {
                    name: name.to_owned(),
                    label: name.to_owned(),
                    required: false,
                    rules: Vec::new(),
                });
                self.fields.len() - 1
            }
        };
        &mut self.fields[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldValue;

    fn notes_and_title() -> RuleSet {
        RuleSet::new()
            .field("title", "Title")
            .required("title")
            .rule("title", Rule::MaxLength(10))
            .field("notes", "Notes")
            .rule("notes", Rule::MaxLength(5))
    }

    #[test]
    fn test_required_field_missing_or_blank() {
        let rules = notes_and_title();
        let errors = rules.validate(&FormValues::new());
        assert_eq!(errors.get("title"), Some("Title is required"));

        let errors = rules.validate(&FormValues::new().with("title", "   "));
        assert_eq!(errors.get("title"), Some("Title is required"));
    }

    #[test]
    fn test_optional_empty_field_has_no_error() {
        let rules = notes_and_title();
        let errors = rules.validate(&FormValues::new().with("title", "Vase").with("notes", ""));
        assert!(errors.is_valid());
    }

    #[test]
    fn test_optional_filled_field_still_checked() {
        let rules = notes_and_title();
        let errors = rules.validate(
            &FormValues::new()
                .with("title", "Vase")
                .with("notes", "far too long"),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("notes"), Some("Notes must be at most 5 characters"));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let rules = RuleSet::new()
            .field("price", "Price")
            .required("price")
            .rules("price", [Rule::Numeric, Rule::MaxLength(2)]);
        let errors = rules.validate(&FormValues::new().with("price", "abc"));
        assert_eq!(errors.get("price"), Some("Price must be a number"));
    }

    #[test]
    fn test_validation_is_repeatable() {
        let rules = notes_and_title();
        let values = FormValues::new().with("title", FieldValue::from("A very long title"));
        let first = rules.validate(&values);
        let second = rules.validate(&values);
        assert_eq!(first, second);
        assert_eq!(
            rules.validate_field("title", &values).as_deref(),
            first.get("title")
        );
    }

    #[test]
    fn test_undeclared_rule_target_uses_name_as_label() {
        let rules = RuleSet::new().required("sku");
        let errors = rules.validate(&FormValues::new());
        assert_eq!(errors.get("sku"), Some("sku is required"));
    }
}
