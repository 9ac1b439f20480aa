//! Form validation.
//!
//! A [`RuleSet`] declares, per field, whether it is required and which
//! [`Rule`]s apply to a filled-in value. [`RuleSet::validate`] turns a set
//! of [`FormValues`] into [`FieldErrors`]; an empty error map means the form
//! is valid. Validation is a pure function and safe to run on every
//! keystroke.
//!
//! Stock rule sets for every marketplace form live in [`rule_sets`]; the
//! regional patterns they use come from [`LocalePatterns`].

mod form_state;
mod patterns;
mod rule;
mod rule_set;
pub mod rule_sets;
mod values;

pub use form_state::FormState;
pub use patterns::{
    DEFAULT_CITY_PATTERN, DEFAULT_PHONE_PATTERN, DEFAULT_PINCODE_PATTERN, LocalePatterns,
};
pub use rule::{OptionsLookup, Pattern, Rule};
pub use rule_set::{FieldRules, RuleSet};
pub use values::{FieldErrors, FieldValue, FormValues};

/// Something that can be shown as a form and validated.
pub trait Validate {
    /// The form values this draft represents.
    fn to_form_values(&self) -> FormValues;

    /// The rules the form is checked against.
    fn rule_set(patterns: &LocalePatterns) -> RuleSet;

    /// Validate this draft.
    fn validate(&self, patterns: &LocalePatterns) -> FieldErrors {
        Self::rule_set(patterns).validate(&self.to_form_values())
    }
}
