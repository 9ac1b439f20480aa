//! Individual field rules.

use rust_decimal::Decimal;

use super::values::{FieldValue, FormValues};
use crate::types::Email;

/// Lookup from a parent field's value to the values allowed in a dependent
/// field (e.g. category -> subcategories).
pub type OptionsLookup = fn(&str) -> Option<&'static [&'static str]>;

/// A compiled regular expression with the message shown when it does not match.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: regex::Regex,
    message: String,
}

impl Pattern {
    /// Pair a regex with its error message.
    #[must_use]
    pub fn new(regex: regex::Regex, message: impl Into<String>) -> Self {
        Self {
            regex,
            message: message.into(),
        }
    }

    /// Whether `text` matches.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One check applied to a non-empty field value.
///
/// Emptiness is handled by the owning [`FieldRules`](super::FieldRules):
/// required fields fail with a "required" message, optional empty fields
/// skip every rule.
#[derive(Debug, Clone)]
pub enum Rule {
    /// At least this many characters after trimming.
    MinLength(usize),
    /// At most this many characters after trimming.
    MaxLength(usize),
    /// Parses as a decimal number.
    Numeric,
    /// Parses as a whole number.
    Integer,
    /// Numeric lower bound.
    Min { value: Decimal, inclusive: bool },
    /// Numeric upper bound.
    Max { value: Decimal, inclusive: bool },
    /// Text matches a pattern.
    Pattern(Pattern),
    /// Number of digits (ignoring every other character) within a range.
    DigitCount { min: usize, max: usize },
    /// Value, or every entry of a list value, is one of these.
    OneOf(Vec<String>),
    /// Value is allowed for the current value of another field.
    OneOfFor { parent: String, lookup: OptionsLookup },
    /// A list with no blank entries.
    NonBlankEntries,
    /// A well-formed email address.
    Email,
    /// Numerically less than another field. Skipped when this value is zero
    /// or the other field is empty or not numeric.
    LessThanField { other: String, message: String },
    /// Equal to another field (password confirmation).
    EqualsField { other: String, message: String },
    /// Different from another field (new password vs current).
    DiffersFromField { other: String, message: String },
}

impl Rule {
    /// Shorthand for a pattern rule.
    #[must_use]
    pub fn pattern(pattern: &Pattern) -> Self {
        Self::Pattern(pattern.clone())
    }

    /// Check `value` (known to be non-empty) for the field called `label`.
    ///
    /// Returns the error message on failure.
    pub(crate) fn check(
        &self,
        label: &str,
        value: &FieldValue,
        values: &FormValues,
    ) -> Result<(), String> {
        match self {
            Self::MinLength(min) => {
                if value.as_text().chars().count() < *min {
                    return Err(format!("{label} must be at least {min} characters"));
                }
            }
            Self::MaxLength(max) => {
                if value.as_text().chars().count() > *max {
                    return Err(format!("{label} must be at most {max} characters"));
                }
            }
            Self::Numeric => {
                if value.as_decimal().is_none() {
                    return Err(format!("{label} must be a number"));
                }
            }
            Self::Integer => {
                if !value.as_decimal().is_some_and(|number| number.fract().is_zero()) {
                    return Err(format!("{label} must be a whole number"));
                }
            }
            Self::Min { value: min, inclusive } => {
                if let Some(number) = value.as_decimal() {
                    if *inclusive && number < *min {
                        return Err(format!("{label} must be at least {min}"));
                    }
                    if !*inclusive && number <= *min {
                        return Err(format!("{label} must be greater than {min}"));
                    }
                }
            }
            Self::Max { value: max, inclusive } => {
                if let Some(number) = value.as_decimal() {
                    if *inclusive && number > *max {
                        return Err(format!("{label} must be at most {max}"));
                    }
                    if !*inclusive && number >= *max {
                        return Err(format!("{label} must be less than {max}"));
                    }
                }
            }
            Self::Pattern(pattern) => {
                if !pattern.is_match(&value.as_text()) {
                    return Err(pattern.message().to_owned());
                }
            }
            Self::DigitCount { min, max } => {
                let digits = value
                    .as_text()
                    .chars()
                    .filter(char::is_ascii_digit)
                    .count();
                if digits < *min || digits > *max {
                    return Err(format!("{label} must have {min} to {max} digits"));
                }
            }
            Self::OneOf(options) => {
                let allowed = value
                    .entries()
                    .iter()
                    .all(|entry| options.iter().any(|option| option.as_str() == &**entry));
                if !allowed {
                    return Err(format!("Select a valid {}", label.to_lowercase()));
                }
            }
            Self::OneOfFor { parent, lookup } => {
                let parent_value = values.filled(parent).map(FieldValue::as_text);
                let Some(parent_value) = parent_value else {
                    return Err(format!("Select a {parent} first"));
                };
                let text = value.as_text();
                let allowed =
                    lookup(&parent_value).is_some_and(|options| options.contains(&&*text));
                if !allowed {
                    return Err(format!(
                        "Select a valid {} for {parent_value}",
                        label.to_lowercase()
                    ));
                }
            }
            Self::NonBlankEntries => match value {
                FieldValue::List(items) if items.iter().all(|item| !item.trim().is_empty()) => {}
                FieldValue::List(_) => return Err(format!("{label} cannot contain blank entries")),
                _ => return Err(format!("{label} must be a list")),
            },
            Self::Email => {
                if let Err(err) = Email::parse(&value.as_text()) {
                    return Err(format!("Enter a valid email address ({err})"));
                }
            }
            Self::LessThanField { other, message } => {
                let this = value.as_decimal();
                let other = values.filled(other).and_then(FieldValue::as_decimal);
                if let (Some(this), Some(other)) = (this, other) {
                    if !this.is_zero() && this >= other {
                        return Err(message.clone());
                    }
                }
            }
            Self::EqualsField { other, message } => {
                let text = value.as_text();
                let other = values.get(other).map(FieldValue::as_text);
                if other.as_deref() != Some(&*text) {
                    return Err(message.clone());
                }
            }
            Self::DiffersFromField { other, message } => {
                let text = value.as_text();
                let other = values.filled(other).map(FieldValue::as_text);
                if other.as_deref() == Some(&*text) {
                    return Err(message.clone());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn check(rule: &Rule, value: impl Into<FieldValue>) -> Result<(), String> {
        rule.check("Field", &value.into(), &FormValues::new())
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert!(check(&Rule::MaxLength(4), "चाय").is_ok());
        assert!(check(&Rule::MinLength(4), "चाय").is_err());
    }

    #[test]
    fn test_numeric_bounds() {
        let positive = Rule::Min {
            value: dec!(0),
            inclusive: false,
        };
        assert!(check(&positive, "0").is_err());
        assert!(check(&positive, "0.01").is_ok());

        let rating = Rule::Max {
            value: dec!(5),
            inclusive: true,
        };
        assert!(check(&rating, dec!(5)).is_ok());
        assert_eq!(
            check(&rating, dec!(5.5)),
            Err("Field must be at most 5".to_owned())
        );
    }

    #[test]
    fn test_integer() {
        assert!(check(&Rule::Integer, "12").is_ok());
        assert!(check(&Rule::Integer, "12.0").is_ok());
        assert!(check(&Rule::Integer, "12.5").is_err());
        assert!(check(&Rule::Integer, "twelve").is_err());
    }

    #[test]
    fn test_digit_count_ignores_formatting() {
        let rule = Rule::DigitCount { min: 8, max: 15 };
        assert!(check(&rule, "+91 (98) 765-43210").is_ok());
        assert!(check(&rule, "123-4567").is_err());
        assert!(check(&rule, "1234567890123456").is_err());
    }

    #[test]
    fn test_one_of_checks_every_list_entry() {
        let rule = Rule::OneOf(vec!["art".into(), "pottery".into()]);
        assert!(check(&rule, vec!["art".to_owned()]).is_ok());
        assert!(check(&rule, vec!["art".to_owned(), "cars".to_owned()]).is_err());
        assert!(check(&rule, "pottery").is_ok());
    }

    #[test]
    fn test_less_than_field_skips_zero_and_missing_other() {
        let rule = Rule::LessThanField {
            other: "price".into(),
            message: "too high".into(),
        };
        let values = FormValues::new().with("price", "100");

        let run = |sale: &str| rule.check("Sale price", &FieldValue::from(sale), &values);
        assert!(run("99.99").is_ok());
        assert_eq!(run("100"), Err("too high".to_owned()));
        assert_eq!(run("150"), Err("too high".to_owned()));
        assert!(run("0").is_ok());

        let no_price = FormValues::new();
        assert!(rule
            .check("Sale price", &FieldValue::from("150"), &no_price)
            .is_ok());
    }

    #[test]
    fn test_non_blank_entries() {
        let rule = Rule::NonBlankEntries;
        assert!(check(&rule, vec!["clay".to_owned()]).is_ok());
        assert!(check(&rule, vec!["clay".to_owned(), " ".to_owned()]).is_err());
        assert!(check(&rule, "clay").is_err());
    }
}
