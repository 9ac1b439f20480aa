//! Offline form validation.
//!
//! Runs the same rules the client applies before submitting, against a JSON
//! object keyed by wire field names (`title`, `salePrice`, `pincode`, ...).
//! Exits non-zero when any field fails.

use std::path::Path;

use bazaar_client::patterns_from_env;
use bazaar_core::validation::{FieldErrors, FormValues, LocalePatterns, RuleSet, rule_sets};
use clap::ValueEnum;
use serde::Serialize;

use super::{CliError, Output, read_json};

/// Forms that can be validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormKind {
    Product,
    Address,
    Portfolio,
    Profile,
    Password,
    Donation,
}

impl FormKind {
    fn rules(self, patterns: &LocalePatterns) -> RuleSet {
        match self {
            Self::Product => rule_sets::product(),
            Self::Address => rule_sets::address(patterns),
            Self::Portfolio => rule_sets::portfolio(),
            Self::Profile => rule_sets::profile(patterns),
            Self::Password => rule_sets::password_change(),
            Self::Donation => rule_sets::donation(),
        }
    }
}

#[derive(Serialize)]
struct Verdict<'a> {
    valid: bool,
    errors: &'a FieldErrors,
}

/// Validate the document at `path` as a `form`.
pub fn run(form: FormKind, path: &Path, output: Output) -> Result<(), CliError> {
    let document = read_json(path)?;
    let values = FormValues::from_json(&document).ok_or_else(|| CliError::Parse {
        path: path.to_owned(),
        message: "expected a JSON object".into(),
    })?;

    let errors = check(form, &values, &patterns_from_env()?);
    tracing::debug!(?form, failed = errors.len(), "validated");

    if output.json {
        Output::json(&Verdict {
            valid: errors.is_valid(),
            errors: &errors,
        })?;
    } else if errors.is_valid() {
        Output::lines(&["valid".to_owned()])?;
    } else {
        let lines: Vec<String> = errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        Output::lines(&lines)?;
    }

    if errors.is_valid() {
        Ok(())
    } else {
        Err(CliError::Invalid(errors.len()))
    }
}

fn check(form: FormKind, values: &FormValues, patterns: &LocalePatterns) -> FieldErrors {
    form.rules(patterns).validate(values)
}
