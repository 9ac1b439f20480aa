//! Buyer address book.

use serde::{Deserialize, Serialize};

use crate::types::{AddressId, UserId};
use crate::validation::{FormValues, LocalePatterns, RuleSet, Validate, rule_sets};

/// The backend keeps at most this many addresses per user.
pub const MAX_ADDRESSES_PER_USER: usize = 3;

/// A saved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id", alias = "id")]
    pub id: AddressId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub address: String,
    pub city: String,
    pub pincode: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

impl Address {
    #[must_use]
    pub fn to_draft(&self) -> AddressDraft {
        AddressDraft {
            address: self.address.clone(),
            city: self.city.clone(),
            pincode: self.pincode.clone(),
            phone: self.phone.clone(),
            notes: self.notes.clone(),
        }
    }

    /// One-line rendering for pickers.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{}, {} {}", self.address.trim(), self.city.trim(), self.pincode.trim())
    }
}

/// The body of an add or edit address request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    pub address: String,
    pub city: String,
    pub pincode: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

impl Validate for AddressDraft {
    fn to_form_values(&self) -> FormValues {
        FormValues::new()
            .with("address", self.address.as_str())
            .with("city", self.city.as_str())
            .with("pincode", self.pincode.as_str())
            .with("phone", self.phone.as_str())
            .with("notes", self.notes.as_str())
    }

    fn rule_set(patterns: &LocalePatterns) -> RuleSet {
        rule_sets::address(patterns)
    }
}

/// A partial address edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPatch {
    pub address: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl AddressPatch {
    pub fn apply(self, draft: &mut AddressDraft) {
        let fields = [
            (self.address, &mut draft.address),
            (self.city, &mut draft.city),
            (self.pincode, &mut draft.pincode),
            (self.phone, &mut draft.phone),
            (self.notes, &mut draft.notes),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let json = serde_json::json!({
            "_id": "a1",
            "userId": "u1",
            "address": "12 Lake Road",
            "city": "Pune",
            "pincode": "411001"
        });
        let address: Address = serde_json::from_value(json).unwrap();
        assert_eq!(address.phone, "");
        assert_eq!(address.summary(), "12 Lake Road, Pune 411001");
        assert!(address.to_draft().validate(&LocalePatterns::default()).is_valid());
    }

    #[test]
    fn test_patch_then_validate() {
        let mut draft = AddressDraft {
            address: "12 Lake Road".into(),
            city: "Pune".into(),
            pincode: "411001".into(),
            ..AddressDraft::default()
        };
        AddressPatch {
            pincode: Some("4110".into()),
            ..AddressPatch::default()
        }
        .apply(&mut draft);

        let errors = draft.validate(&LocalePatterns::default());
        assert_eq!(errors.len(), 1);
        assert!(errors.get("pincode").is_some());
    }
}
