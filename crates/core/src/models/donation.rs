//! Tips from buyers to sellers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::UserId;
use crate::validation::{FormValues, LocalePatterns, RuleSet, Validate, rule_sets};

/// A tip a buyer wants to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub message: String,
    pub buyer_id: UserId,
    pub seller_id: UserId,
}

impl Validate for DonationRequest {
    fn to_form_values(&self) -> FormValues {
        FormValues::new()
            .with("amount", self.amount)
            .with("message", self.message.as_str())
            .with("buyerId", self.buyer_id.as_str())
            .with("sellerId", self.seller_id.as_str())
    }

    fn rule_set(_patterns: &LocalePatterns) -> RuleSet {
        rule_sets::donation()
    }
}
