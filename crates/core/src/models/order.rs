//! Orders as returned by the buyer and seller order lists.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AddressId, OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

/// A line in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub title: String,
    pub quantity: u32,
    /// Unit price at the time of purchase.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    #[serde(alias = "userId")]
    pub buyer_id: UserId,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub order_status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(alias = "createdAt")]
    pub order_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl Order {
    /// Sum of the line totals.
    #[must_use]
    pub fn line_items_total(&self) -> Decimal {
        self.cart_items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the recorded total disagrees with the line items.
    ///
    /// The recorded total is authoritative for reporting; this only flags
    /// records worth a second look.
    #[must_use]
    pub fn has_total_mismatch(&self) -> bool {
        !self.cart_items.is_empty() && self.line_items_total() != self.total_amount
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn units(&self) -> u64 {
        self.cart_items
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }
}
