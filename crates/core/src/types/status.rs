//! Status enums for orders and payments.
//!
//! Wire values are the camelCase strings the marketplace backend stores.

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Order lifecycle status.
///
/// Sellers and admins move orders forward through this set; the backend
/// owns the transition rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    #[default]
    Pending,
    /// Accepted by the seller, not yet being prepared.
    Confirmed,
    InProcess,
    InShipping,
    Delivered,
    Rejected,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::InProcess,
        Self::InShipping,
        Self::Delivered,
        Self::Rejected,
    ];

    /// The wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProcess => "inProcess",
            Self::InShipping => "inShipping",
            Self::Delivered => "delivered",
            Self::Rejected => "rejected",
        }
    }

    /// Whether an order in this status counts towards product revenue.
    #[must_use]
    pub const fn counts_as_sale(&self) -> bool {
        matches!(self, Self::Delivered | Self::Confirmed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError::new("order status", s))
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(ParseStatusError::new("payment status", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_values() {
        let json = serde_json::to_string(&OrderStatus::InShipping).unwrap();
        assert_eq!(json, "\"inShipping\"");

        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_order_status_rejects_unknown() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid order status: shipped");
    }

    #[test]
    fn test_only_delivered_and_confirmed_count_as_sales() {
        let counted: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(OrderStatus::counts_as_sale)
            .collect();
        assert_eq!(counted, vec![OrderStatus::Confirmed, OrderStatus::Delivered]);
    }

    #[test]
    fn test_payment_status_from_str() {
        assert_eq!("paid".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert!("settled".parse::<PaymentStatus>().is_err());
    }
}
