use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{ReportWindow, top_by};
use crate::models::Order;
use crate::types::{OrderId, OrderStatus, ProductId};

/// Units and revenue for one product across a set of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

/// Sales summary for a time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub window: ReportWindow,
    pub total_sales: Decimal,
    pub total_orders: usize,
    /// Zero when there are no orders.
    pub average_order_value: Decimal,
    /// Best sellers by units, at most [`super::TOP_N`].
    pub top_products: Vec<ProductSales>,
    pub orders_by_status: BTreeMap<OrderStatus, usize>,
    /// Orders whose recorded total differs from their line items.
    pub mismatched_totals: Vec<OrderId>,
}

/// Build the sales report for orders placed inside `window`.
///
/// Every order in the window counts, whatever its status; the recorded
/// `totalAmount` is used as-is.
#[must_use]
pub fn sales_report(orders: &[Order], window: ReportWindow, now: DateTime<Utc>) -> SalesReport {
    let in_window: Vec<&Order> = orders
        .iter()
        .filter(|order| window.contains(order.order_date, now))
        .collect();

    let total_sales: Decimal = in_window.iter().map(|order| order.total_amount).sum();
    let total_orders = in_window.len();
    let average_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        total_sales / Decimal::from(total_orders)
    };

    let mut orders_by_status = BTreeMap::new();
    for order in &in_window {
        *orders_by_status.entry(order.order_status).or_insert(0) += 1;
    }

    let mismatched_totals = in_window
        .iter()
        .filter(|order| order.has_total_mismatch())
        .map(|order| order.id.clone())
        .collect();

    tracing::debug!(%window, total_orders, "built sales report");

    SalesReport {
        window,
        total_sales,
        total_orders,
        average_order_value,
        top_products: top_by(accumulate(&in_window), |sales| sales.quantity),
        orders_by_status,
        mismatched_totals,
    }
}

/// Per-product totals in first-seen order.
fn accumulate(orders: &[&Order]) -> Vec<ProductSales> {
    let mut index: HashMap<&ProductId, usize> = HashMap::new();
    let mut totals: Vec<ProductSales> = Vec::new();

    for item in orders.iter().flat_map(|order| &order.cart_items) {
        let slot = *index.entry(&item.product_id).or_insert_with(|| {
            totals.push(ProductSales {
                product_id: item.product_id.clone(),
                title: item.title.clone(),
                quantity: 0,
                revenue: Decimal::ZERO,
            });
            totals.len() - 1
        });
        if let Some(entry) = totals.get_mut(slot) {
            entry.quantity += u64::from(item.quantity);
            entry.revenue += item.line_total();
        }
    }

    totals
}
