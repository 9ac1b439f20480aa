//! Report commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar report sales --window 7d
//! bazaar report sales --orders orders.json --json
//! bazaar report products --orders orders.json --products products.json
//! ```

use std::path::Path;

use bazaar_core::models::{Order, Product};
use bazaar_core::report::{
    ProductReport, ReportWindow, SalesReport, product_report, sales_report,
};
use bazaar_core::types::{CurrencyCode, Price};
use chrono::Utc;
use rust_decimal::Decimal;

use super::{CliError, Output, connect, load_list};

/// Print the sales report for `window`.
pub async fn sales(
    window: ReportWindow,
    orders: Option<&Path>,
    output: Output,
) -> Result<(), CliError> {
    let orders = load_orders(orders).await?;
    let report = sales_report(&orders, window, Utc::now());
    tracing::info!(%window, orders = report.total_orders, "sales report built");

    if output.json {
        Output::json(&report)
    } else {
        Output::lines(&render_sales(&report))
    }
}

/// Print the product performance report.
pub async fn products(
    orders: Option<&Path>,
    products: Option<&Path>,
    output: Output,
) -> Result<(), CliError> {
    let products = load_products(products).await?;
    let orders = load_orders(orders).await?;
    let report = product_report(&products, &orders);
    tracing::info!(products = report.total_products, "product report built");

    if output.json {
        Output::json(&report)
    } else {
        Output::lines(&render_products(&report))
    }
}

async fn load_orders(path: Option<&Path>) -> Result<Vec<Order>, CliError> {
    match path {
        Some(path) => load_list(path),
        None => Ok(connect()?.refresh_orders().await?),
    }
}

async fn load_products(path: Option<&Path>) -> Result<Vec<Product>, CliError> {
    match path {
        Some(path) => load_list(path),
        None => Ok(connect()?.refresh_products().await?),
    }
}

fn money(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::default()).display()
}

fn render_sales(report: &SalesReport) -> Vec<String> {
    let mut lines = vec![
        format!("Sales ({})", report.window.label()),
        format!("  Total sales:         {}", money(report.total_sales)),
        format!("  Orders:              {}", report.total_orders),
        format!("  Average order value: {}", money(report.average_order_value)),
    ];

    if !report.orders_by_status.is_empty() {
        lines.push("By status:".into());
        lines.extend(
            report
                .orders_by_status
                .iter()
                .map(|(status, count)| format!("  {:<12} {count}", status.as_str())),
        );
    }

    if !report.top_products.is_empty() {
        lines.push("Top products:".into());
        lines.extend(report.top_products.iter().enumerate().map(|(rank, product)| {
            format!(
                "  {}. {} - {} sold, {}",
                rank + 1,
                product.title,
                product.quantity,
                money(product.revenue)
            )
        }));
    }

    if !report.mismatched_totals.is_empty() {
        lines.push(format!(
            "Orders whose total differs from their items: {}",
            report
                .mismatched_totals
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    lines
}

fn render_products(report: &ProductReport) -> Vec<String> {
    let mut lines = vec![
        "Products".to_owned(),
        format!("  Listed:        {}", report.total_products),
        format!("  Out of stock:  {}", report.out_of_stock),
        format!("  Total revenue: {}", money(report.total_revenue)),
    ];

    if !report.top_products.is_empty() {
        lines.push("Best sellers:".into());
        lines.extend(report.top_products.iter().enumerate().map(|(rank, product)| {
            format!(
                "  {}. {} ({}) - {} sold, {}",
                rank + 1,
                product.title,
                product.category.label(),
                product.quantity_sold,
                money(product.revenue)
            )
        }));
    }

    lines
}
