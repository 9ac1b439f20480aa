use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::top_by;
use crate::models::{Order, Product};
use crate::types::{Category, ProductId};

/// How one product has performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformance {
    pub product_id: ProductId,
    pub title: String,
    pub category: Category,
    pub price: Decimal,
    pub in_stock: bool,
    pub quantity_sold: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReport {
    pub total_products: usize,
    pub out_of_stock: usize,
    pub total_revenue: Decimal,
    /// Best performers by revenue, at most [`super::TOP_N`].
    pub top_products: Vec<ProductPerformance>,
    /// Every product, in catalog order.
    pub products: Vec<ProductPerformance>,
}

/// Build the product performance report.
///
/// Only orders that count as a sale (delivered or confirmed) contribute.
/// Cart items referring to products outside `products` are skipped.
#[must_use]
pub fn product_report(products: &[Product], orders: &[Order]) -> ProductReport {
    let mut records: Vec<ProductPerformance> = products
        .iter()
        .map(|product| ProductPerformance {
            product_id: product.id.clone(),
            title: product.title.clone(),
            category: product.category,
            price: product.price,
            in_stock: product.in_stock(),
            quantity_sold: 0,
            revenue: Decimal::ZERO,
        })
        .collect();

    let index: HashMap<ProductId, usize> = records
        .iter()
        .enumerate()
        .map(|(position, record)| (record.product_id.clone(), position))
        .collect();

    let mut skipped = 0_usize;
    for item in orders
        .iter()
        .filter(|order| order.order_status.counts_as_sale())
        .flat_map(|order| &order.cart_items)
    {
        match index
            .get(&item.product_id)
            .and_then(|&position| records.get_mut(position))
        {
            Some(record) => {
                record.quantity_sold += u64::from(item.quantity);
                record.revenue += item.line_total();
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "cart items for unknown products skipped");
    }

    let total_revenue: Decimal = records.iter().map(|record| record.revenue).sum();
    let out_of_stock = records.iter().filter(|record| !record.in_stock).count();

    ProductReport {
        total_products: records.len(),
        out_of_stock,
        total_revenue,
        top_products: top_by(records.clone(), |record| record.revenue),
        products: records,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::models::CartItem;
    use crate::types::{OrderId, OrderStatus, PaymentStatus, UserId};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn product(id: &str, price: Decimal, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            description: String::new(),
            category: Category::Pottery,
            subcategory: "vases".into(),
            price,
            sale_price: None,
            total_stock: stock,
            image: None,
            seller_id: None,
        }
    }

    fn order(status: OrderStatus, items: &[(&str, u32, Decimal)]) -> Order {
        Order {
            id: OrderId::new("o"),
            buyer_id: UserId::new("buyer"),
            cart_items: items
                .iter()
                .map(|&(id, quantity, price)| CartItem {
                    product_id: ProductId::new(id),
                    title: String::new(),
                    quantity,
                    price,
                    image: None,
                })
                .collect(),
            total_amount: Decimal::ZERO,
            order_status: status,
            payment_status: PaymentStatus::Paid,
            order_date: Utc::now(),
            address_id: None,
            payment_method: None,
        }
    }

    #[test]
    fn test_only_sales_count() {
        let products = vec![product("p1", dec!(100), 3)];
        let orders = vec![
            order(OrderStatus::Delivered, &[("p1", 2, dec!(100))]),
            order(OrderStatus::Pending, &[("p1", 5, dec!(100))]),
            order(OrderStatus::Rejected, &[("p1", 1, dec!(100))]),
        ];
        let report = product_report(&products, &orders);

        assert_eq!(report.products[0].quantity_sold, 2);
        assert_eq!(report.products[0].revenue, dec!(200));
        assert_eq!(report.total_revenue, dec!(200));
    }

    #[test]
    fn test_confirmed_orders_count_as_sales() {
        let products = vec![product("p1", dec!(40), 3)];
        let orders = vec![order(OrderStatus::Confirmed, &[("p1", 1, dec!(40))])];
        assert_eq!(product_report(&products, &orders).total_revenue, dec!(40));
    }

    #[test]
    fn test_unknown_products_are_skipped() {
        let products = vec![product("p1", dec!(10), 0)];
        let orders = vec![order(
            OrderStatus::Delivered,
            &[("ghost", 4, dec!(99)), ("p1", 1, dec!(10))],
        )];
        let report = product_report(&products, &orders);

        assert_eq!(report.total_products, 1);
        assert_eq!(report.out_of_stock, 1);
        assert_eq!(report.total_revenue, dec!(10));
    }

    #[test]
    fn test_top_five_of_six_by_revenue() {
        let products: Vec<_> = (1..=6)
            .map(|n| product(&format!("p{n}"), dec!(10), 1))
            .collect();
        let orders = vec![order(
            OrderStatus::Delivered,
            &[
                ("p1", 1, dec!(10)),
                ("p2", 6, dec!(10)),
                ("p3", 3, dec!(10)),
                ("p4", 5, dec!(10)),
                ("p5", 2, dec!(10)),
                ("p6", 4, dec!(10)),
            ],
        )];
        let report = product_report(&products, &orders);
        let ids: Vec<_> = report
            .top_products
            .iter()
            .map(|record| record.product_id.as_str())
            .collect();

        assert_eq!(ids, ["p2", "p4", "p6", "p3", "p5"]);
        assert!(
            report
                .top_products
                .windows(2)
                .all(|pair| pair[0].revenue >= pair[1].revenue)
        );
    }
}
