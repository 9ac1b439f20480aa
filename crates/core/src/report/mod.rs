//! Report aggregation over store data.
//!
//! Reports are pure functions of the orders and products the client already
//! holds; nothing here talks to the backend.

mod products;
mod sales;
mod window;

pub use products::{ProductPerformance, ProductReport, product_report};
pub use sales::{ProductSales, SalesReport, sales_report};
pub use window::{ParseWindowError, ReportWindow};

/// How many entries a top-N list holds.
pub const TOP_N: usize = 5;

/// Sort descending by `key` and keep the first [`TOP_N`].
///
/// The sort is stable, so ties keep their first-seen order.
fn top_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items.truncate(TOP_N);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_by_is_stable_and_truncates() {
        let items = vec![("a", 1), ("b", 3), ("c", 3), ("d", 2), ("e", 0), ("f", 3), ("g", 1)];
        let top = top_by(items, |(_, n)| *n);
        let names: Vec<_> = top.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["b", "c", "f", "d", "a"]);
    }
}
