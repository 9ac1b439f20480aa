//! Products listed by sellers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Category, ProductId, UserId};
use crate::validation::{FormValues, LocalePatterns, RuleSet, Validate, rule_sets};

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub subcategory: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub total_stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<UserId>,
}

impl Product {
    /// The price a buyer pays: the sale price when one is set and nonzero.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price
            .filter(|sale| !sale.is_zero())
            .unwrap_or(self.price)
    }

    /// Whether any stock is left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.total_stock > 0
    }

    /// An editable copy of this product.
    #[must_use]
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            subcategory: self.subcategory.clone(),
            price: self.price,
            sale_price: self.sale_price,
            total_stock: self.total_stock,
            image: self.image.clone(),
        }
    }
}

/// The body of a create or update product request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub subcategory: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sale_price: Option<Decimal>,
    pub total_stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Validate for ProductDraft {
    fn to_form_values(&self) -> FormValues {
        FormValues::new()
            .with("title", self.title.as_str())
            .with("description", self.description.as_str())
            .with("category", self.category.as_str())
            .with("subcategory", self.subcategory.as_str())
            .with("price", self.price)
            .with_opt("salePrice", self.sale_price)
            .with("totalStock", self.total_stock)
            .with_opt("image", self.image.as_deref())
    }

    fn rule_set(_patterns: &LocalePatterns) -> RuleSet {
        rule_sets::product()
    }
}

/// A partial product edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub price: Option<Decimal>,
    /// A zero sale price removes the sale.
    pub sale_price: Option<Decimal>,
    pub total_stock: Option<u32>,
    pub image: Option<String>,
}

impl ProductPatch {
    /// Apply this patch on top of `draft`.
    pub fn apply(self, draft: &mut ProductDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(subcategory) = self.subcategory {
            draft.subcategory = subcategory;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(sale_price) = self.sale_price {
            draft.sale_price = Some(sale_price).filter(|sale| !sale.is_zero());
        }
        if let Some(total_stock) = self.total_stock {
            draft.total_stock = total_stock;
        }
        if let Some(image) = self.image {
            draft.image = Some(image);
        }
    }
}
