//! Seller portfolio showcase.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ParseStatusError, PortfolioItemId, UserId};
use crate::validation::{FieldValue, FormValues, LocalePatterns, RuleSet, Validate, rule_sets};

/// The collection a portfolio item is showcased in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PortfolioCategory {
    #[default]
    TopRated,
    BestSelling,
    SpecialCollection,
}

impl PortfolioCategory {
    pub const ALL: [Self; 3] = [Self::TopRated, Self::BestSelling, Self::SpecialCollection];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TopRated => "topRated",
            Self::BestSelling => "bestSelling",
            Self::SpecialCollection => "specialCollection",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TopRated => "Top rated",
            Self::BestSelling => "Best selling",
            Self::SpecialCollection => "Special collection",
        }
    }
}

impl std::fmt::Display for PortfolioCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PortfolioCategory {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ParseStatusError::new("portfolio category", s))
    }
}

/// A showcased piece of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: PortfolioItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<UserId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub rating: Decimal,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub sold: u32,
    #[serde(default)]
    pub category: PortfolioCategory,
    #[serde(default)]
    pub craft_type: String,
    #[serde(default)]
    pub materials: Vec<String>,
}

impl PortfolioItem {
    #[must_use]
    pub fn to_draft(&self) -> PortfolioDraft {
        PortfolioDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            image: self.image.clone(),
            rating: self.rating,
            reviews: self.reviews,
            sold: self.sold,
            category: self.category,
            craft_type: self.craft_type.clone(),
            materials: self.materials.clone(),
        }
    }
}

/// The body of a create or update portfolio request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDraft {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub rating: Decimal,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub sold: u32,
    pub category: PortfolioCategory,
    pub craft_type: String,
    pub materials: Vec<String>,
}

impl PortfolioDraft {
    /// Split a comma-separated materials field, trimming each entry.
    ///
    /// Blank entries are kept so validation can point them out.
    #[must_use]
    pub fn parse_materials(raw: &str) -> Vec<String> {
        if raw.trim().is_empty() {
            return Vec::new();
        }
        raw.split(',').map(|entry| entry.trim().to_owned()).collect()
    }
}

impl Validate for PortfolioDraft {
    fn to_form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("price", self.price)
            .with("image", self.image.as_str())
            .with("rating", self.rating)
            .with("reviews", self.reviews)
            .with("sold", self.sold)
            .with("category", self.category.as_str())
            .with("craftType", self.craft_type.as_str())
            .with("materials", FieldValue::List(self.materials.clone()))
    }

    fn rule_set(_patterns: &LocalePatterns) -> RuleSet {
        rule_sets::portfolio()
    }
}

/// A partial portfolio edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub category: Option<PortfolioCategory>,
    pub craft_type: Option<String>,
    pub materials: Option<Vec<String>>,
}

impl PortfolioPatch {
    pub fn apply(self, draft: &mut PortfolioDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(image) = self.image {
            draft.image = image;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(craft_type) = self.craft_type {
            draft.craft_type = craft_type;
        }
        if let Some(materials) = self.materials {
            draft.materials = materials;
        }
    }
}
