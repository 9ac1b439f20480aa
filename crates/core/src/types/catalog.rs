//! Product categories and their subcategories.
//!
//! The category set is closed; the subcategory table is a static lookup keyed
//! by [`Category`], so an unknown category cannot reach the validator.

use serde::{Deserialize, Serialize};

/// Error returned when a category key is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

/// Top-level product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Jewelry,
    HomeDecor,
    Clothing,
    Art,
    Pottery,
    Accessories,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Jewelry,
        Self::HomeDecor,
        Self::Clothing,
        Self::Art,
        Self::Pottery,
        Self::Accessories,
    ];

    /// The wire key (camelCase).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Jewelry => "jewelry",
            Self::HomeDecor => "homeDecor",
            Self::Clothing => "clothing",
            Self::Art => "art",
            Self::Pottery => "pottery",
            Self::Accessories => "accessories",
        }
    }

    /// Human-readable label for menus.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Jewelry => "Jewelry",
            Self::HomeDecor => "Home Decor",
            Self::Clothing => "Clothing",
            Self::Art => "Art",
            Self::Pottery => "Pottery",
            Self::Accessories => "Accessories",
        }
    }

    /// Subcategory keys allowed under this category.
    #[must_use]
    pub const fn subcategories(&self) -> &'static [&'static str] {
        match self {
            Self::Jewelry => &["necklaces", "earrings", "bracelets", "rings"],
            Self::HomeDecor => &["wallHangings", "candles", "cushions", "lamps"],
            Self::Clothing => &["sarees", "kurtas", "scarves", "shawls"],
            Self::Art => &["paintings", "sketches", "prints", "sculptures"],
            Self::Pottery => &["vases", "planters", "tableware"],
            Self::Accessories => &["bags", "wallets", "keychains"],
        }
    }

    /// Whether `subcategory` belongs to this category.
    #[must_use]
    pub fn accepts(&self, subcategory: &str) -> bool {
        self.subcategories().contains(&subcategory)
    }

    /// Subcategory table lookup by category key.
    ///
    /// Returns `None` when `key` is not a category. Shaped to plug into a
    /// dependent-select rule.
    #[must_use]
    pub fn subcategories_for(key: &str) -> Option<&'static [&'static str]> {
        key.parse::<Self>().ok().map(|category| category.subcategories())
    }

    /// All category keys, in menu order.
    #[must_use]
    pub fn keys() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_owned()))
    }
}
