use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One observation of a product at poll time, normalized across both
/// storefront families.
///
/// Snapshots are never edited after construction; a later change produces a
/// fresh snapshot that replaces this one in the poller's index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Platform product id (catalog numeric id or retail SKU), as a string.
    pub product_id: String,
    /// Canonical storefront URL for the product page.
    pub url: String,
    pub title: String,
    pub brand: Option<String>,
    pub sku: Option<String>,
    /// Retail style code, when the platform exposes one.
    pub style_code: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub available: bool,
    /// Normalized size labels currently purchasable, in feed order.
    pub sizes: Vec<String>,
    /// Size label to variant detail.
    pub variants: BTreeMap<String, VariantDetail>,
}

impl ProductSnapshot {
    /// Returns `true` if the normalized size `label` is currently purchasable.
    #[must_use]
    pub fn has_size(&self, label: &str) -> bool {
        self.sizes.iter().any(|s| s == label)
    }
}

/// A single purchasable unit behind one size label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDetail {
    /// Catalog variant id or retail sellable-unit code.
    pub variant_id: String,
    pub price: Option<f64>,
    pub sku: Option<String>,
    /// Stock count when the platform reports one.
    pub inventory: Option<i64>,
}
