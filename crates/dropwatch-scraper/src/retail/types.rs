//! Wire types for the retail family's keyword search API.
//!
//! Only in-stock sellable units carry a meaningful size; units with any other
//! `stockLevelStatus` are ignored. The primary image is the one tagged
//! `imageType: "PRIMARY"`.

use serde::Deserialize;

pub const IN_STOCK: &str = "inStock";
pub const PRIMARY_IMAGE: &str = "PRIMARY";

#[derive(Debug, Deserialize)]
pub struct RetailSearchPage {
    #[serde(default)]
    pub products: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailProduct {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub style_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: Option<RetailBrand>,
    #[serde(default)]
    pub price: Option<RetailPrice>,
    #[serde(default)]
    pub images: Vec<RetailImage>,
    #[serde(default)]
    pub sellable_units: Vec<SellableUnit>,
}

impl RetailProduct {
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|i| i.image_type.as_deref() == Some(PRIMARY_IMAGE))
            .map(|i| i.url.as_str())
    }

    /// Size labels and unit codes of every in-stock unit, in feed order.
    pub fn in_stock_units(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sellable_units
            .iter()
            .filter(|u| u.stock_level_status.as_deref() == Some(IN_STOCK))
            .filter_map(|u| {
                let size = u.attributes.size.as_deref()?.trim();
                (!size.is_empty()).then_some((size, u.code.as_str()))
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailBrand {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailPrice {
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailImage {
    #[serde(default)]
    pub image_type: Option<String>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellableUnit {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub stock_level_status: Option<String>,
    #[serde(default)]
    pub attributes: UnitAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitAttributes {
    #[serde(default)]
    pub size: Option<String>,
}
