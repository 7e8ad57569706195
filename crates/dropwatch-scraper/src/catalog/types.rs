//! Wire types for the public `products.json` catalog feed.
//!
//! A page is first read as a list of raw JSON values so one malformed product
//! can be skipped without losing the rest of the page. Each value is then
//! decoded into [`CatalogProduct`] on its own.
//!
//! Observed quirks:
//! - `price` is a decimal string on most stores (`"110.00"`) and a number on
//!   a few; both are accepted.
//! - `available` is missing on some older themes. Missing means unavailable.
//! - `inventory_quantity` is only present when the store exposes stock.

use serde::{Deserialize, Deserializer};

/// One `GET /products.json?page=N` response.
#[derive(Debug, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub products: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    pub id: u64,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub images: Vec<CatalogImage>,
    #[serde(default)]
    pub variants: Vec<CatalogVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogImage {
    pub src: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogVariant {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,
    #[serde(default, deserialize_with = "price_from_string_or_number")]
    pub price: Option<f64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

impl CatalogVariant {
    #[must_use]
    pub fn options(&self) -> [Option<&str>; 3] {
        [
            self.option1.as_deref(),
            self.option2.as_deref(),
            self.option3.as_deref(),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(f64),
}

fn price_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<RawPrice>::deserialize(deserializer)?.and_then(|raw| match raw {
            RawPrice::Text(s) => s.trim().parse::<f64>().ok(),
            RawPrice::Number(n) => Some(n),
        }),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn price_accepts_string_and_number() {
        let variant: CatalogVariant = serde_json::from_value(json!({
            "id": 1, "title": "10", "price": "110.00", "available": true
        }))
        .unwrap();
        assert_eq!(variant.price, Some(110.0));

        let variant: CatalogVariant =
            serde_json::from_value(json!({ "id": 2, "price": 95.5 })).unwrap();
        assert_eq!(variant.price, Some(95.5));
        assert!(!variant.available);
    }

    #[test]
    fn unparseable_or_null_price_is_none() {
        let variant: CatalogVariant =
            serde_json::from_value(json!({ "id": 3, "price": "call us" })).unwrap();
        assert_eq!(variant.price, None);
        let variant: CatalogVariant =
            serde_json::from_value(json!({ "id": 4, "price": null })).unwrap();
        assert_eq!(variant.price, None);
    }

    #[test]
    fn page_keeps_malformed_products_as_raw_values() {
        let page: CatalogPage = serde_json::from_value(json!({
            "products": [{ "id": 1, "title": "Dunk", "handle": "dunk" }, { "oops": true }]
        }))
        .unwrap();
        assert_eq!(page.products.len(), 2);
        assert!(serde_json::from_value::<CatalogProduct>(page.products[1].clone()).is_err());
    }
}
