//! Per-store inventory-state index used for new/restock classification.

use std::collections::{BTreeSet, HashMap};

use dropwatch_core::ProductSnapshot;

/// How an observation compares with what the index already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The product id has never been recorded.
    New,
    /// Previously recorded; these availability keys were not in the last set.
    Restock(Vec<String>),
    /// Nothing new became available.
    Unchanged,
}

/// Last known snapshot and available-key set per product.
///
/// Keys are variant ids for catalog stores and size labels for retail sites.
/// Every product id in the snapshot map has an entry in the key-set map,
/// possibly empty.
#[derive(Debug, Default, Clone)]
pub struct InventoryIndex {
    snapshots: HashMap<String, ProductSnapshot>,
    available: HashMap<String, BTreeSet<String>>,
}

impl InventoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.snapshots.contains_key(product_id)
    }

    #[must_use]
    pub fn snapshot(&self, product_id: &str) -> Option<&ProductSnapshot> {
        self.snapshots.get(product_id)
    }

    #[must_use]
    pub fn available(&self, product_id: &str) -> Option<&BTreeSet<String>> {
        self.available.get(product_id)
    }

    /// Compares `current` availability keys with the recorded set.
    #[must_use]
    pub fn classify(&self, product_id: &str, current: &BTreeSet<String>) -> Classification {
        if !self.contains(product_id) {
            return Classification::New;
        }
        let added: Vec<String> = match self.available.get(product_id) {
            Some(previous) => current.difference(previous).cloned().collect(),
            None => current.iter().cloned().collect(),
        };
        if added.is_empty() {
            Classification::Unchanged
        } else {
            Classification::Restock(added)
        }
    }

    /// Replaces both entries for `product_id`.
    pub fn record(&mut self, product_id: &str, snapshot: ProductSnapshot, keys: BTreeSet<String>) {
        self.snapshots.insert(product_id.to_owned(), snapshot);
        self.available.insert(product_id.to_owned(), keys);
    }

    /// Empties the availability set of a known product so its return is seen
    /// as a restock. Unknown products are ignored.
    pub fn mark_unavailable(&mut self, product_id: &str) {
        if self.contains(product_id) {
            self.available.insert(product_id.to_owned(), BTreeSet::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn snapshot(id: &str) -> ProductSnapshot {
        ProductSnapshot {
            product_id: id.to_string(),
            url: format!("https://shop.example.com/products/{id}"),
            title: "Jordan 4 Retro".to_string(),
            brand: None,
            sku: None,
            style_code: None,
            price: None,
            image_url: None,
            available: true,
            sizes: Vec::new(),
            variants: BTreeMap::new(),
        }
    }

    fn keys(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn unseen_product_is_new() {
        let index = InventoryIndex::new();
        assert_eq!(index.classify("p1", &keys(&["a"])), Classification::New);
    }

    #[test]
    fn growth_is_restock_with_only_added_keys() {
        let mut index = InventoryIndex::new();
        index.record("p1", snapshot("p1"), keys(&["a", "b"]));
        assert_eq!(
            index.classify("p1", &keys(&["a", "b", "c"])),
            Classification::Restock(vec!["c".to_string()])
        );
        assert_eq!(index.classify("p1", &keys(&["a", "b"])), Classification::Unchanged);
        assert_eq!(index.classify("p1", &keys(&["a"])), Classification::Unchanged);
    }

    #[test]
    fn mark_unavailable_keeps_snapshot_and_empties_keys() {
        let mut index = InventoryIndex::new();
        index.record("p1", snapshot("p1"), keys(&["a", "b"]));
        index.mark_unavailable("p1");
        assert!(index.contains("p1"));
        assert_eq!(index.available("p1"), Some(&BTreeSet::new()));
        assert_eq!(
            index.classify("p1", &keys(&["a"])),
            Classification::Restock(vec!["a".to_string()])
        );
    }

    #[test]
    fn mark_unavailable_ignores_unknown_products() {
        let mut index = InventoryIndex::new();
        index.mark_unavailable("ghost");
        assert!(index.is_empty());
        assert!(index.available("ghost").is_none());
    }
}
