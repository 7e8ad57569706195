use std::time::Duration;

use dropwatch_core::SiteDirectory;
use serde_json::{json, Value};

use super::*;

fn champs() -> Site {
    SiteDirectory::builtin()
        .get("champs")
        .cloned()
        .expect("champs is a builtin site")
}

fn poller(target_sizes: &[&str]) -> RetailPoller {
    let site = champs();
    let store = MonitoredStore::new(&site.name, &site.base_url, Duration::from_secs(5))
        .with_target_sizes(target_sizes.iter().map(|s| (*s).to_string()).collect());
    RetailPoller::new(site, store, KeywordList::default(), RetailOptions::default())
        .expect("retail site")
}

fn product(sku: &str, in_stock: &[&str]) -> Value {
    let units: Vec<Value> = in_stock
        .iter()
        .enumerate()
        .map(|(i, size)| {
            json!({
                "code": format!("{sku}-{i}"),
                "stockLevelStatus": "inStock",
                "attributes": { "size": size },
            })
        })
        .collect();
    json!({
        "sku": sku,
        "styleId": "FV5029-006",
        "name": "Jordan Retro 4 Bred Reimagined",
        "brand": { "name": "Jordan" },
        "price": { "value": 215.0 },
        "images": [{ "imageType": "PRIMARY", "url": "https://img.example.com/aj4.jpg" }],
        "sellableUnits": units,
    })
}

#[test]
fn rejects_catalog_sites() {
    let site = SiteDirectory::builtin().get("kith").cloned().unwrap();
    let store = MonitoredStore::new(&site.name, &site.base_url, Duration::from_secs(5));
    let result = RetailPoller::new(site, store, KeywordList::default(), RetailOptions::default());
    assert!(matches!(result, Err(ScraperError::UnknownSite(_))));
}

#[test]
fn first_sighting_builds_a_full_snapshot() {
    let mut poller = poller(&[]);
    let detections = poller.process_products(vec![product("FV5029006", &["10.0", "M 10.5"])]);

    assert_eq!(detections.len(), 1);
    let detection = &detections[0];
    assert_eq!(detection.kind, DetectionKind::NewProduct);
    assert_eq!(detection.platform, Platform::RetailApi);
    assert_eq!(detection.added, vec!["10.0".to_string(), "10.5".to_string()]);

    let snapshot = &detection.snapshot;
    assert_eq!(
        snapshot.url,
        "https://www.champssports.com/product/~/FV5029006.html"
    );
    assert_eq!(snapshot.sku.as_deref(), Some("FV5029006"));
    assert_eq!(snapshot.style_code.as_deref(), Some("FV5029-006"));
    assert_eq!(snapshot.brand.as_deref(), Some("Jordan"));
    assert_eq!(snapshot.price, Some(215.0));
    assert_eq!(snapshot.image_url.as_deref(), Some("https://img.example.com/aj4.jpg"));
    assert_eq!(snapshot.variants["10.5"].variant_id, "FV5029006-1");
}

#[test]
fn size_set_growth_is_a_restock() {
    let mut poller = poller(&[]);
    poller.process_products(vec![product("A1", &["9", "10"])]);

    let detections = poller.process_products(vec![product("A1", &["9", "10", "11"])]);
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].kind, DetectionKind::Restock);
    assert_eq!(detections[0].added, vec!["11".to_string()]);

    assert!(poller.process_products(vec![product("A1", &["9", "10", "11"])]).is_empty());
    assert!(poller.process_products(vec![product("A1", &["9"])]).is_empty());
}

#[test]
fn same_product_from_two_keywords_is_reported_once() {
    let mut poller = poller(&[]);
    assert_eq!(poller.process_products(vec![product("A1", &["9"])]).len(), 1);
    assert!(poller.process_products(vec![product("A1", &["9"])]).is_empty());
}

#[test]
fn losing_all_sizes_resets_the_index() {
    let mut poller = poller(&[]);
    poller.process_products(vec![product("A1", &["9", "10"])]);
    assert!(poller.process_products(vec![product("A1", &[])]).is_empty());
    assert!(poller.index().available("A1").is_some_and(BTreeSet::is_empty));

    let detections = poller.process_products(vec![product("A1", &["9"])]);
    assert_eq!(detections[0].kind, DetectionKind::Restock);
}

#[test]
fn target_sizes_filter_and_drop() {
    let mut poller = poller(&["10", "10.5"]);
    let detections = poller.process_products(vec![
        product("A1", &["9", "10", "11"]),
        product("B2", &["12"]),
    ]);
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].snapshot.sizes, vec!["10".to_string()]);
    assert!(!poller.index().contains("B2"));
}

#[test]
fn losing_every_target_size_counts_as_sold_out() {
    let mut poller = poller(&["10"]);
    poller.process_products(vec![product("A1", &["9", "10"])]);

    assert!(poller.process_products(vec![product("A1", &["9"])]).is_empty());
    assert!(poller.index().available("A1").is_some_and(BTreeSet::is_empty));

    let detections = poller.process_products(vec![product("A1", &["9", "10"])]);
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].kind, DetectionKind::Restock);
    assert_eq!(detections[0].added, vec!["10".to_string()]);
}

#[test]
fn records_without_sku_are_skipped() {
    let mut poller = poller(&[]);
    let mut missing = product("", &["10"]);
    missing["sku"] = json!("");
    assert!(poller.process_products(vec![missing, json!(42)]).is_empty());
    assert!(poller.index().is_empty());
}
