use std::time::Duration;

use serde_json::{json, Value};

use super::*;

fn poller(target_sizes: &[&str]) -> CatalogPoller {
    let store = MonitoredStore::new(
        "Test Shop",
        "https://shop.example.com/collections/all",
        Duration::from_secs(3),
    )
    .with_target_sizes(target_sizes.iter().map(|s| (*s).to_string()).collect());
    CatalogPoller::new(store, CatalogOptions::default()).expect("valid store url")
}

/// Product 42 with one variant per `(variant_id, size, available)`.
fn product(variants: &[(u64, &str, bool)]) -> Value {
    let variants: Vec<Value> = variants
        .iter()
        .map(|(id, size, available)| {
            json!({
                "id": id,
                "title": size,
                "option1": size,
                "price": "190.00",
                "sku": format!("FV5029-{id}"),
                "available": available,
            })
        })
        .collect();
    json!({
        "id": 42,
        "title": "Air Jordan 4 Retro Bred Reimagined",
        "handle": "air-jordan-4-bred-reimagined",
        "vendor": "Jordan",
        "images": [{ "src": "https://cdn.example.com/aj4.jpg" }],
        "variants": variants,
    })
}

#[test]
fn first_sighting_is_new_product_with_all_variants() {
    let mut poller = poller(&[]);
    let detections = poller.process_products(vec![product(&[(1, "10", true), (2, "11", true)])]);

    assert_eq!(detections.len(), 1);
    let detection = &detections[0];
    assert_eq!(detection.kind, DetectionKind::NewProduct);
    assert_eq!(detection.platform, Platform::Catalog);
    assert_eq!(detection.added, vec!["1".to_string(), "2".to_string()]);

    let snapshot = &detection.snapshot;
    assert_eq!(snapshot.product_id, "42");
    assert_eq!(
        snapshot.url,
        "https://shop.example.com/products/air-jordan-4-bred-reimagined"
    );
    assert_eq!(snapshot.brand.as_deref(), Some("Jordan"));
    assert_eq!(snapshot.price, Some(190.0));
    assert_eq!(snapshot.sizes, vec!["10".to_string(), "11".to_string()]);
    assert_eq!(snapshot.variants["10"].variant_id, "1");
    assert_eq!(poller.store().counters.products_found(), 1);
}

#[test]
fn unchanged_availability_is_not_reported_twice() {
    let mut poller = poller(&[]);
    let payload = product(&[(1, "10", true)]);
    assert_eq!(poller.process_products(vec![payload.clone()]).len(), 1);
    assert!(poller.process_products(vec![payload]).is_empty());
    assert_eq!(poller.index().len(), 1);
}

#[test]
fn growing_variant_set_is_restock_of_only_the_new_variant() {
    let mut poller = poller(&[]);
    poller.process_products(vec![product(&[(1, "9", true), (2, "10", true), (3, "11", false)])]);

    let detections =
        poller.process_products(vec![product(&[(1, "9", true), (2, "10", true), (3, "11", true)])]);
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].kind, DetectionKind::Restock);
    assert_eq!(detections[0].added, vec!["3".to_string()]);

    assert!(poller
        .process_products(vec![product(&[(1, "9", true), (2, "10", true), (3, "11", true)])])
        .is_empty());
}

#[test]
fn selling_out_empties_the_index_without_a_detection() {
    let mut poller = poller(&[]);
    poller.process_products(vec![product(&[(1, "10", true)])]);

    let detections = poller.process_products(vec![product(&[(1, "10", false)])]);
    assert!(detections.is_empty());
    assert!(poller.index().available("42").is_some_and(BTreeSet::is_empty));

    let detections = poller.process_products(vec![product(&[(1, "10", true)])]);
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].kind, DetectionKind::Restock);
}

#[test]
fn never_seen_sold_out_product_leaves_no_trace() {
    let mut poller = poller(&[]);
    assert!(poller.process_products(vec![product(&[(1, "10", false)])]).is_empty());
    assert!(poller.index().is_empty());
}

#[test]
fn target_sizes_filter_the_size_list() {
    let mut poller = poller(&["10", "10.5"]);
    let detections =
        poller.process_products(vec![product(&[(1, "9", true), (2, "10", true), (3, "11", true)])]);
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].snapshot.sizes, vec!["10".to_string()]);
    assert_eq!(detections[0].added, vec!["2".to_string()]);
}

#[test]
fn product_without_target_sizes_is_dropped_entirely() {
    let mut poller = poller(&["10", "10.5"]);
    let detections =
        poller.process_products(vec![product(&[(1, "9", true), (3, "11", true)])]);
    assert!(detections.is_empty());
    assert!(poller.index().is_empty());
}

#[test]
fn losing_every_target_size_counts_as_sold_out() {
    let mut poller = poller(&["10"]);
    poller.process_products(vec![product(&[(1, "9", true), (2, "10", true)])]);

    let detections = poller.process_products(vec![product(&[(1, "9", true), (2, "10", false)])]);
    assert!(detections.is_empty());
    assert!(poller.index().available("42").is_some_and(BTreeSet::is_empty));

    let detections = poller.process_products(vec![product(&[(1, "9", true), (2, "10", true)])]);
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].kind, DetectionKind::Restock);
    assert_eq!(detections[0].added, vec!["2".to_string()]);
}

#[test]
fn target_sizes_are_normalized_before_filtering() {
    let mut poller = poller(&["US 10"]);
    let detections = poller.process_products(vec![product(&[(1, "Mens 10", true)])]);
    assert_eq!(detections[0].snapshot.sizes, vec!["10".to_string()]);
}

#[test]
fn malformed_record_does_not_abort_the_page() {
    let mut poller = poller(&[]);
    let detections = poller.process_products(vec![
        json!({ "id": "not-a-number", "title": 7 }),
        product(&[(1, "10", true)]),
    ]);
    assert_eq!(detections.len(), 1);
}
