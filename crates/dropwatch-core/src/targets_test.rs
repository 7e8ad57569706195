use super::*;

fn keywords(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| (*k).to_string()).collect()
}

fn panda() -> CuratedTarget {
    CuratedTarget::new(
        "Nike Dunk Low Panda",
        "Nike",
        keywords(&["dunk low panda", "panda dunk", "black white dunk", "dunk panda"]),
        keywords(&["-kids", "-gs"]),
        100.0,
        180.0,
        Priority::Medium,
    )
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[test]
fn title_without_positive_keyword_does_not_match() {
    assert_eq!(panda().match_title("Jordan 4 Retro Black Cat"), None);
}

#[test]
fn negative_keyword_rejects_even_with_positive_hits() {
    assert_eq!(panda().match_title("Nike Dunk Low Panda Kids"), None);
}

#[test]
fn negative_keyword_dash_prefix_is_ignored() {
    let mut target = panda();
    target.negative_keywords = keywords(&["kids"]);
    assert_eq!(target.match_title("dunk low panda KIDS"), None);
}

#[test]
fn single_hit_out_of_four_keywords_scores_half() {
    let confidence = panda().match_title("Nike Dunk Low Panda").unwrap();
    assert!((confidence - 0.5).abs() < f64::EPSILON);
}

#[test]
fn two_hits_out_of_four_keywords_scores_full() {
    let confidence = panda()
        .match_title("Nike Dunk Low Panda / Black White Dunk")
        .unwrap();
    assert!((confidence - 1.0).abs() < f64::EPSILON);
}

#[test]
fn large_keyword_list_raises_denominator() {
    let mut target = panda();
    target.positive_keywords = keywords(&["a1", "b2", "c3", "d4", "e5", "f6", "g7", "h8"]);
    // denominator is max(2, 8 * 0.5) = 4
    let confidence = target.match_title("a1 b2 c3").unwrap();
    assert!((confidence - 0.75).abs() < 1e-9);
}

#[test]
fn sku_and_style_code_boosts_are_capped() {
    let mut target = panda();
    target.sku = Some("DD1391-100".to_string());
    let with_sku = target.match_title("Dunk Low Panda dd1391-100").unwrap();
    assert!((with_sku - 0.8).abs() < 1e-9);

    target.style_code = Some("DD1391".to_string());
    let with_both = target.match_title("Dunk Low Panda DD1391-100").unwrap();
    assert!((with_both - 1.0).abs() < f64::EPSILON);
}

#[test]
fn confidence_is_always_within_unit_interval() {
    let registry = TargetRegistry::with_builtin();
    let titles = [
        "Off-White x Nike Dunk Low Pine Green off white dunk virgil dunk",
        "Jordan 1 Chicago aj1 chicago chicago 1s chicago lost found",
        "nb550 nb 550 new balance 550 550 white grey",
        "plain tee",
        "",
    ];
    for title in titles {
        for m in registry.match_title(title) {
            assert!((0.0..=1.0).contains(&m.confidence), "{title}: {}", m.confidence);
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn add_generates_slug_ids_and_uniquifies() {
    let mut registry = TargetRegistry::new();
    let first = registry.add(panda());
    let second = registry.add(panda());
    let third = registry.add(panda());
    assert_eq!(first, "nike_dunk_low_panda");
    assert_eq!(second, "nike_dunk_low_panda_1");
    assert_eq!(third, "nike_dunk_low_panda_2");
    assert_eq!(registry.get(&second).map(|t| t.id.as_str()), Some(second.as_str()));
}

#[test]
fn slug_id_truncates_long_names() {
    let id = slug_id(&"x".repeat(80));
    assert_eq!(id.len(), 50);
}

#[test]
fn match_title_orders_by_confidence_then_insertion() {
    let mut registry = TargetRegistry::new();
    let mut weak = panda();
    weak.name = "Weak".to_string();
    weak.positive_keywords = keywords(&["dunk"]);
    let mut strong = panda();
    strong.name = "Strong".to_string();
    let mut tied = weak.clone();
    tied.name = "Tied".to_string();

    registry.add(weak);
    registry.add(strong);
    registry.add(tied);

    let matches = registry.match_title("dunk low panda");
    let names: Vec<&str> = matches.iter().map(|m| m.target.name.as_str()).collect();
    // every target scores 0.5; insertion order breaks the tie
    assert_eq!(names, vec!["Weak", "Strong", "Tied"]);

    let matches = registry.match_title("dunk low panda / panda dunk");
    assert_eq!(matches[0].target.name, "Strong");
}

#[test]
fn disabled_targets_are_not_matched() {
    let mut registry = TargetRegistry::new();
    let id = registry.add(panda());
    registry.set_enabled(&id, false).unwrap();
    assert!(registry.match_title("Dunk Low Panda").is_empty());
    assert_eq!(registry.stats().enabled, 0);
    assert_eq!(registry.len(), 1);
}

#[test]
fn lookups_by_brand_and_priority() {
    let registry = TargetRegistry::with_builtin();
    assert_eq!(registry.by_brand("JORDAN").len(), 6);
    assert_eq!(registry.by_brand("new balance").len(), 1);
    assert_eq!(registry.high_priority().len(), 5);
    assert_eq!(registry.by_priority(Priority::Low).len(), 0);
    assert_eq!(registry.profitable(500.0).len(), 3);
}

#[test]
fn set_market_price_recomputes_profit() {
    let mut registry = TargetRegistry::new();
    let id = registry.add(panda());
    registry.set_market_price(&id, 250.0).unwrap();
    let target = registry.get(&id).unwrap();
    assert!((target.profit - 150.0).abs() < f64::EPSILON);
    assert!((target.profit_ratio - 2.5).abs() < f64::EPSILON);
}

#[test]
fn unknown_target_is_an_error() {
    let mut registry = TargetRegistry::new();
    assert!(matches!(
        registry.set_enabled("nope", true),
        Err(CoreError::UnknownTarget(ref id)) if id == "nope"
    ));
}

#[test]
fn combined_search_joins_enabled_search_strings() {
    let mut registry = TargetRegistry::new();
    let mut a = panda();
    a.search_string = "panda".to_string();
    let mut b = panda();
    b.search_string = "bred".to_string();
    let mut c = panda();
    c.search_string = "onyx".to_string();
    registry.add(a);
    let b_id = registry.add(b);
    registry.add(c);
    registry.set_enabled(&b_id, false).unwrap();
    assert_eq!(registry.combined_search(), "panda | onyx");
}

#[test]
fn missing_search_string_is_built_from_keywords() {
    let mut registry = TargetRegistry::new();
    let id = registry.add(panda());
    assert_eq!(
        registry.get(&id).unwrap().search_string,
        "dunk low panda panda dunk black white dunk dunk panda -kids -gs"
    );
}

#[test]
fn search_keywords_dedupes_and_caps() {
    let registry = TargetRegistry::with_builtin();
    let keywords = registry.search_keywords();
    assert_eq!(keywords.len(), 20);
    assert_eq!(keywords[0], "ow dunk pine green");
    let mut unique = keywords.clone();
    unique.dedup();
    assert_eq!(unique.len(), keywords.len());
}

#[test]
fn stats_counts_profitable_and_brands() {
    let registry = TargetRegistry::with_builtin();
    let stats = registry.stats();
    assert_eq!(stats.total, 10);
    assert_eq!(stats.enabled, 10);
    assert_eq!(stats.high_priority, 5);
    assert_eq!(stats.profitable, 10);
    assert_eq!(stats.by_brand.get("nike"), Some(&2));
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

#[test]
fn import_accepts_legacy_document_shape() {
    let json = r#"{
        "generated_at": "2024-01-01T12:00:00",
        "total_products": 1,
        "keywords_by_shoe": [{
            "name": "Jordan 3 White Cement",
            "brand": "jordan",
            "positive_keywords": ["jordan 3 white cement", "aj3 cement"],
            "negative_keywords": ["-gs"],
            "optimized_search": "jordan 3 white cement -gs",
            "retail_price": 210,
            "current_price": 0,
            "profit_dollar": 90,
            "profit_ratio": 1.4,
            "priority": "high",
            "sku": "DN3707-100",
            "enabled": true
        }]
    }"#;
    let document: TargetsDocument = serde_json::from_str(json).unwrap();
    let mut registry = TargetRegistry::new();
    assert_eq!(registry.load_document(document), 1);

    let target = registry.get("jordan_3_white_cement").unwrap();
    assert_eq!(target.search_string, "jordan 3 white cement -gs");
    assert!((target.profit - 90.0).abs() < f64::EPSILON);
    assert_eq!(target.priority, Priority::High);
    assert_eq!(target.source, "imported");

    let m = registry.best_match("Air Jordan 3 White Cement DN3707-100").unwrap();
    assert!((m.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn export_and_reload_preserves_targets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("targets.json");

    let registry = TargetRegistry::with_builtin();
    registry.export_to_path(&path).unwrap();

    let mut reloaded = TargetRegistry::new();
    let count = reloaded.load_from_path(&path).unwrap();
    assert_eq!(count, 10);
    assert_eq!(reloaded.stats(), registry.stats());
    assert_eq!(
        reloaded.get("nike_dunk_low_panda").map(|t| t.source.as_str()),
        Some("builtin")
    );
}

#[test]
fn load_from_missing_file_is_io_error() {
    let mut registry = TargetRegistry::new();
    let result = registry.load_from_path(Path::new("/nonexistent/targets.json"));
    assert!(matches!(result, Err(CoreError::TargetsFileIo { .. })));
}

#[test]
fn priority_parses_case_insensitively() {
    assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
    assert!("urgent".parse::<Priority>().is_err());
    assert!(Priority::Low < Priority::Medium && Priority::Medium < Priority::High);
}
