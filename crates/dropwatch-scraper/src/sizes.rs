//! Size-label recognition and normalization.
//!
//! Catalog feeds put sizes in variant option fields or titles with assorted
//! decorations (`"US 10"`, `"Size 10.5"`, `"10M"`, `"Mens 9"`). Retail feeds
//! carry a cleaner size attribute with an optional unit or gender prefix.
//! Both normalize to bare uppercase labels such as `"10.5"` or `"XL"` so they
//! compare equal to configured target sizes.

use std::sync::LazyLock;

use regex::Regex;

/// Letter sizes accepted as-is.
const LETTER_SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "XXL", "2XL", "3XL", "OS", "ONE SIZE"];

/// Smallest and largest numeric shoe sizes recognized.
const NUMERIC_RANGE: std::ops::RangeInclusive<f64> = 3.0..=18.0;

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.]").expect("valid regex"));

static CATALOG_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(US|SIZE|MENS?|WOMENS?)\s*").expect("valid regex"));

static TRAILING_GENDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*[MW]$").expect("valid regex"));

static RETAIL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:US|SIZE|M|W)\s*(\d.*)$").expect("valid regex"));

/// `true` if `value` reads as a shoe size in `[3, 18]` once non-numeric
/// characters are stripped, or is a known letter size.
#[must_use]
pub fn is_size(value: &str) -> bool {
    let value = value.trim().to_uppercase();
    if value.is_empty() {
        return false;
    }

    let digits = NON_NUMERIC.replace_all(&value, "");
    if digits
        .parse::<f64>()
        .is_ok_and(|n| NUMERIC_RANGE.contains(&n))
    {
        return true;
    }

    LETTER_SIZES.contains(&value.as_str())
}

/// Normalizes a catalog size label: uppercase, drop `US`/`SIZE`/gender
/// words, then drop a trailing `M` or `W` after a number (`"10.5W"` to
/// `"10.5"`). Bare letter sizes such as `"M"` are kept.
#[must_use]
pub fn normalize_catalog_size(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    let stripped = CATALOG_TOKENS.replace_all(&upper, "");
    let stripped = stripped.trim();
    match TRAILING_GENDER.captures(stripped) {
        Some(caps) => caps[1].to_string(),
        None => stripped.to_string(),
    }
}

/// Normalizes a retail size label by dropping a leading `US`, `SIZE`, `M`, or
/// `W` prefix that precedes a number (`"M 10"` to `"10"`).
#[must_use]
pub fn normalize_retail_size(value: &str) -> String {
    let trimmed = value.trim();
    match RETAIL_PREFIX.captures(trimmed) {
        Some(caps) => caps[1].trim().to_uppercase(),
        None => trimmed.to_uppercase(),
    }
}

/// Picks the size of a catalog variant: the first option field that looks
/// like a size, else the variant title.
#[must_use]
pub fn extract_variant_size(options: [Option<&str>; 3], title: &str) -> Option<String> {
    options
        .into_iter()
        .flatten()
        .chain(std::iter::once(title))
        .find(|value| is_size(value))
        .map(normalize_catalog_size)
}

/// Keeps the sizes present in `targets`, preserving `sizes` order. An empty
/// target list keeps everything.
#[must_use]
pub fn filter_to_targets(sizes: &[String], targets: &[String]) -> Vec<String> {
    if targets.is_empty() {
        return sizes.to_vec();
    }
    sizes
        .iter()
        .filter(|s| targets.contains(s))
        .cloned()
        .collect()
}
