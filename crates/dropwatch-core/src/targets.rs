//! Curated Target Registry: operator-defined products of interest and the
//! fuzzy title matcher that scores scraped titles against them.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Profit above which a target counts as profitable in [`RegistryStats`].
const PROFITABLE_MIN: f64 = 20.0;

/// Maximum length of a generated target id, before uniquifying suffixes.
const MAX_ID_LEN: usize = 50;

/// Default retail keyword list size produced by [`TargetRegistry::search_keywords`].
const MAX_SEARCH_KEYWORDS: usize = 20;

/// Importance tier of a target. Ordering is `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Numeric level used by the trigger policy: low 0, medium 1, high 2.
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{other}'; expected low, medium, or high")),
        }
    }
}

/// A watch target with matching rules and profitability metadata.
///
/// Field names follow the export document; the legacy names
/// `optimized_search`, `current_price`, and `profit_dollar` are accepted on
/// import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedTarget {
    /// Registry key. Assigned by [`TargetRegistry::add`]; ignored on import.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub positive_keywords: Vec<String>,
    /// Exclusion keywords. A leading `-` is allowed and ignored when matching.
    #[serde(default)]
    pub negative_keywords: Vec<String>,
    #[serde(default, alias = "optimized_search")]
    pub search_string: String,
    #[serde(default)]
    pub retail_price: f64,
    #[serde(default, alias = "current_price")]
    pub market_price: f64,
    #[serde(default, alias = "profit_dollar")]
    pub profit: f64,
    #[serde(default)]
    pub profit_ratio: f64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub style_code: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_enabled() -> bool {
    true
}

fn default_source() -> String {
    "imported".to_string()
}

impl CuratedTarget {
    /// Creates an enabled target with no SKU or style code. Profit and ratio
    /// are derived from the two prices.
    #[must_use]
    pub fn new(
        name: &str,
        brand: &str,
        positive_keywords: Vec<String>,
        negative_keywords: Vec<String>,
        retail_price: f64,
        market_price: f64,
        priority: Priority,
    ) -> Self {
        let mut target = Self {
            id: String::new(),
            name: name.to_string(),
            brand: brand.to_string(),
            positive_keywords,
            negative_keywords,
            search_string: String::new(),
            retail_price,
            market_price,
            profit: 0.0,
            profit_ratio: 0.0,
            priority,
            sku: None,
            style_code: None,
            enabled: true,
            source: "manual".to_string(),
        };
        target.recompute_profit();
        target
    }

    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.profit > PROFITABLE_MIN
    }

    /// Scores `title` against this target.
    ///
    /// Returns `None` when any negative keyword occurs in the title or when no
    /// positive keyword does. Otherwise the confidence is
    /// `min(1, matched / max(2, total / 2))`, plus 0.3 for a SKU hit and 0.3
    /// for a style-code hit, each capped at 1. All comparisons are
    /// case-insensitive substring checks.
    #[must_use]
    pub fn match_title(&self, title: &str) -> Option<f64> {
        let title = title.to_lowercase();

        let rejected = self
            .negative_keywords
            .iter()
            .map(|k| k.trim().trim_start_matches('-').to_lowercase())
            .filter(|k| !k.is_empty())
            .any(|k| title.contains(&k));
        if rejected {
            return None;
        }

        let total = self.positive_keywords.len();
        let matched = self
            .positive_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty() && title.contains(k.as_str()))
            .count();
        if matched == 0 {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let denominator = (total as f64 * 0.5).max(2.0);
        #[allow(clippy::cast_precision_loss)]
        let mut confidence = (matched as f64 / denominator).min(1.0);

        let code_hit = |code: Option<&str>| {
            code.map(str::trim)
                .is_some_and(|c| !c.is_empty() && title.contains(&c.to_lowercase()))
        };
        if code_hit(self.sku.as_deref()) {
            confidence = (confidence + 0.3).min(1.0);
        }
        if code_hit(self.style_code.as_deref()) {
            confidence = (confidence + 0.3).min(1.0);
        }

        Some(confidence)
    }

    /// Re-derives profit and ratio from the prices. Leaves imported values
    /// alone when no market price is known.
    fn recompute_profit(&mut self) {
        if self.market_price <= 0.0 {
            return;
        }
        self.profit = self.market_price - self.retail_price;
        self.profit_ratio = if self.retail_price > 0.0 {
            (self.market_price / self.retail_price * 100.0).round() / 100.0
        } else {
            0.0
        };
    }

    /// Builds the search string from keywords when none was provided.
    fn ensure_search_string(&mut self) {
        if !self.search_string.trim().is_empty() {
            return;
        }
        let negatives = self
            .negative_keywords
            .iter()
            .map(|k| format!("-{}", k.trim().trim_start_matches('-')));
        self.search_string = self
            .positive_keywords
            .iter()
            .cloned()
            .chain(negatives)
            .collect::<Vec<_>>()
            .join(" ");
    }
}

/// One scored match of a title against a registered target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetMatch {
    pub target_id: String,
    pub target: CuratedTarget,
    pub confidence: f64,
}

/// Import/export document for the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsDocument {
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default, alias = "total_products")]
    pub total_targets: usize,
    #[serde(default, alias = "keywords_by_shoe")]
    pub targets: Vec<CuratedTarget>,
}

/// Summary counts over the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total: usize,
    pub enabled: usize,
    pub high_priority: usize,
    pub profitable: usize,
    pub by_brand: BTreeMap<String, usize>,
}

/// Keyed store of [`CuratedTarget`]s with brand and priority indexes.
///
/// Iteration order is insertion order; match ties keep that order.
#[derive(Debug, Default, Clone)]
pub struct TargetRegistry {
    targets: Vec<CuratedTarget>,
    index: HashMap<String, usize>,
    by_brand: HashMap<String, Vec<usize>>,
    by_priority: HashMap<Priority, Vec<usize>>,
}

impl TargetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding only the built-in seed targets.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.load_builtin();
        registry
    }

    /// Adds the built-in seed targets and returns how many were added.
    pub fn load_builtin(&mut self) -> usize {
        let seeds = crate::seed::builtin_targets();
        let count = seeds.len();
        for target in seeds {
            self.add(target);
        }
        tracing::info!(count, "built-in curated targets loaded");
        count
    }

    /// Registers `target` and returns its id.
    ///
    /// The id is a slug of the name (lowercase, spaces and hyphens become `_`,
    /// truncated to 50 characters), suffixed `_1`, `_2`, ... on collision.
    pub fn add(&mut self, mut target: CuratedTarget) -> String {
        let base = slug_id(&target.name);
        let mut id = base.clone();
        let mut counter = 1;
        while self.index.contains_key(&id) {
            id = format!("{base}_{counter}");
            counter += 1;
        }

        target.id.clone_from(&id);
        target.recompute_profit();
        target.ensure_search_string();

        let position = self.targets.len();
        self.by_brand
            .entry(target.brand.to_lowercase())
            .or_default()
            .push(position);
        self.by_priority
            .entry(target.priority)
            .or_default()
            .push(position);
        self.index.insert(id.clone(), position);
        self.targets.push(target);
        id
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CuratedTarget> {
        self.index.get(id).map(|&i| &self.targets[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CuratedTarget> {
        self.targets.iter()
    }

    /// Targets whose brand equals `brand`, ignoring case.
    #[must_use]
    pub fn by_brand(&self, brand: &str) -> Vec<&CuratedTarget> {
        self.collect_indexed(self.by_brand.get(&brand.to_lowercase()))
    }

    #[must_use]
    pub fn by_priority(&self, priority: Priority) -> Vec<&CuratedTarget> {
        self.collect_indexed(self.by_priority.get(&priority))
    }

    #[must_use]
    pub fn high_priority(&self) -> Vec<&CuratedTarget> {
        self.by_priority(Priority::High)
    }

    #[must_use]
    pub fn enabled(&self) -> Vec<&CuratedTarget> {
        self.targets.iter().filter(|t| t.enabled).collect()
    }

    /// Targets whose profit is at least `min_profit`.
    #[must_use]
    pub fn profitable(&self, min_profit: f64) -> Vec<&CuratedTarget> {
        self.targets
            .iter()
            .filter(|t| t.profit >= min_profit)
            .collect()
    }

    /// Scores `title` against every enabled target, best match first.
    #[must_use]
    pub fn match_title(&self, title: &str) -> Vec<TargetMatch> {
        let mut matches: Vec<TargetMatch> = self
            .targets
            .iter()
            .filter(|t| t.enabled)
            .filter_map(|t| {
                t.match_title(title).map(|confidence| TargetMatch {
                    target_id: t.id.clone(),
                    target: t.clone(),
                    confidence,
                })
            })
            .collect();
        // sort_by is stable, so equal scores stay in insertion order
        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        matches
    }

    #[must_use]
    pub fn best_match(&self, title: &str) -> Option<TargetMatch> {
        self.match_title(title).into_iter().next()
    }

    /// All enabled search strings joined by `" | "`.
    #[must_use]
    pub fn combined_search(&self) -> String {
        self.targets
            .iter()
            .filter(|t| t.enabled)
            .map(|t| t.search_string.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Short keyword list for search-driven pollers: the first three positive
    /// keywords of each enabled target, de-duplicated, at most 20.
    #[must_use]
    pub fn search_keywords(&self) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for target in self.targets.iter().filter(|t| t.enabled) {
            for keyword in target.positive_keywords.iter().take(3) {
                let keyword = keyword.trim().to_lowercase();
                if !keyword.is_empty() && !keywords.contains(&keyword) {
                    keywords.push(keyword);
                }
            }
        }
        keywords.truncate(MAX_SEARCH_KEYWORDS);
        keywords
    }

    /// Updates the market price of a target and re-derives its profit.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownTarget`] if `id` is not registered.
    pub fn set_market_price(&mut self, id: &str, market_price: f64) -> Result<(), CoreError> {
        let target = self.get_mut(id)?;
        target.market_price = market_price;
        target.recompute_profit();
        Ok(())
    }

    /// Enables or disables a target. Targets are never removed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownTarget`] if `id` is not registered.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), CoreError> {
        self.get_mut(id)?.enabled = enabled;
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let by_brand = self
            .by_brand
            .iter()
            .map(|(brand, ids)| (brand.clone(), ids.len()))
            .collect();
        RegistryStats {
            total: self.targets.len(),
            enabled: self.targets.iter().filter(|t| t.enabled).count(),
            high_priority: self.high_priority().len(),
            profitable: self.targets.iter().filter(|t| t.is_profitable()).count(),
            by_brand,
        }
    }

    /// Adds every target in `document` and returns how many were added.
    pub fn load_document(&mut self, document: TargetsDocument) -> usize {
        let count = document.targets.len();
        for target in document.targets {
            self.add(target);
        }
        count
    }

    /// Reads a JSON targets document from `path` and adds its targets.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TargetsFileIo`] if the file cannot be read or
    /// [`CoreError::TargetsParse`] if it is not a valid document.
    pub fn load_from_path(&mut self, path: &Path) -> Result<usize, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::TargetsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let document: TargetsDocument =
            serde_json::from_str(&content).map_err(CoreError::TargetsParse)?;
        let count = self.load_document(document);
        tracing::info!(path = %path.display(), count, "curated targets imported");
        Ok(count)
    }

    /// Snapshot of the registry in import/export form.
    #[must_use]
    pub fn export(&self) -> TargetsDocument {
        TargetsDocument {
            generated_at: Some(chrono::Utc::now().to_rfc3339()),
            total_targets: self.targets.len(),
            targets: self.targets.clone(),
        }
    }

    /// Writes [`Self::export`] as pretty JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TargetsFileIo`] if the file cannot be written.
    pub fn export_to_path(&self, path: &Path) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(&self.export()).map_err(CoreError::TargetsParse)?;
        std::fs::write(path, json).map_err(|e| CoreError::TargetsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(
            path = %path.display(),
            count = self.targets.len(),
            "curated targets exported"
        );
        Ok(())
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut CuratedTarget, CoreError> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| CoreError::UnknownTarget(id.to_string()))?;
        Ok(&mut self.targets[position])
    }

    fn collect_indexed(&self, positions: Option<&Vec<usize>>) -> Vec<&CuratedTarget> {
        positions
            .map(|ps| ps.iter().map(|&i| &self.targets[i]).collect())
            .unwrap_or_default()
    }
}

/// Registry key for a target name.
fn slug_id(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
        .chars()
        .take(MAX_ID_LEN)
        .collect()
}

#[cfg(test)]
#[path = "targets_test.rs"]
mod tests;
