//! The monitors file: which storefronts to poll and how events are acted on.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sites::{SiteDirectory, DEFAULT_RETAIL_SITES};
use crate::targets::Priority;
use crate::ConfigError;

const DEFAULT_CATALOG_INTERVAL_MS: u64 = 3000;
const DEFAULT_RETAIL_INTERVAL_MS: u64 = 5000;

/// One catalog storefront to poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDescriptor {
    pub name: String,
    pub url: String,
    #[serde(default = "default_catalog_interval")]
    pub poll_interval_ms: u64,
    /// Normalized size labels of interest. Empty means every size.
    #[serde(default)]
    pub target_sizes: Vec<String>,
}

impl StoreDescriptor {
    #[must_use]
    pub fn new(name: &str, url: &str, poll_interval_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            poll_interval_ms,
            target_sizes: Vec::new(),
        }
    }

    /// Lowercase alphanumeric slug of the store name, used to detect
    /// near-duplicate names such as `"Kith"` and `"KITH "`.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSection {
    /// Include the directory's default catalog storefronts.
    #[serde(default)]
    pub use_defaults: bool,
    #[serde(default)]
    pub stores: Vec<StoreDescriptor>,
    /// Applied to default stores and to stores with no sizes of their own.
    #[serde(default)]
    pub target_sizes: Vec<String>,
}

impl CatalogSection {
    /// The stores to register: defaults first (when enabled), then explicit
    /// stores. An explicit store with the same name as a default replaces it.
    #[must_use]
    pub fn resolved_stores(&self, directory: &SiteDirectory) -> Vec<StoreDescriptor> {
        let mut stores: Vec<StoreDescriptor> = Vec::new();
        if self.use_defaults {
            for (site, interval) in directory.default_catalog_stores() {
                let overridden = self
                    .stores
                    .iter()
                    .any(|s| s.name.eq_ignore_ascii_case(&site.name));
                if !overridden {
                    stores.push(StoreDescriptor {
                        target_sizes: self.target_sizes.clone(),
                        ..StoreDescriptor::new(&site.name, &site.base_url, interval)
                    });
                }
            }
        }
        for store in &self.stores {
            let mut store = store.clone();
            if store.target_sizes.is_empty() {
                store.target_sizes.clone_from(&self.target_sizes);
            }
            stores.push(store);
        }
        stores
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailSection {
    /// Site ids from the directory. Empty means the default retail sites.
    #[serde(default)]
    pub sites: Vec<String>,
    /// Search keywords. Empty means keywords derived from the target registry.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub target_sizes: Vec<String>,
    #[serde(default = "default_retail_interval")]
    pub poll_interval_ms: u64,
}

impl Default for RetailSection {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            keywords: Vec::new(),
            target_sizes: Vec::new(),
            poll_interval_ms: DEFAULT_RETAIL_INTERVAL_MS,
        }
    }
}

impl RetailSection {
    #[must_use]
    pub fn resolved_sites(&self) -> Vec<String> {
        if self.sites.is_empty() {
            DEFAULT_RETAIL_SITES.iter().map(|s| (*s).to_string()).collect()
        } else {
            self.sites.clone()
        }
    }
}

/// Gate for automatic purchase-task creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoTriggerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_min_priority")]
    pub min_priority: Priority,
}

impl Default for AutoTriggerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_confidence: default_min_confidence(),
            min_priority: default_min_priority(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorsFile {
    #[serde(default)]
    pub catalog: Option<CatalogSection>,
    #[serde(default)]
    pub retail: Option<RetailSection>,
    #[serde(default)]
    pub auto_trigger: AutoTriggerConfig,
    /// Proxy URLs handed to every fleet's pool.
    #[serde(default)]
    pub proxies: Vec<String>,
}

fn default_catalog_interval() -> u64 {
    DEFAULT_CATALOG_INTERVAL_MS
}

fn default_retail_interval() -> u64 {
    DEFAULT_RETAIL_INTERVAL_MS
}

fn default_min_confidence() -> f64 {
    0.7
}

fn default_min_priority() -> Priority {
    Priority::Medium
}

/// Load and validate the monitors file from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_monitors(path: &Path) -> Result<MonitorsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MonitorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_monitors(&content)
}

/// Parse and validate monitors YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_monitors(content: &str) -> Result<MonitorsFile, ConfigError> {
    let monitors: MonitorsFile =
        serde_yaml::from_str(content).map_err(ConfigError::MonitorsFileParse)?;
    validate_monitors(&monitors, &SiteDirectory::builtin())?;
    Ok(monitors)
}

fn validate_monitors(
    monitors: &MonitorsFile,
    directory: &SiteDirectory,
) -> Result<(), ConfigError> {
    if let Some(catalog) = &monitors.catalog {
        validate_catalog(catalog)?;
    }
    if let Some(retail) = &monitors.retail {
        validate_retail(retail, directory)?;
    }

    let trigger = &monitors.auto_trigger;
    if !(0.0..=1.0).contains(&trigger.min_confidence) {
        return Err(ConfigError::Validation(format!(
            "auto_trigger.min_confidence {} must be between 0 and 1",
            trigger.min_confidence
        )));
    }

    for proxy in &monitors.proxies {
        if !is_absolute_url(proxy) {
            return Err(ConfigError::Validation(format!(
                "proxy '{proxy}' must be an absolute http(s) URL"
            )));
        }
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogSection) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for store in &catalog.stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "catalog store name must be non-empty".to_string(),
            ));
        }

        if !is_absolute_url(&store.url) {
            return Err(ConfigError::Validation(format!(
                "catalog store '{}' has invalid url '{}'; must be an absolute http(s) URL",
                store.name, store.url
            )));
        }

        if store.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(format!(
                "catalog store '{}' must have a positive poll_interval_ms",
                store.name
            )));
        }

        if !seen_names.insert(store.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate catalog store name: '{}'",
                store.name
            )));
        }

        let slug = store.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate catalog store slug: '{}' (from store '{}')",
                slug, store.name
            )));
        }

        validate_sizes(&store.target_sizes, &store.name)?;
    }

    validate_sizes(&catalog.target_sizes, "catalog")
}

fn validate_retail(retail: &RetailSection, directory: &SiteDirectory) -> Result<(), ConfigError> {
    for id in &retail.sites {
        match directory.get(id) {
            Some(site) if site.platform == crate::Platform::RetailApi => {}
            Some(_) => {
                return Err(ConfigError::Validation(format!(
                    "retail site '{id}' is not a retail API site"
                )))
            }
            None => {
                return Err(ConfigError::Validation(format!(
                    "unknown retail site '{id}'"
                )))
            }
        }
    }

    if retail.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "retail poll_interval_ms must be positive".to_string(),
        ));
    }

    if retail.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "retail keywords must be non-empty".to_string(),
        ));
    }

    validate_sizes(&retail.target_sizes, "retail")
}

fn validate_sizes(sizes: &[String], owner: &str) -> Result<(), ConfigError> {
    if sizes.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "'{owner}' has an empty target size"
        )));
    }
    Ok(())
}

/// `http(s)://host...` with a non-empty host.
fn is_absolute_url(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once("://") else {
        return false;
    };
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    matches!(scheme.to_lowercase().as_str(), "http" | "https") && !host.is_empty()
}

#[cfg(test)]
#[path = "monitors_test.rs"]
mod tests;
