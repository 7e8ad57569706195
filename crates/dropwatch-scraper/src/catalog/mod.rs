//! Poller for storefronts exposing the public `products.json` catalog feed.

pub mod types;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::Utc;
use dropwatch_core::{Platform, ProductSnapshot, VariantDetail};
use futures::future::BoxFuture;
use reqwest::header::{self, HeaderMap, HeaderValue};
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use crate::error::ScraperError;
use crate::index::{Classification, InventoryIndex};
use crate::origin::{extract_domain, extract_store_origin};
use crate::pagination::{catalog_page_url, MAX_PAGES};
use crate::poller::{
    check_status, Detection, DetectionKind, MonitoredStore, RecordOutcome, StorePoller,
};
use crate::rate_limit::{Backoff, RequestPacer};
use crate::session::{random_user_agent, HttpSession};
use crate::sizes::{extract_variant_size, filter_to_targets, normalize_catalog_size};

use self::types::{CatalogPage, CatalogProduct};

/// Listing endpoint relative to the store origin.
pub const CATALOG_ENDPOINT: &str = "/products.json";

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub timeout: Duration,
    /// Pause between consecutive page requests within one cycle.
    pub page_delay: Duration,
    /// Requests-per-minute budget. `None` leaves only the poll interval.
    pub rate_limit_per_minute: Option<u32>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            page_delay: Duration::from_millis(100),
            rate_limit_per_minute: None,
        }
    }
}

/// What one catalog record says about a product.
#[derive(Debug)]
enum CatalogObservation {
    SoldOut {
        product_id: String,
    },
    InStock {
        snapshot: ProductSnapshot,
        variant_ids: BTreeSet<String>,
    },
}

pub struct CatalogPoller {
    store: MonitoredStore,
    origin: String,
    domain: String,
    options: CatalogOptions,
    session: Option<HttpSession>,
    backoff: Backoff,
    pacer: RequestPacer,
    index: InventoryIndex,
    target_sizes: Vec<String>,
}

impl CatalogPoller {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidStoreUrl`] if the store URL has no
    /// usable origin.
    pub fn new(store: MonitoredStore, options: CatalogOptions) -> Result<Self, ScraperError> {
        let origin = extract_store_origin(&store.url)?;
        let domain = extract_domain(&origin);
        let target_sizes = store
            .target_sizes
            .iter()
            .map(|s| normalize_catalog_size(s))
            .collect();
        let pacer = RequestPacer::new(store.poll_interval, options.rate_limit_per_minute);
        Ok(Self {
            store,
            origin,
            domain,
            options,
            session: None,
            backoff: Backoff::new(),
            pacer,
            index: InventoryIndex::new(),
            target_sizes,
        })
    }

    #[must_use]
    pub fn index(&self) -> &InventoryIndex {
        &self.index
    }

    fn session(&mut self) -> Result<HttpSession, ScraperError> {
        if let Some(session) = &self.session {
            return Ok(session.clone());
        }
        let session = HttpSession::new(self.options.timeout, self.store.proxy.as_deref())?;
        self.session = Some(session.clone());
        Ok(session)
    }

    async fn poll_cycle(&mut self) -> Result<Vec<Detection>, ScraperError> {
        if let Some(remaining) = self.backoff.remaining(Instant::now()) {
            return Err(ScraperError::RateLimited {
                domain: self.domain.clone(),
                retry_after_secs: remaining.as_secs().max(1),
            });
        }

        let wait = self.pacer.delay_before_next(Instant::now());
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let session = self.session()?;
        let mut hasher = Sha256::new();
        let mut products = Vec::new();

        for page in 1..=MAX_PAGES {
            if page > 1 && !self.options.page_delay.is_zero() {
                tokio::time::sleep(self.options.page_delay).await;
            }
            let url = catalog_page_url(&self.origin, CATALOG_ENDPOINT, page)?;
            self.pacer.record(Instant::now());

            let response = match session.get(&url, catalog_headers()).await {
                Ok(response) => response,
                Err(e) => {
                    self.record_failure();
                    return Err(e);
                }
            };
            check_status(&response, &url, &self.domain, &self.store, &mut self.backoff)?;

            let parsed: CatalogPage = match serde_json::from_str(&response.body) {
                Ok(parsed) => parsed,
                Err(source) => {
                    self.record_failure();
                    return Err(ScraperError::Deserialize {
                        context: format!("catalog page {page} from {}", self.domain),
                        source,
                    });
                }
            };
            hasher.update(response.body.as_bytes());
            if parsed.products.is_empty() {
                break;
            }
            products.extend(parsed.products);
        }

        self.backoff.reset();
        self.store.counters.record_success(Utc::now());

        let hash = format!("{:x}", hasher.finalize());
        if self.store.counters.last_hash().as_deref() == Some(hash.as_str()) {
            tracing::debug!(store = %self.store.name, "catalog unchanged since last cycle");
            return Ok(Vec::new());
        }
        self.store.counters.set_last_hash(hash);

        Ok(self.process_products(products))
    }

    fn record_failure(&mut self) {
        self.backoff.record_failure();
        self.store.counters.record_error();
    }

    /// Classifies one cycle's raw product records against the index and
    /// updates it. Records that fail to decode are skipped individually.
    pub fn process_products(&mut self, products: Vec<serde_json::Value>) -> Vec<Detection> {
        let mut detections = Vec::new();

        for raw in products {
            match self.observe(raw) {
                RecordOutcome::Skipped { reason } => {
                    tracing::debug!(store = %self.store.name, %reason, "skipping catalog record");
                }
                RecordOutcome::Observed(CatalogObservation::SoldOut { product_id }) => {
                    self.index.mark_unavailable(&product_id);
                }
                RecordOutcome::Observed(CatalogObservation::InStock {
                    snapshot,
                    variant_ids,
                }) => {
                    let product_id = snapshot.product_id.clone();
                    let (kind, added) = match self.index.classify(&product_id, &variant_ids) {
                        Classification::New => {
                            (DetectionKind::NewProduct, variant_ids.iter().cloned().collect())
                        }
                        Classification::Restock(added) => (DetectionKind::Restock, added),
                        Classification::Unchanged => continue,
                    };
                    tracing::info!(
                        store = %self.store.name,
                        kind = %kind,
                        title = %snapshot.title,
                        sizes = ?snapshot.sizes,
                        "catalog detection"
                    );
                    self.index.record(&product_id, snapshot.clone(), variant_ids);
                    detections.push(Detection {
                        kind,
                        platform: Platform::Catalog,
                        store_name: self.store.name.clone(),
                        snapshot,
                        added,
                    });
                }
            }
        }

        self.store
            .counters
            .add_products_found(detections.len() as u64);
        detections
    }

    fn observe(&self, raw: serde_json::Value) -> RecordOutcome<CatalogObservation> {
        let product: CatalogProduct = match serde_json::from_value(raw) {
            Ok(product) => product,
            Err(e) => return RecordOutcome::skipped(format!("malformed product: {e}")),
        };
        let product_id = product.id.to_string();

        let in_stock: Vec<_> = product.variants.iter().filter(|v| v.available).collect();
        if in_stock.is_empty() {
            return RecordOutcome::Observed(CatalogObservation::SoldOut { product_id });
        }

        let mut sizes: Vec<String> = Vec::new();
        let mut variants = BTreeMap::new();
        let mut sized_ids: Vec<(Option<String>, String)> = Vec::new();
        for variant in &in_stock {
            let size = extract_variant_size(variant.options(), &variant.title);
            if let Some(size) = &size {
                if !sizes.contains(size) {
                    sizes.push(size.clone());
                }
                variants.entry(size.clone()).or_insert_with(|| VariantDetail {
                    variant_id: variant.id.to_string(),
                    price: variant.price,
                    sku: variant.sku.clone(),
                    inventory: variant.inventory_quantity,
                });
            }
            sized_ids.push((size, variant.id.to_string()));
        }

        let variant_ids: BTreeSet<String> = if self.target_sizes.is_empty() {
            sized_ids.into_iter().map(|(_, id)| id).collect()
        } else {
            sizes = filter_to_targets(&sizes, &self.target_sizes);
            if sizes.is_empty() && self.index.contains(&product_id) {
                return RecordOutcome::Observed(CatalogObservation::SoldOut { product_id });
            }
            if sizes.is_empty() {
                return RecordOutcome::skipped(format!(
                    "{} has no target sizes available",
                    product.title
                ));
            }
            variants.retain(|size, _| sizes.contains(size));
            sized_ids
                .into_iter()
                .filter(|(size, _)| size.as_ref().is_some_and(|s| sizes.contains(s)))
                .map(|(_, id)| id)
                .collect()
        };

        let snapshot = ProductSnapshot {
            product_id,
            url: format!("{}/products/{}", self.origin, product.handle),
            title: product.title,
            brand: product.vendor.filter(|v| !v.is_empty()),
            sku: product.variants.first().and_then(|v| v.sku.clone()),
            style_code: None,
            price: in_stock.first().and_then(|v| v.price),
            image_url: product.images.first().map(|i| i.src.clone()),
            available: true,
            sizes,
            variants,
        };
        RecordOutcome::Observed(CatalogObservation::InStock {
            snapshot,
            variant_ids,
        })
    }
}

impl StorePoller for CatalogPoller {
    fn store(&self) -> &MonitoredStore {
        &self.store
    }

    fn platform(&self) -> Platform {
        Platform::Catalog
    }

    fn poll(&mut self) -> BoxFuture<'_, Result<Vec<Detection>, ScraperError>> {
        Box::pin(self.poll_cycle())
    }

    fn set_proxy(&mut self, proxy: Option<String>) {
        self.store.proxy = proxy;
        self.session = None;
    }

    fn close(&mut self) {
        self.session = None;
    }
}

fn catalog_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(random_user_agent()));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
