//! Poller for the retail family's keyword-search API.
//!
//! Each cycle runs one newest-first search per keyword with a short pause
//! between keywords. Stock is keyed by size rather than by variant id, so
//! restocks are detected as growth of a product's in-stock size set.

pub mod keywords;
pub mod types;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::Utc;
use dropwatch_core::{Platform, ProductSnapshot, Site, VariantDetail};
use futures::future::BoxFuture;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::ScraperError;
use crate::index::{Classification, InventoryIndex};
use crate::origin::{extract_domain, extract_store_origin};
use crate::pagination::retail_search_url;
use crate::poller::{
    check_status, Detection, DetectionKind, MonitoredStore, RecordOutcome, StorePoller,
};
use crate::rate_limit::Backoff;
use crate::session::{random_user_agent, HttpSession};
use crate::sizes::{filter_to_targets, normalize_retail_size};

pub use self::keywords::KeywordList;
use self::types::{RetailProduct, RetailSearchPage};

#[derive(Debug, Clone)]
pub struct RetailOptions {
    pub timeout: Duration,
    /// Pause between two keyword searches in one cycle.
    pub keyword_delay: Duration,
}

impl Default for RetailOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            keyword_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug)]
enum RetailObservation {
    SoldOut {
        sku: String,
    },
    InStock {
        snapshot: ProductSnapshot,
        sizes: BTreeSet<String>,
    },
}

pub struct RetailPoller {
    site: Site,
    store: MonitoredStore,
    origin: String,
    domain: String,
    keywords: KeywordList,
    options: RetailOptions,
    session: Option<HttpSession>,
    backoff: Backoff,
    index: InventoryIndex,
    target_sizes: Vec<String>,
}

impl RetailPoller {
    /// # Errors
    ///
    /// Returns [`ScraperError::UnknownSite`] if `site` is not a retail-API
    /// site, or [`ScraperError::InvalidStoreUrl`] if its base URL is unusable.
    pub fn new(
        site: Site,
        store: MonitoredStore,
        keywords: KeywordList,
        options: RetailOptions,
    ) -> Result<Self, ScraperError> {
        if site.platform != Platform::RetailApi {
            return Err(ScraperError::UnknownSite(format!(
                "{} is a {} site, not a retail API site",
                site.id, site.platform
            )));
        }
        let origin = extract_store_origin(&site.base_url)?;
        let domain = extract_domain(&origin);
        let target_sizes = store
            .target_sizes
            .iter()
            .map(|s| normalize_retail_size(s))
            .collect();
        Ok(Self {
            site,
            store,
            origin,
            domain,
            keywords,
            options,
            session: None,
            backoff: Backoff::new(),
            index: InventoryIndex::new(),
            target_sizes,
        })
    }

    #[must_use]
    pub fn site(&self) -> &Site {
        &self.site
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

        let keywords = self.keywords.snapshot();
        if keywords.is_empty() {
            tracing::debug!(store = %self.store.name, "no search keywords configured");
            return Ok(Vec::new());
        }

        let session = self.session()?;
        let mut detections = Vec::new();
        let mut searched = 0usize;
        let mut last_error: Option<ScraperError> = None;

        for (i, keyword) in keywords.iter().enumerate() {
            if i > 0 && !self.options.keyword_delay.is_zero() {
                tokio::time::sleep(self.options.keyword_delay).await;
            }
            match self.search(&session, keyword).await {
                Ok(products) => {
                    searched += 1;
                    detections.extend(self.process_products(products));
                }
                Err(e @ ScraperError::RateLimited { .. }) => {
                    last_error = Some(e);
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        store = %self.store.name,
                        keyword = %keyword,
                        error = %e,
                        "keyword search failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if searched == 0 => Err(e),
            Some(_) => {
                self.store.counters.record_success(Utc::now());
                Ok(detections)
            }
            None => {
                self.backoff.reset();
                self.store.counters.record_success(Utc::now());
                Ok(detections)
            }
        }
    }

    async fn search(
        &mut self,
        session: &HttpSession,
        keyword: &str,
    ) -> Result<Vec<serde_json::Value>, ScraperError> {
        let url = retail_search_url(&self.origin, &self.site.products_endpoint, keyword)?;
        let response = match session.get(&url, self.headers()).await {
            Ok(response) => response,
            Err(e) => {
                self.record_failure();
                return Err(e);
            }
        };
        check_status(&response, &url, &self.domain, &self.store, &mut self.backoff)?;

        match serde_json::from_str::<RetailSearchPage>(&response.body) {
            Ok(page) => Ok(page.products),
            Err(source) => {
                self.record_failure();
                Err(ScraperError::Deserialize {
                    context: format!("search \"{keyword}\" on {}", self.domain),
                    source,
                })
            }
        }
    }

    fn record_failure(&mut self) {
        self.backoff.record_failure();
        self.store.counters.record_error();
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(random_user_agent()));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        if let Ok(origin) = HeaderValue::from_str(&self.origin) {
            headers.insert(header::ORIGIN, origin);
        }
        if let Ok(referer) = HeaderValue::from_str(&format!("{}/", self.origin)) {
            headers.insert(header::REFERER, referer);
        }
        if let Some(key) = self
            .site
            .api_key
            .as_deref()
            .and_then(|k| HeaderValue::from_str(k).ok())
        {
            headers.insert(HeaderName::from_static("x-api-key"), key);
        }
        if let Ok(request_id) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            headers.insert(HeaderName::from_static("x-fl-request-id"), request_id);
        }
        headers
    }

    /// Classifies one search result page against the index and updates it.
    pub fn process_products(&mut self, products: Vec<serde_json::Value>) -> Vec<Detection> {
        let mut detections = Vec::new();

        for raw in products {
            match self.observe(raw) {
                RecordOutcome::Skipped { reason } => {
                    tracing::debug!(store = %self.store.name, %reason, "skipping retail record");
                }
                RecordOutcome::Observed(RetailObservation::SoldOut { sku }) => {
                    self.index.mark_unavailable(&sku);
                }
                RecordOutcome::Observed(RetailObservation::InStock { snapshot, sizes }) => {
                    let sku = snapshot.product_id.clone();
                    let (kind, added) = match self.index.classify(&sku, &sizes) {
                        Classification::New => (DetectionKind::NewProduct, snapshot.sizes.clone()),
                        Classification::Restock(added) => (DetectionKind::Restock, added),
                        Classification::Unchanged => continue,
                    };
                    tracing::info!(
                        store = %self.store.name,
                        kind = %kind,
                        sku = %sku,
                        title = %snapshot.title,
                        "retail detection"
                    );
                    self.index.record(&sku, snapshot.clone(), sizes);
                    detections.push(Detection {
                        kind,
                        platform: Platform::RetailApi,
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

    fn observe(&self, raw: serde_json::Value) -> RecordOutcome<RetailObservation> {
        let product: RetailProduct = match serde_json::from_value(raw) {
            Ok(product) => product,
            Err(e) => return RecordOutcome::skipped(format!("malformed product: {e}")),
        };
        let sku = product.sku.trim().to_owned();
        if sku.is_empty() {
            return RecordOutcome::skipped("product without sku");
        }

        let price = product.price.as_ref().and_then(|p| p.value);
        let mut sizes: Vec<String> = Vec::new();
        let mut variants = BTreeMap::new();
        for (raw_size, code) in product.in_stock_units() {
            let size = normalize_retail_size(raw_size);
            if sizes.contains(&size) {
                continue;
            }
            variants.insert(
                size.clone(),
                VariantDetail {
                    variant_id: code.to_owned(),
                    price,
                    sku: (!code.is_empty()).then(|| code.to_owned()),
                    inventory: None,
                },
            );
            sizes.push(size);
        }

        if sizes.is_empty() {
            return RecordOutcome::Observed(RetailObservation::SoldOut { sku });
        }
        if !self.target_sizes.is_empty() {
            sizes = filter_to_targets(&sizes, &self.target_sizes);
            if sizes.is_empty() && self.index.contains(&sku) {
                return RecordOutcome::Observed(RetailObservation::SoldOut { sku });
            }
            if sizes.is_empty() {
                return RecordOutcome::skipped(format!("{sku} has no target sizes in stock"));
            }
            variants.retain(|size, _| sizes.contains(size));
        }

        let snapshot = ProductSnapshot {
            url: self.site.product_url(&sku),
            product_id: sku.clone(),
            title: product.name.clone(),
            brand: product
                .brand
                .as_ref()
                .map(|b| b.name.clone())
                .filter(|b| !b.is_empty()),
            sku: Some(sku),
            style_code: product.style_id.clone().filter(|s| !s.is_empty()),
            price,
            image_url: product.primary_image().map(str::to_owned),
            available: true,
            sizes: sizes.clone(),
            variants,
        };
        RecordOutcome::Observed(RetailObservation::InStock {
            snapshot,
            sizes: sizes.into_iter().collect(),
        })
    }
}

impl StorePoller for RetailPoller {
    fn store(&self) -> &MonitoredStore {
        &self.store
    }

    fn platform(&self) -> Platform {
        Platform::RetailApi
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

#[cfg(test)]
#[path = "retail_test.rs"]
mod tests;
