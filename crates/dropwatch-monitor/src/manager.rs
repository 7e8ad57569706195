//! One logical monitoring service over a fleet per platform family.
//!
//! Every detection from every fleet runs through the same pipeline: curated
//! target matching, event construction, the bounded event log, callbacks,
//! and the auto-trigger policy. The pipeline is shared with the fleets'
//! detection handlers, so it must be safe to call from many store loops at
//! once; the event log is the only structure it mutates.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use dropwatch_core::{
    AppConfig, AutoTriggerConfig, MonitorsFile, Platform, Priority, RegistryStats, RetailSection,
    SiteDirectory, StoreDescriptor, TargetRegistry,
};
use dropwatch_scraper::{
    CatalogOptions, CatalogPoller, Detection, KeywordList, MonitoredStore, RetailOptions,
    RetailPoller, StoreStats,
};
use serde::Serialize;

use crate::error::MonitorError;
use crate::event_log::EventLog;
use crate::events::DetectionEvent;
use crate::fleet::{DetectionHandler, FleetCoordinator};
use crate::policy::should_trigger;
use crate::tasks::TaskSink;

/// Observer of processed events, called on the store loop that produced them.
pub type EventCallback = Arc<dyn Fn(&DetectionEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub event_log_capacity: usize,
    pub high_profit_threshold: f64,
    pub max_concurrent_polls: usize,
    pub request_timeout: Duration,
    pub page_delay: Duration,
    pub keyword_delay: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            event_log_capacity: 1000,
            high_profit_threshold: 100.0,
            max_concurrent_polls: 10,
            request_timeout: Duration::from_secs(15),
            page_delay: Duration::from_millis(100),
            keyword_delay: Duration::from_millis(500),
        }
    }
}

impl ManagerOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            event_log_capacity: config.event_log_capacity,
            high_profit_threshold: config.high_profit_threshold,
            max_concurrent_polls: config.max_concurrent_polls,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            page_delay: Duration::from_millis(config.page_delay_ms),
            keyword_delay: Duration::from_millis(config.keyword_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerStats {
    pub running: bool,
    pub total_events: u64,
    pub high_priority_events: u64,
    pub tasks_triggered: u64,
    pub events_stored: usize,
    pub auto_trigger: AutoTriggerConfig,
    pub registry: RegistryStats,
    /// Per-store counters keyed by platform family.
    pub fleets: BTreeMap<String, Vec<StoreStats>>,
}

/// State shared between the manager and its fleets' detection handlers.
struct EventPipeline {
    registry: Arc<RwLock<TargetRegistry>>,
    log: Mutex<EventLog>,
    on_event: RwLock<Vec<EventCallback>>,
    on_high_priority: RwLock<Vec<EventCallback>>,
    task_sink: RwLock<Option<Arc<dyn TaskSink>>>,
    auto_trigger: RwLock<AutoTriggerConfig>,
    high_profit_threshold: f64,
    total_events: AtomicU64,
    high_priority_events: AtomicU64,
    tasks_triggered: AtomicU64,
}

impl EventPipeline {
    fn process(&self, detection: Detection) -> DetectionEvent {
        let matched = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .best_match(&detection.snapshot.title);
        let event = DetectionEvent::new(detection, matched);
        let high_priority = event.is_high_priority(self.high_profit_threshold);

        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        self.total_events.fetch_add(1, Ordering::Relaxed);

        if let Some(m) = &event.matched {
            tracing::info!(
                store = %event.store_name,
                kind = %event.kind,
                target_id = %m.target_id,
                confidence = m.confidence,
                priority = %event.priority(),
                title = %event.product.title,
                "curated match"
            );
        } else {
            tracing::info!(
                store = %event.store_name,
                kind = %event.kind,
                title = %event.product.title,
                "monitor event"
            );
        }

        for callback in snapshot(&self.on_event) {
            callback(&event);
        }
        if high_priority {
            self.high_priority_events.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                store = %event.store_name,
                title = %event.product.title,
                url = %event.product.url,
                "high-priority event"
            );
            for callback in snapshot(&self.on_high_priority) {
                callback(&event);
            }
        }

        self.maybe_trigger(&event);
        event
    }

    fn maybe_trigger(&self, event: &DetectionEvent) {
        let config = *self.auto_trigger.read().unwrap_or_else(PoisonError::into_inner);
        if !config.enabled || !should_trigger(&config, event) {
            return;
        }
        let Some(m) = &event.matched else {
            return;
        };
        let sink = self
            .task_sink
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(sink) = sink else {
            tracing::warn!(target_id = %m.target_id, "auto-trigger fired with no task sink");
            return;
        };
        sink.create_task(&event.product, &event.store_name, &m.target);
        self.tasks_triggered.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            store = %event.store_name,
            target_id = %m.target_id,
            confidence = m.confidence,
            "auto-trigger fired"
        );
    }
}

/// Clones the callback list so no lock is held while callbacks run.
fn snapshot(callbacks: &RwLock<Vec<EventCallback>>) -> Vec<EventCallback> {
    callbacks
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub struct MonitorManager {
    pipeline: Arc<EventPipeline>,
    fleets: BTreeMap<Platform, FleetCoordinator>,
    directory: SiteDirectory,
    keywords: KeywordList,
    proxies: Vec<String>,
    options: ManagerOptions,
    running: bool,
}

impl MonitorManager {
    #[must_use]
    pub fn new(
        registry: Arc<RwLock<TargetRegistry>>,
        directory: SiteDirectory,
        options: ManagerOptions,
    ) -> Self {
        let pipeline = Arc::new(EventPipeline {
            registry,
            log: Mutex::new(EventLog::new(options.event_log_capacity)),
            on_event: RwLock::new(Vec::new()),
            on_high_priority: RwLock::new(Vec::new()),
            task_sink: RwLock::new(None),
            auto_trigger: RwLock::new(AutoTriggerConfig::default()),
            high_profit_threshold: options.high_profit_threshold,
            total_events: AtomicU64::new(0),
            high_priority_events: AtomicU64::new(0),
            tasks_triggered: AtomicU64::new(0),
        });
        Self {
            pipeline,
            fleets: BTreeMap::new(),
            directory,
            keywords: KeywordList::default(),
            proxies: Vec::new(),
            options,
            running: false,
        }
    }

    #[must_use]
    pub fn registry(&self) -> Arc<RwLock<TargetRegistry>> {
        Arc::clone(&self.pipeline.registry)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Applies a whole monitors file: proxies first, then both fleets and the
    /// auto-trigger gate. Returns the number of stores registered.
    ///
    /// # Errors
    ///
    /// Returns the first store that could not be registered.
    pub fn configure(&mut self, file: &MonitorsFile) -> Result<usize, MonitorError> {
        self.set_proxy_pool(file.proxies.clone());
        let mut added = 0;
        if let Some(catalog) = &file.catalog {
            added += self.setup_catalog(&catalog.resolved_stores(&self.directory))?;
        }
        if let Some(retail) = &file.retail {
            added += self.setup_retail(retail)?;
        }
        let trigger = file.auto_trigger;
        self.enable_auto_trigger(trigger.enabled, trigger.min_confidence, trigger.min_priority);
        Ok(added)
    }

    /// Sets the proxies handed out to stores registered from now on.
    pub fn set_proxy_pool(&mut self, proxies: Vec<String>) {
        for fleet in self.fleets.values_mut() {
            fleet.set_proxy_pool(proxies.clone());
        }
        self.proxies = proxies;
    }

    /// Registers catalog stores. Returns how many were added.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Scraper`] if a store URL has no usable origin.
    pub fn setup_catalog(&mut self, stores: &[StoreDescriptor]) -> Result<usize, MonitorError> {
        for descriptor in stores {
            self.add_catalog_store(descriptor)?;
        }
        Ok(stores.len())
    }

    /// Registers one catalog store and returns its id within the fleet.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Scraper`] if the store URL has no usable origin.
    pub fn add_catalog_store(
        &mut self,
        descriptor: &StoreDescriptor,
    ) -> Result<usize, MonitorError> {
        let store = MonitoredStore::new(
            &descriptor.name,
            &descriptor.url,
            Duration::from_millis(descriptor.poll_interval_ms),
        )
        .with_target_sizes(descriptor.target_sizes.clone());
        let options = CatalogOptions {
            timeout: self.options.request_timeout,
            page_delay: self.options.page_delay,
            rate_limit_per_minute: self
                .directory
                .find_by_url(&descriptor.url)
                .map(|site| site.rate_limit_per_minute),
        };
        let poller = CatalogPoller::new(store, options)?;
        Ok(self.fleet(Platform::Catalog).add_store(Box::new(poller)))
    }

    /// Registers one retail poller per site in `section`, all sharing one
    /// keyword list. With no keywords configured, the registry's search
    /// keywords are used. Returns how many sites were added.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::UnknownSite`] or
    /// [`MonitorError::NotRetailSite`] for a site id that cannot be polled.
    pub fn setup_retail(&mut self, section: &RetailSection) -> Result<usize, MonitorError> {
        let keywords = if section.keywords.is_empty() {
            self.pipeline
                .registry
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .search_keywords()
        } else {
            section.keywords.clone()
        };
        self.keywords.replace(keywords);

        let site_ids = section.resolved_sites();
        for id in &site_ids {
            let site = self
                .directory
                .get(id)
                .cloned()
                .ok_or_else(|| MonitorError::UnknownSite(id.clone()))?;
            if site.platform != Platform::RetailApi {
                return Err(MonitorError::NotRetailSite {
                    id: site.id,
                    platform: site.platform.to_string(),
                });
            }
            let store = MonitoredStore::new(
                &site.name,
                &site.base_url,
                Duration::from_millis(section.poll_interval_ms),
            )
            .with_target_sizes(section.target_sizes.clone());
            let options = RetailOptions {
                timeout: self.options.request_timeout,
                keyword_delay: self.options.keyword_delay,
            };
            let poller = RetailPoller::new(site, store, self.keywords.clone(), options)?;
            self.fleet(Platform::RetailApi).add_store(Box::new(poller));
        }
        tracing::info!(
            sites = site_ids.len(),
            keywords = self.keywords.len(),
            "retail fleet configured"
        );
        Ok(site_ids.len())
    }

    /// Replaces the search keywords of every retail poller. Takes effect at
    /// each poller's next cycle.
    pub fn update_retail_keywords(&self, keywords: Vec<String>) {
        self.keywords.replace(keywords);
        tracing::info!(keywords = self.keywords.len(), "retail keywords updated");
    }

    #[must_use]
    pub fn retail_keywords(&self) -> Vec<String> {
        self.keywords.snapshot()
    }

    pub fn on_event(&self, callback: EventCallback) {
        self.pipeline
            .on_event
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    pub fn on_high_priority(&self, callback: EventCallback) {
        self.pipeline
            .on_high_priority
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    pub fn set_task_sink(&self, sink: Arc<dyn TaskSink>) {
        *self
            .pipeline
            .task_sink
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    pub fn enable_auto_trigger(&self, enabled: bool, min_confidence: f64, min_priority: Priority) {
        *self
            .pipeline
            .auto_trigger
            .write()
            .unwrap_or_else(PoisonError::into_inner) = AutoTriggerConfig {
            enabled,
            min_confidence,
            min_priority,
        };
        tracing::info!(
            enabled,
            min_confidence,
            min_priority = %min_priority,
            "auto-trigger configured"
        );
    }

    /// Starts every fleet. Store loops are spawned, so this returns as soon as
    /// every fleet has its loops in flight.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        for fleet in self.fleets.values_mut() {
            fleet.start();
        }
        self.running = true;
        tracing::info!(fleets = self.fleets.len(), "monitor manager started");
    }

    /// Stops every fleet concurrently and returns once all have stopped.
    pub async fn stop(&mut self) {
        if !self.running {
            return;
        }
        futures::future::join_all(self.fleets.values_mut().map(|fleet| fleet.stop())).await;
        self.running = false;
        tracing::info!("monitor manager stopped");
    }

    /// Runs one detection through the event pipeline, exactly as the fleets
    /// do, and returns the resulting event.
    pub fn process_detection(&self, detection: Detection) -> DetectionEvent {
        self.pipeline.process(detection)
    }

    /// Up to `limit` events, newest first.
    #[must_use]
    pub fn recent_events(&self, limit: usize) -> Vec<DetectionEvent> {
        self.pipeline
            .log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recent(limit)
    }

    /// Up to `limit` high-tier events, newest first.
    #[must_use]
    pub fn high_priority_events(&self, limit: usize) -> Vec<DetectionEvent> {
        self.pipeline
            .log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .high_priority(limit)
    }

    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        let p = &self.pipeline;
        ManagerStats {
            running: self.running,
            total_events: p.total_events.load(Ordering::Relaxed),
            high_priority_events: p.high_priority_events.load(Ordering::Relaxed),
            tasks_triggered: p.tasks_triggered.load(Ordering::Relaxed),
            events_stored: p.log.lock().unwrap_or_else(PoisonError::into_inner).len(),
            auto_trigger: *p.auto_trigger.read().unwrap_or_else(PoisonError::into_inner),
            registry: p
                .registry
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .stats(),
            fleets: self
                .fleets
                .iter()
                .map(|(platform, fleet)| (platform.to_string(), fleet.stats()))
                .collect(),
        }
    }

    /// The fleet for `platform`, created with the manager's handler, proxy
    /// pool, and concurrency budget on first use.
    fn fleet(&mut self, platform: Platform) -> &mut FleetCoordinator {
        let pipeline = Arc::clone(&self.pipeline);
        let proxies = &self.proxies;
        let max_polls = self.options.max_concurrent_polls;
        self.fleets.entry(platform).or_insert_with(|| {
            let mut fleet = FleetCoordinator::new(platform, max_polls);
            fleet.set_proxy_pool(proxies.clone());
            let handler: DetectionHandler = Arc::new(move |detection| {
                pipeline.process(detection);
            });
            fleet.set_detection_handler(handler);
            fleet
        })
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
