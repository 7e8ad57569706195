//! Runs every store of one platform family on its own poll-sleep loop.
//!
//! Each registered poller moves into a spawned task while the fleet runs and
//! moves back when the fleet stops, so a stopped fleet can be started again
//! with its inventory indexes intact. Counters stay readable throughout via
//! the shared handle in each store's [`MonitoredStore`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use dropwatch_core::Platform;
use dropwatch_scraper::{Detection, MonitoredStore, ScraperError, StorePoller, StoreStats};
use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::proxy::ProxyPool;

/// Pause after a poll fails for a reason other than talking to the store.
pub const FAULT_PAUSE: Duration = Duration::from_secs(5);

/// Receives every detection from every store loop of a fleet.
pub type DetectionHandler = Arc<dyn Fn(Detection) + Send + Sync>;

struct StoreEntry {
    store: MonitoredStore,
    /// `None` while the poller is out in its loop task.
    poller: Option<Box<dyn StorePoller>>,
}

struct RunningFleet {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<(usize, Box<dyn StorePoller>)>>,
}

enum PollOutcome {
    Detections(Vec<Detection>),
    StoreError(ScraperError),
    Fault(String),
}

pub struct FleetCoordinator {
    platform: Platform,
    entries: Vec<StoreEntry>,
    proxies: ProxyPool,
    handler: Option<DetectionHandler>,
    permits: Arc<Semaphore>,
    running: Option<RunningFleet>,
}

impl FleetCoordinator {
    /// `max_concurrent_polls` bounds how many polls of this fleet are in
    /// flight at once; zero is raised to one.
    #[must_use]
    pub fn new(platform: Platform, max_concurrent_polls: usize) -> Self {
        Self {
            platform,
            entries: Vec::new(),
            proxies: ProxyPool::default(),
            handler: None,
            permits: Arc::new(Semaphore::new(max_concurrent_polls.max(1))),
            running: None,
        }
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Replaces the pool used for stores registered from now on.
    pub fn set_proxy_pool(&mut self, proxies: Vec<String>) {
        self.proxies = ProxyPool::new(proxies);
    }

    pub fn set_detection_handler(&mut self, handler: DetectionHandler) {
        self.handler = Some(handler);
    }

    /// Registers a poller, assigns it the next proxy from the pool, and
    /// returns its id. A store added to a running fleet starts immediately.
    pub fn add_store(&mut self, mut poller: Box<dyn StorePoller>) -> usize {
        if let Some(proxy) = self.proxies.next_proxy() {
            poller.set_proxy(Some(proxy));
        }
        let id = self.entries.len();
        let store = poller.store().clone();
        tracing::info!(
            platform = %self.platform,
            store = %store.name,
            url = %store.url,
            proxied = store.proxy.is_some(),
            "store registered"
        );

        let spawn_now = store.enabled && self.running.is_some();
        self.entries.push(StoreEntry {
            store,
            poller: Some(poller),
        });
        if spawn_now {
            self.spawn_store(id);
        }
        id
    }

    /// Spawns one loop per enabled store. Does nothing if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.running.is_some() {
            tracing::debug!(platform = %self.platform, "fleet already running");
            return;
        }
        self.running = Some(RunningFleet {
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        });
        for id in 0..self.entries.len() {
            if self.entries[id].store.enabled {
                self.spawn_store(id);
            }
        }
        tracing::info!(
            platform = %self.platform,
            stores = self.running.as_ref().map_or(0, |r| r.tasks.len()),
            "fleet started"
        );
    }

    /// Cancels every store loop, waits for each to finish, then closes the
    /// pollers' sessions.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.cancel.cancel();
        for task in running.tasks {
            match task.await {
                Ok((id, mut poller)) => {
                    poller.close();
                    if let Some(entry) = self.entries.get_mut(id) {
                        entry.poller = Some(poller);
                    }
                }
                Err(e) => {
                    tracing::error!(
                        platform = %self.platform,
                        error = %e,
                        "store loop did not shut down cleanly"
                    );
                }
            }
        }
        tracing::info!(platform = %self.platform, "fleet stopped");
    }

    /// Counters of every registered store, in registration order.
    #[must_use]
    pub fn stats(&self) -> Vec<StoreStats> {
        self.entries
            .iter()
            .map(|e| e.store.stats(self.platform))
            .collect()
    }

    fn spawn_store(&mut self, id: usize) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let Some(poller) = self.entries.get_mut(id).and_then(|e| e.poller.take()) else {
            return;
        };
        let handle = tokio::spawn(run_store(
            id,
            poller,
            self.handler.clone(),
            Arc::clone(&self.permits),
            running.cancel.clone(),
        ));
        running.tasks.push(handle);
    }
}

async fn run_store(
    id: usize,
    mut poller: Box<dyn StorePoller>,
    handler: Option<DetectionHandler>,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
) -> (usize, Box<dyn StorePoller>) {
    let name = poller.store().name.clone();
    let interval = poller.store().poll_interval;

    loop {
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            outcome = poll_once(poller.as_mut(), &permits) => outcome,
        };

        let pause = match outcome {
            PollOutcome::Detections(detections) => {
                if let Some(handler) = &handler {
                    for detection in detections {
                        dispatch(handler, detection, &name);
                    }
                }
                interval
            }
            PollOutcome::StoreError(e) => {
                tracing::debug!(store = %name, error = %e, "poll failed");
                interval
            }
            PollOutcome::Fault(reason) => {
                tracing::error!(store = %name, %reason, "store loop fault; pausing");
                FAULT_PAUSE
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(pause) => {}
        }
    }

    (id, poller)
}

async fn poll_once(poller: &mut dyn StorePoller, permits: &Semaphore) -> PollOutcome {
    let Ok(_permit) = permits.acquire().await else {
        return PollOutcome::Fault("poll permits closed".to_owned());
    };
    match AssertUnwindSafe(poller.poll()).catch_unwind().await {
        Ok(Ok(detections)) => PollOutcome::Detections(detections),
        Ok(Err(e)) if e.is_network() => PollOutcome::StoreError(e),
        Ok(Err(e)) => PollOutcome::Fault(e.to_string()),
        Err(panic) => PollOutcome::Fault(format!("poll panicked: {}", panic_message(&*panic))),
    }
}

fn dispatch(handler: &DetectionHandler, detection: Detection, store: &str) {
    if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(|| handler(detection))) {
        tracing::error!(
            store = %store,
            reason = %panic_message(&*panic),
            "detection handler panicked"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
#[path = "fleet_test.rs"]
mod tests;
