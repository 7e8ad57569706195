//! Boundary to whatever acts on a triggered detection.

use dropwatch_core::{CuratedTarget, ProductSnapshot};

/// Receives auto-triggered detections. Calls are notifications: the manager
/// does not wait on or inspect any outcome.
pub trait TaskSink: Send + Sync {
    fn create_task(&self, product: &ProductSnapshot, store_name: &str, target: &CuratedTarget);
}

/// Logs each triggered task and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTaskSink;

impl TaskSink for LoggingTaskSink {
    fn create_task(&self, product: &ProductSnapshot, store_name: &str, target: &CuratedTarget) {
        tracing::info!(
            store = %store_name,
            target_id = %target.id,
            title = %product.title,
            url = %product.url,
            sizes = ?product.sizes,
            "purchase task requested"
        );
    }
}
