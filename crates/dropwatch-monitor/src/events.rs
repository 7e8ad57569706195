//! The unit flowing from the fleets through the manager.

use chrono::{DateTime, Utc};
use dropwatch_core::{Platform, Priority, ProductSnapshot, TargetMatch};
use dropwatch_scraper::{Detection, DetectionKind};
use serde::Serialize;
use uuid::Uuid;

/// A detection after curated-target matching. Never modified once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionEvent {
    pub id: Uuid,
    pub kind: DetectionKind,
    pub platform: Platform,
    pub store_name: String,
    pub product: ProductSnapshot,
    /// Variant ids or size labels that became available.
    pub added: Vec<String>,
    /// Best-scoring enabled target, if any matched the title.
    pub matched: Option<TargetMatch>,
    pub created_at: DateTime<Utc>,
}

impl DetectionEvent {
    #[must_use]
    pub fn new(detection: Detection, matched: Option<TargetMatch>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: detection.kind,
            platform: detection.platform,
            store_name: detection.store_name,
            product: detection.snapshot,
            added: detection.added,
            matched,
            created_at: Utc::now(),
        }
    }

    /// The matched target's tier, or `Low` when nothing matched.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.matched
            .as_ref()
            .map_or(Priority::Low, |m| m.target.priority)
    }

    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        self.matched.as_ref().map(|m| m.confidence)
    }

    /// High tier, or a matched target whose profit exceeds `profit_threshold`.
    #[must_use]
    pub fn is_high_priority(&self, profit_threshold: f64) -> bool {
        self.priority() == Priority::High
            || self
                .matched
                .as_ref()
                .is_some_and(|m| m.target.profit > profit_threshold)
    }
}
