//! Auto-trigger policy for downstream task creation.

use dropwatch_core::AutoTriggerConfig;

use crate::events::DetectionEvent;

/// `true` when the event matched a target with at least `min_confidence`
/// and its tier is at or above `min_priority`. The `enabled` flag is the
/// caller's concern.
#[must_use]
pub fn should_trigger(config: &AutoTriggerConfig, event: &DetectionEvent) -> bool {
    let Some(confidence) = event.confidence() else {
        return false;
    };
    confidence >= config.min_confidence && event.priority().level() >= config.min_priority.level()
}
