use std::collections::VecDeque;

use dropwatch_core::Priority;

use crate::events::DetectionEvent;

/// Bounded log of recent events. Appending beyond capacity evicts the oldest.
#[derive(Debug, Clone)]
pub struct EventLog {
    capacity: usize,
    events: VecDeque<DetectionEvent>,
}

impl EventLog {
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn push(&mut self, event: DetectionEvent) {
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Up to `limit` events, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<DetectionEvent> {
        self.events.iter().rev().take(limit).cloned().collect()
    }

    /// Up to `limit` high-tier events, newest first.
    #[must_use]
    pub fn high_priority(&self, limit: usize) -> Vec<DetectionEvent> {
        self.events
            .iter()
            .rev()
            .filter(|e| e.priority() == Priority::High)
            .take(limit)
            .cloned()
            .collect()
    }

    /// All events in arrival order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DetectionEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::fixtures::event;

    #[test]
    fn keeps_only_the_most_recent_capacity_events() {
        let mut log = EventLog::new(3);
        let events: Vec<_> = (0..5).map(|_| event(None, 0.0)).collect();
        for e in &events {
            log.push(e.clone());
        }

        assert_eq!(log.len(), 3);
        let kept: Vec<_> = log.iter().map(|e| e.id).collect();
        let expected: Vec<_> = events[2..].iter().map(|e| e.id).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn recent_is_newest_first_and_truncated() {
        let mut log = EventLog::new(10);
        let first = event(None, 0.0);
        let second = event(None, 0.0);
        log.push(first.clone());
        log.push(second.clone());

        let recent = log.recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, second.id);
        assert_eq!(log.recent(50).len(), 2);
    }

    #[test]
    fn high_priority_filters_on_tier() {
        let mut log = EventLog::new(10);
        log.push(event(Some(Priority::High), 0.9));
        log.push(event(Some(Priority::Medium), 0.9));
        log.push(event(None, 0.0));
        log.push(event(Some(Priority::High), 0.5));

        let high = log.high_priority(10);
        assert_eq!(high.len(), 2);
        assert!(high.iter().all(|e| e.priority() == Priority::High));
        assert_eq!(log.high_priority(1).len(), 1);
    }

    #[test]
    fn zero_capacity_still_holds_the_latest_event() {
        let mut log = EventLog::new(0);
        log.push(event(None, 0.0));
        log.push(event(None, 0.0));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.len(), 1);
    }
}
