//! # In-flight transitions
//!
//! Tracks which screens are animating, with the token of the transition
//! currently expected to finish and when it started. A non-empty set means
//! input should be blocked.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::screen::{ScreenId, TransitionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub token: u64,
    pub kind: TransitionKind,
    pub started: Instant,
}

#[derive(Debug, Default)]
pub struct TransitionSet {
    in_flight: HashMap<ScreenId, InFlight>,
}

impl TransitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or replace) the transition for `id`. Returns the replaced one.
    pub fn begin(
        &mut self,
        id: &ScreenId,
        token: u64,
        kind: TransitionKind,
        now: Instant,
    ) -> Option<InFlight> {
        self.in_flight.insert(
            id.clone(),
            InFlight {
                token,
                kind,
                started: now,
            },
        )
    }

    /// Complete the transition for `id` if `token` is the one in flight.
    pub fn finish(&mut self, id: &str, token: u64) -> Option<InFlight> {
        match self.in_flight.get(id) {
            Some(flight) if flight.token == token => self.in_flight.remove(id),
            _ => None,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<InFlight> {
        self.in_flight.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&InFlight> {
        self.in_flight.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.in_flight.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Transitions running for at least `timeout` as of `now`, oldest first.
    pub fn expired(&self, now: Instant, timeout: Duration) -> Vec<(ScreenId, InFlight)> {
        let mut stale: Vec<(ScreenId, InFlight)> = self
            .in_flight
            .iter()
            .filter(|(_, flight)| now.saturating_duration_since(flight.started) >= timeout)
            .map(|(id, flight)| (id.clone(), *flight))
            .collect();
        stale.sort_by(|a, b| a.1.started.cmp(&b.1.started).then_with(|| a.0.cmp(&b.0)));
        stale
    }
}

/// Request to the input-intercept mechanism owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSignal {
    Block,
    Unblock,
}

impl InputSignal {
    /// Edge between two observations of "something is in flight".
    pub fn between(was_busy: bool, is_busy: bool) -> Option<Self> {
        match (was_busy, is_busy) {
            (false, true) => Some(InputSignal::Block),
            (true, false) => Some(InputSignal::Unblock),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ScreenId {
        ScreenId::from(s)
    }

    #[test]
    fn test_finish_requires_matching_token() {
        let mut set = TransitionSet::new();
        let now = Instant::now();
        set.begin(&id("A"), 1, TransitionKind::In, now);
        assert!(set.finish("A", 2).is_none());
        assert!(set.contains("A"));
        assert!(set.finish("A", 1).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_begin_replaces_previous_flight() {
        let mut set = TransitionSet::new();
        let now = Instant::now();
        set.begin(&id("A"), 1, TransitionKind::In, now);
        let replaced = set.begin(&id("A"), 2, TransitionKind::Out, now);
        assert_eq!(replaced.map(|f| f.token), Some(1));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("A").map(|f| f.kind), Some(TransitionKind::Out));
    }

    #[test]
    fn test_expired_orders_oldest_first() {
        let mut set = TransitionSet::new();
        let start = Instant::now();
        set.begin(&id("late"), 2, TransitionKind::In, start + Duration::from_millis(50));
        set.begin(&id("early"), 1, TransitionKind::Out, start);
        set.begin(&id("fresh"), 3, TransitionKind::In, start + Duration::from_millis(900));

        let stale = set.expired(start + Duration::from_millis(1000), Duration::from_millis(500));
        let ids: Vec<&str> = stale.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_input_signal_edges() {
        assert_eq!(InputSignal::between(false, true), Some(InputSignal::Block));
        assert_eq!(InputSignal::between(true, false), Some(InputSignal::Unblock));
        assert_eq!(InputSignal::between(true, true), None);
        assert_eq!(InputSignal::between(false, false), None);
    }
}
