//! # Registry
//!
//! Per-layer table of screens keyed by id. Besides ownership it does the
//! bookkeeping every layer shares:
//!
//! - registration generations, so messages from a screen that has since been
//!   unregistered (or re-registered) are ignored
//! - each screen's [`ScreenState`]
//! - issuing transitions with fresh tokens and tracking them in a
//!   [`TransitionSet`]
//! - a mailbox that screens post completion/destruction messages into
//!
//! A second show or hide is never issued to a screen mid-transition: hiding
//! an opening screen stops its in-transition first, showing a closing screen
//! is deferred until its out-transition finishes.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use log::{debug, error, warn};
use serde_json::Value;

use crate::core::error::NavError;
use crate::core::screen::{
    Lifeline, MessageKind, Screen, ScreenId, ScreenMessage, ScreenState, Transition,
    TransitionKind,
};
use crate::core::transition::TransitionSet;

/// Result of asking a screen to show or hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    /// A transition was started.
    Started,
    /// The screen is closing; the show runs once the out-transition finishes.
    Deferred,
    /// Nothing to do, the screen is already in (or heading to) that state.
    Unchanged,
    /// The screen refused; it has been put back to `Closed`.
    Failed,
    /// No such screen.
    Unknown,
}

impl Issue {
    /// The screen is (or will be) on its way to the requested state.
    pub fn succeeded(self) -> bool {
        matches!(self, Issue::Started | Issue::Deferred | Issue::Unchanged)
    }
}

/// Something a layer must react to after draining its mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Finished {
        id: ScreenId,
        transition: TransitionKind,
    },
    CloseRequested {
        id: ScreenId,
        animate: bool,
    },
    Destroyed {
        id: ScreenId,
    },
}

struct Entry<S: ?Sized> {
    id: ScreenId,
    screen: Box<S>,
    state: ScreenState,
    generation: u64,
    deferred_show: Option<Option<Value>>,
}

pub struct Registry<S: ?Sized> {
    entries: HashMap<ScreenId, Entry<S>>,
    transitions: TransitionSet,
    tx: Sender<ScreenMessage>,
    rx: Receiver<ScreenMessage>,
    next_generation: u64,
    next_token: u64,
}

impl<S: Screen + ?Sized> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Screen + ?Sized> Registry<S> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            entries: HashMap::new(),
            transitions: TransitionSet::new(),
            tx,
            rx,
            next_generation: 0,
            next_token: 0,
        }
    }

    pub fn register(
        &mut self,
        id: impl Into<ScreenId>,
        mut screen: Box<S>,
    ) -> Result<(), NavError> {
        let id = id.into();
        if self.entries.contains_key(&id) {
            return Err(NavError::DuplicateId(id));
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        screen.on_registered(&id, Lifeline::new(id.clone(), generation, self.tx.clone()));
        debug!("Registered screen '{}' (generation {})", id, generation);
        self.entries.insert(
            id.clone(),
            Entry {
                id,
                screen,
                state: ScreenState::Closed,
                generation,
                deferred_show: None,
            },
        );
        Ok(())
    }

    /// Remove a screen. Its handles stay valid but everything they post is
    /// ignored from now on.
    pub fn unregister(&mut self, id: &str) -> Result<Box<S>, NavError> {
        let entry = self
            .entries
            .remove(id)
            .ok_or_else(|| NavError::NotRegistered(ScreenId::from(id)))?;
        self.transitions.remove(id);
        debug!("Unregistered screen '{}'", id);
        Ok(entry.screen)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// The registered key for `id`, or `NotRegistered`.
    pub fn resolve(&self, id: &str) -> Result<ScreenId, NavError> {
        self.entries
            .get(id)
            .map(|entry| entry.id.clone())
            .ok_or_else(|| NavError::NotRegistered(ScreenId::from(id)))
    }

    pub fn get(&self, id: &str) -> Option<&S> {
        self.entries.get(id).map(|entry| entry.screen.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut S> {
        self.entries.get_mut(id).map(|entry| entry.screen.as_mut())
    }

    pub fn state(&self, id: &str) -> Option<ScreenState> {
        self.entries.get(id).map(|entry| entry.state)
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.state(id).is_some_and(ScreenState::is_open)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.state(id).is_some_and(ScreenState::is_visible)
    }

    pub fn has_deferred_show(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .is_some_and(|entry| entry.deferred_show.is_some())
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<ScreenId> {
        let mut ids: Vec<ScreenId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn transitions(&self) -> &TransitionSet {
        &self.transitions
    }

    /// At least one screen is mid-transition.
    pub fn is_busy(&self) -> bool {
        !self.transitions.is_empty()
    }

    pub fn issue_show(&mut self, id: &str, data: Option<&Value>) -> Issue {
        let Some(entry) = self.entries.get_mut(id) else {
            warn!("Show requested for unknown screen '{}'", id);
            return Issue::Unknown;
        };
        match entry.state {
            ScreenState::Opening | ScreenState::Open => {
                debug!("Screen '{}' is already showing", id);
                entry.deferred_show = None;
                Issue::Unchanged
            }
            ScreenState::Closing => {
                debug!("Screen '{}' is closing, deferring show", id);
                entry.deferred_show = Some(data.cloned());
                Issue::Deferred
            }
            ScreenState::Closed => self.start(id, TransitionKind::In, data, true),
        }
    }

    pub fn issue_hide(&mut self, id: &str, animate: bool) -> Issue {
        let Some(entry) = self.entries.get_mut(id) else {
            warn!("Hide requested for unknown screen '{}'", id);
            return Issue::Unknown;
        };
        match entry.state {
            ScreenState::Closed => {
                entry.deferred_show = None;
                Issue::Unchanged
            }
            ScreenState::Closing => {
                if entry.deferred_show.take().is_some() {
                    debug!("Cancelled deferred show of '{}'", id);
                }
                Issue::Unchanged
            }
            ScreenState::Opening => {
                debug!("Stopping in-transition of '{}' before hiding", id);
                entry.screen.stop_transition();
                self.start(id, TransitionKind::Out, None, animate)
            }
            ScreenState::Open => self.start(id, TransitionKind::Out, None, animate),
        }
    }

    /// Hide every registered screen. One screen failing does not stop the
    /// others. Returns the number of failures.
    pub fn hide_each(&mut self, animate: bool) -> usize {
        self.ids()
            .iter()
            .filter(|id| self.issue_hide(id.as_str(), animate) == Issue::Failed)
            .count()
    }

    fn start(
        &mut self,
        id: &str,
        kind: TransitionKind,
        data: Option<&Value>,
        animate: bool,
    ) -> Issue {
        self.next_token += 1;
        let token = self.next_token;
        let Some(entry) = self.entries.get_mut(id) else {
            return Issue::Unknown;
        };
        let transition = Transition::new(
            entry.id.clone(),
            entry.generation,
            token,
            kind,
            self.tx.clone(),
        );
        entry.state = match kind {
            TransitionKind::In => ScreenState::Opening,
            TransitionKind::Out => ScreenState::Closing,
        };
        self.transitions.begin(&entry.id, token, kind, Instant::now());

        let result = match kind {
            TransitionKind::In => entry.screen.show(data, transition),
            TransitionKind::Out => entry.screen.hide(animate, transition),
        };
        match result {
            Ok(()) => Issue::Started,
            Err(e) => {
                error!("Screen '{}' failed to start {:?} transition: {}", id, kind, e);
                entry.state = ScreenState::Closed;
                entry.deferred_show = None;
                self.transitions.remove(id);
                Issue::Failed
            }
        }
    }

    /// Settle everything posted since the last call.
    pub fn drain_messages(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            if let Some(notice) = self.settle(message) {
                notices.push(notice);
            }
        }
        notices
    }

    fn settle(&mut self, message: ScreenMessage) -> Option<Notice> {
        let current = self.entries.get(&message.id).map(|entry| entry.generation);
        if current != Some(message.generation) {
            debug!(
                "Ignoring {:?} from detached screen '{}'",
                message.kind, message.id
            );
            return None;
        }
        match message.kind {
            MessageKind::Finished { token, .. } => self.complete(&message.id, token),
            MessageKind::CloseRequested { animate } => Some(Notice::CloseRequested {
                id: message.id,
                animate,
            }),
            MessageKind::Destroyed => Some(Notice::Destroyed { id: message.id }),
        }
    }

    fn complete(&mut self, id: &ScreenId, token: u64) -> Option<Notice> {
        let Some(flight) = self.transitions.finish(id.as_str(), token) else {
            debug!("Ignoring stale transition {} of '{}'", token, id);
            return None;
        };
        let entry = self.entries.get_mut(id)?;
        match flight.kind {
            TransitionKind::In => entry.state = ScreenState::Open,
            TransitionKind::Out => {
                entry.state = ScreenState::Closed;
                if let Some(data) = entry.deferred_show.take() {
                    debug!("Running deferred show of '{}'", id);
                    self.start(id.as_str(), TransitionKind::In, data.as_ref(), true);
                }
            }
        }
        Some(Notice::Finished {
            id: id.clone(),
            transition: flight.kind,
        })
    }

    /// Force-complete transitions that have been running for `timeout`.
    pub fn expire(&mut self, now: Instant, timeout: Duration) -> Vec<Notice> {
        let mut notices = Vec::new();
        for (id, flight) in self.transitions.expired(now, timeout) {
            warn!(
                "{:?} transition of '{}' stalled for {:?}, forcing completion",
                flight.kind,
                id,
                now.saturating_duration_since(flight.started)
            );
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.screen.stop_transition();
            }
            if let Some(notice) = self.complete(&id, flight.token) {
                notices.push(notice);
            }
        }
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::screen::Window;
    use crate::test_support::FakeScreen;
    use serde_json::json;

    fn registry() -> Registry<dyn Window> {
        Registry::new()
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut reg = registry();
        reg.register("A", Box::new(FakeScreen::instant())).unwrap();
        let err = reg.register("A", Box::new(FakeScreen::instant())).unwrap_err();
        assert_eq!(err, NavError::DuplicateId(ScreenId::from("A")));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_hands_out_lifeline() {
        let mut reg = registry();
        let screen = FakeScreen::instant();
        let probe = screen.probe();
        reg.register("A", Box::new(screen)).unwrap();
        assert_eq!(probe.registered_as(), Some(ScreenId::from("A")));
    }

    #[test]
    fn test_unregister_unknown_fails() {
        let mut reg = registry();
        assert!(matches!(
            reg.unregister("ghost"),
            Err(NavError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_show_completes_on_drain_not_before() {
        let mut reg = registry();
        reg.register("A", Box::new(FakeScreen::instant())).unwrap();

        assert_eq!(reg.issue_show("A", None), Issue::Started);
        assert_eq!(reg.state("A"), Some(ScreenState::Opening));
        assert!(reg.is_busy());

        let notices = reg.drain_messages();
        assert_eq!(
            notices,
            vec![Notice::Finished {
                id: ScreenId::from("A"),
                transition: TransitionKind::In
            }]
        );
        assert_eq!(reg.state("A"), Some(ScreenState::Open));
        assert!(!reg.is_busy());
    }

    #[test]
    fn test_show_passes_payload() {
        let mut reg = registry();
        let screen = FakeScreen::instant();
        let probe = screen.probe();
        reg.register("A", Box::new(screen)).unwrap();
        reg.issue_show("A", Some(&json!({ "gold": 5 })));
        assert_eq!(probe.last_data(), Some(json!({ "gold": 5 })));
    }

    #[test]
    fn test_hide_while_opening_stops_in_transition() {
        let mut reg = registry();
        let screen = FakeScreen::manual();
        let probe = screen.probe();
        reg.register("A", Box::new(screen)).unwrap();

        reg.issue_show("A", None);
        assert_eq!(reg.issue_hide("A", true), Issue::Started);
        assert_eq!(probe.calls(), vec!["show", "stop", "hide"]);
        assert_eq!(reg.transitions().len(), 1);

        // The cancelled in-transition finishing late changes nothing.
        probe.finish_first();
        assert!(reg.drain_messages().is_empty());
        assert_eq!(reg.state("A"), Some(ScreenState::Closing));

        probe.finish_all();
        reg.drain_messages();
        assert_eq!(reg.state("A"), Some(ScreenState::Closed));
        assert!(!reg.is_busy());
    }

    #[test]
    fn test_show_while_closing_is_deferred() {
        let mut reg = registry();
        let screen = FakeScreen::manual();
        let probe = screen.probe();
        reg.register("A", Box::new(screen)).unwrap();
        reg.issue_show("A", None);
        probe.finish_all();
        reg.drain_messages();

        reg.issue_hide("A", true);
        assert_eq!(reg.issue_show("A", Some(&json!(1))), Issue::Deferred);
        assert!(reg.has_deferred_show("A"));
        assert_eq!(probe.calls(), vec!["show", "hide"]);

        probe.finish_all();
        reg.drain_messages();
        assert_eq!(probe.calls(), vec!["show", "hide", "show"]);
        assert_eq!(reg.state("A"), Some(ScreenState::Opening));
        assert_eq!(probe.last_data(), Some(json!(1)));
        assert!(reg.is_busy());
    }

    #[test]
    fn test_hide_cancels_deferred_show() {
        let mut reg = registry();
        let screen = FakeScreen::manual();
        let probe = screen.probe();
        reg.register("A", Box::new(screen)).unwrap();
        reg.issue_show("A", None);
        probe.finish_all();
        reg.drain_messages();

        reg.issue_hide("A", true);
        reg.issue_show("A", None);
        assert_eq!(reg.issue_hide("A", true), Issue::Unchanged);
        probe.finish_all();
        reg.drain_messages();
        assert_eq!(reg.state("A"), Some(ScreenState::Closed));
    }

    #[test]
    fn test_failed_show_resets_state() {
        let mut reg = registry();
        reg.register("A", Box::new(FakeScreen::instant().failing_show()))
            .unwrap();
        assert_eq!(reg.issue_show("A", None), Issue::Failed);
        assert_eq!(reg.state("A"), Some(ScreenState::Closed));
        assert!(!reg.is_busy());
    }

    #[test]
    fn test_hide_each_isolates_failures() {
        let mut reg = registry();
        reg.register("A", Box::new(FakeScreen::instant().failing_hide()))
            .unwrap();
        reg.register("B", Box::new(FakeScreen::instant())).unwrap();
        reg.issue_show("A", None);
        reg.issue_show("B", None);
        reg.drain_messages();

        assert_eq!(reg.hide_each(true), 1);
        assert_eq!(reg.state("B"), Some(ScreenState::Closing));
        assert_eq!(reg.state("A"), Some(ScreenState::Closed));
    }

    #[test]
    fn test_messages_from_unregistered_screen_are_ignored() {
        let mut reg = registry();
        let screen = FakeScreen::manual();
        let probe = screen.probe();
        reg.register("A", Box::new(screen)).unwrap();
        reg.issue_show("A", None);
        reg.unregister("A").unwrap();
        assert!(!reg.is_busy());

        reg.register("A", Box::new(FakeScreen::manual())).unwrap();
        probe.finish_all();
        if let Some(lifeline) = probe.lifeline() {
            lifeline.notify_destroyed();
        }
        assert!(reg.drain_messages().is_empty());
        assert_eq!(reg.state("A"), Some(ScreenState::Closed));
    }

    #[test]
    fn test_destroy_and_close_requests_surface_as_notices() {
        let mut reg = registry();
        let screen = FakeScreen::instant();
        let probe = screen.probe();
        reg.register("A", Box::new(screen)).unwrap();
        let lifeline = probe.lifeline().unwrap();
        lifeline.request_close(false);
        lifeline.notify_destroyed();
        assert_eq!(
            reg.drain_messages(),
            vec![
                Notice::CloseRequested {
                    id: ScreenId::from("A"),
                    animate: false
                },
                Notice::Destroyed {
                    id: ScreenId::from("A")
                },
            ]
        );
    }

    #[test]
    fn test_expire_forces_stalled_transition() {
        let mut reg = registry();
        let screen = FakeScreen::manual();
        let probe = screen.probe();
        reg.register("A", Box::new(screen)).unwrap();
        reg.issue_show("A", None);

        let later = Instant::now() + Duration::from_secs(10);
        let notices = reg.expire(later, Duration::from_secs(5));
        assert_eq!(notices.len(), 1);
        assert_eq!(reg.state("A"), Some(ScreenState::Open));
        assert!(probe.calls().contains(&"stop".to_string()));
        assert!(!reg.is_busy());
    }
}
