//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::core::error::ScreenError;
use crate::core::screen::{
    Lifeline, Panel, PanelPriority, Screen, ScreenId, Transition, Window, WindowPolicy,
};

#[derive(Default)]
struct ProbeState {
    calls: Vec<String>,
    pending: Vec<Transition>,
    lifeline: Option<Lifeline>,
    registered_as: Option<ScreenId>,
    last_data: Option<Value>,
}

/// Shared view into a `FakeScreen` after it has been boxed into a registry.
#[derive(Clone, Default)]
pub struct Probe {
    inner: Rc<RefCell<ProbeState>>,
}

impl Probe {
    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }

    pub fn last_data(&self) -> Option<Value> {
        self.inner.borrow().last_data.clone()
    }

    pub fn lifeline(&self) -> Option<Lifeline> {
        self.inner.borrow().lifeline.clone()
    }

    pub fn registered_as(&self) -> Option<ScreenId> {
        self.inner.borrow().registered_as.clone()
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Finish every transition handed to the screen so far.
    pub fn finish_all(&self) {
        let pending: Vec<Transition> = self.inner.borrow_mut().pending.drain(..).collect();
        for transition in pending {
            transition.finish();
        }
    }

    /// Finish only the oldest outstanding transition.
    pub fn finish_first(&self) {
        let first = {
            let mut state = self.inner.borrow_mut();
            if state.pending.is_empty() {
                None
            } else {
                Some(state.pending.remove(0))
            }
        };
        if let Some(transition) = first {
            transition.finish();
        }
    }
}

/// Screen double. `instant` screens finish each transition as soon as it is
/// issued (the message is still only settled on the next drain); `manual`
/// screens wait for the test to call [`Probe::finish_all`].
pub struct FakeScreen {
    probe: Probe,
    instant: bool,
    fail_show: bool,
    fail_hide: bool,
    policy: WindowPolicy,
    priority: PanelPriority,
}

impl FakeScreen {
    pub fn instant() -> Self {
        Self {
            probe: Probe::default(),
            instant: true,
            fail_show: false,
            fail_hide: false,
            policy: WindowPolicy::default(),
            priority: PanelPriority::Default,
        }
    }

    pub fn manual() -> Self {
        Self {
            instant: false,
            ..Self::instant()
        }
    }

    pub fn with_policy(mut self, policy: WindowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_priority(mut self, priority: PanelPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn failing_show(mut self) -> Self {
        self.fail_show = true;
        self
    }

    pub fn failing_hide(mut self) -> Self {
        self.fail_hide = true;
        self
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }

    fn begin(&mut self, call: &str, fail: bool, transition: Transition) -> Result<(), ScreenError> {
        self.probe.inner.borrow_mut().calls.push(call.to_string());
        if fail {
            return Err(ScreenError(format!("{call} refused")));
        }
        if self.instant {
            transition.finish();
        } else {
            self.probe.inner.borrow_mut().pending.push(transition);
        }
        Ok(())
    }
}

impl Screen for FakeScreen {
    fn on_registered(&mut self, id: &ScreenId, lifeline: Lifeline) {
        let mut state = self.probe.inner.borrow_mut();
        state.registered_as = Some(id.clone());
        state.lifeline = Some(lifeline);
    }

    fn show(&mut self, data: Option<&Value>, transition: Transition) -> Result<(), ScreenError> {
        self.probe.inner.borrow_mut().last_data = data.cloned();
        self.begin("show", self.fail_show, transition)
    }

    fn hide(&mut self, _animate: bool, transition: Transition) -> Result<(), ScreenError> {
        self.begin("hide", self.fail_hide, transition)
    }

    fn stop_transition(&mut self) {
        self.probe.inner.borrow_mut().calls.push("stop".to_string());
    }
}

impl Window for FakeScreen {
    fn policy(&self) -> WindowPolicy {
        self.policy
    }
}

impl Panel for FakeScreen {
    fn priority(&self) -> PanelPriority {
        self.priority
    }
}
