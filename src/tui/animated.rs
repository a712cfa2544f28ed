//! # Animated demo screens
//!
//! The terminal stand-in for real screens. Each [`AnimatedScreen`] shares a
//! [`Visual`] with the renderer: `show`/`hide` only record the transition and
//! its start time, the event loop calls [`Visual::advance`] every tick, and
//! the transition is finished once its duration has elapsed.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::core::error::ScreenError;
use crate::core::properties::decode_or_default;
use crate::core::screen::{
    Lifeline, Panel, PanelPriority, Screen, ScreenId, Transition, TransitionKind, Window,
    WindowPolicy,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Entering,
    Shown,
    Leaving,
}

/// Payload the demo screens understand.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
pub struct Note {
    pub note: String,
}

#[derive(Debug)]
pub struct Visual {
    pub title: String,
    pub phase: Phase,
    pub note: Option<String>,
    duration: Duration,
    started: Instant,
    pending: Option<Transition>,
    lifeline: Option<Lifeline>,
}

pub type SharedVisual = Rc<RefCell<Visual>>;

impl Visual {
    pub fn new(title: impl Into<String>, duration: Duration) -> Self {
        Self {
            title: title.into(),
            phase: Phase::Hidden,
            note: None,
            duration,
            started: Instant::now(),
            pending: None,
            lifeline: None,
        }
    }

    pub fn shared(self) -> SharedVisual {
        Rc::new(RefCell::new(self))
    }

    /// How far the surface is drawn, 0.0 (gone) to 1.0 (fully shown).
    pub fn progress(&self, now: Instant) -> f32 {
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (now.saturating_duration_since(self.started).as_secs_f32()
                / self.duration.as_secs_f32())
            .min(1.0)
        };
        match self.phase {
            Phase::Hidden => 0.0,
            Phase::Shown => 1.0,
            Phase::Entering => t,
            Phase::Leaving => 1.0 - t,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn lifeline(&self) -> Option<&Lifeline> {
        self.lifeline.as_ref()
    }

    /// Finish the running transition if its time is up. Returns true if it
    /// did.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.pending.is_none() || now.saturating_duration_since(self.started) < self.duration {
            return false;
        }
        self.settle();
        true
    }

    fn begin(&mut self, transition: Transition, animate: bool) {
        self.phase = match transition.kind() {
            TransitionKind::In => Phase::Entering,
            TransitionKind::Out => Phase::Leaving,
        };
        self.started = Instant::now();
        self.pending = Some(transition);
        if !animate {
            self.settle();
        }
    }

    fn settle(&mut self) {
        if let Some(transition) = self.pending.take() {
            self.phase = match transition.kind() {
                TransitionKind::In => Phase::Shown,
                TransitionKind::Out => Phase::Hidden,
            };
            transition.finish();
        }
    }

    fn stop(&mut self) {
        if self.pending.take().is_some() {
            self.phase = match self.phase {
                Phase::Entering => Phase::Shown,
                Phase::Leaving => Phase::Hidden,
                other => other,
            };
        }
    }
}

pub struct AnimatedScreen {
    visual: SharedVisual,
    animate: bool,
    policy: WindowPolicy,
    priority: PanelPriority,
}

impl AnimatedScreen {
    pub fn new(visual: SharedVisual, animate: bool) -> Self {
        Self {
            visual,
            animate,
            policy: WindowPolicy::default(),
            priority: PanelPriority::Default,
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
}

impl Screen for AnimatedScreen {
    fn on_registered(&mut self, id: &ScreenId, lifeline: Lifeline) {
        debug!("Demo screen '{}' attached", id);
        self.visual.borrow_mut().lifeline = Some(lifeline);
    }

    fn show(&mut self, data: Option<&Value>, transition: Transition) -> Result<(), ScreenError> {
        let note: Note = decode_or_default(transition.id(), data);
        let mut visual = self.visual.borrow_mut();
        visual.note = (!note.note.is_empty()).then_some(note.note);
        visual.begin(transition, self.animate);
        Ok(())
    }

    fn hide(&mut self, animate: bool, transition: Transition) -> Result<(), ScreenError> {
        self.visual
            .borrow_mut()
            .begin(transition, animate && self.animate);
        Ok(())
    }

    fn stop_transition(&mut self) {
        self.visual.borrow_mut().stop();
    }
}

impl Window for AnimatedScreen {
    fn policy(&self) -> WindowPolicy {
        self.policy
    }
}

impl Panel for AnimatedScreen {
    fn priority(&self) -> PanelPriority {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::Frame;
    use crate::core::properties::WindowProperties;
    use crate::core::screen::ScreenState;
    use serde_json::json;

    fn register(frame: &mut Frame, id: &str, ms: u64, animate: bool) -> SharedVisual {
        let visual = Visual::new(id, Duration::from_millis(ms)).shared();
        frame
            .register_window(id, Box::new(AnimatedScreen::new(visual.clone(), animate)))
            .unwrap();
        visual
    }

    #[test]
    fn test_transition_finishes_after_duration() {
        let mut frame = Frame::new();
        let visual = register(&mut frame, "Inventory", 300, true);

        frame.open_window("Inventory", WindowProperties::default()).unwrap();
        assert_eq!(visual.borrow().phase, Phase::Entering);
        assert!(frame.is_input_blocked());

        let start = Instant::now();
        assert!(!visual.borrow_mut().advance(start));
        frame.process_messages();
        assert_eq!(frame.window_state("Inventory"), Some(ScreenState::Opening));

        assert!(visual.borrow_mut().advance(start + Duration::from_secs(1)));
        frame.process_messages();
        assert_eq!(frame.window_state("Inventory"), Some(ScreenState::Open));
        assert_eq!(visual.borrow().phase, Phase::Shown);
        assert!(!frame.is_input_blocked());
    }

    #[test]
    fn test_unanimated_screen_settles_on_next_processing() {
        let mut frame = Frame::new();
        let visual = register(&mut frame, "Settings", 300, false);
        frame.open_window("Settings", WindowProperties::default()).unwrap();
        assert_eq!(visual.borrow().phase, Phase::Shown);
        frame.process_messages();
        assert!(frame.is_window_open("Settings"));
    }

    #[test]
    fn test_note_payload_and_fallback() {
        let mut frame = Frame::new();
        let visual = register(&mut frame, "Mail", 0, false);

        frame
            .open_window("Mail", WindowProperties::with_data(json!({ "note": "3 unread" })))
            .unwrap();
        assert_eq!(visual.borrow().note.as_deref(), Some("3 unread"));

        frame.close_window("Mail", false).unwrap();
        frame.process_messages();
        frame
            .open_window("Mail", WindowProperties::with_data(json!([1, 2])))
            .unwrap();
        assert_eq!(visual.borrow().note, None);
    }

    #[test]
    fn test_progress_follows_phase() {
        let mut visual = Visual::new("Hud", Duration::from_millis(100));
        let now = Instant::now();
        assert_eq!(visual.progress(now), 0.0);
        visual.phase = Phase::Shown;
        assert_eq!(visual.progress(now), 1.0);
    }

    #[test]
    fn test_stop_drops_pending_transition() {
        let mut frame = Frame::new();
        let visual = register(&mut frame, "A", 500, true);
        register(&mut frame, "B", 500, true);

        frame.open_window("A", WindowProperties::default()).unwrap();
        frame.open_window("B", WindowProperties::default()).unwrap();
        // A was stopped mid-entry and is now leaving.
        assert_eq!(visual.borrow().phase, Phase::Leaving);
        assert!(visual.borrow().is_animating());
    }
}
