//! # Screens
//!
//! A screen is any registrable surface with a show/hide lifecycle. The core
//! never renders anything; it only calls `show`/`hide` and waits for the
//! screen to report that its transition finished.
//!
//! ```text
//!            show()                 Transition::finish()
//!   Closed ─────────▶ Opening ─────────────────────────▶ Open
//!     ▲                  │ hide() (stop_transition first)   │
//!     │                  ▼                                   │ hide()
//!     └─────────────── Closing ◀─────────────────────────────┘
//!      Transition::finish()
//! ```
//!
//! Completion is message based: `Transition::finish()` posts into the owning
//! layer's mailbox and the layer settles it on its next processing step.
//! Finishing from inside `show`/`hide` is therefore safe.

use std::borrow::Borrow;
use std::fmt;
use std::sync::mpsc::Sender;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::ScreenError;

/// Unique (per layer) screen identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(String);

impl ScreenId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScreenId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ScreenId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ScreenId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ScreenId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ScreenId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Lifecycle state of a registered screen, tracked by its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl ScreenState {
    /// Logically open: showing or shown.
    pub fn is_open(self) -> bool {
        matches!(self, ScreenState::Opening | ScreenState::Open)
    }

    /// Anything still on screen, including an out-transition in progress.
    pub fn is_visible(self) -> bool {
        self != ScreenState::Closed
    }

    pub fn is_transitioning(self) -> bool {
        matches!(self, ScreenState::Opening | ScreenState::Closing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    In,
    Out,
}

/// What happens when a window is asked to show while another one is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePriority {
    /// Never queued: always supersedes the current window.
    #[default]
    ForceForeground,
    /// Waits in the FIFO queue until the foreground is free.
    Enqueue,
}

/// What a window does when a newer window takes the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LostForeground {
    /// Stays visible underneath; resumed from history later.
    StayOpen,
    /// Hidden; resumed from history later.
    #[default]
    Hide,
    /// Hidden and forgotten; never resumed.
    Close,
}

/// What a window does to the others when it takes the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakeForeground {
    #[default]
    None,
    ClosePrevious,
    CloseAll,
}

/// Panel priority tier. Each tier maps to its own para-layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelPriority {
    #[default]
    Default,
    Priority,
    SuperPriority,
}

/// Queue and foreground behaviour of a window, either its built-in defaults
/// or the values carried by a show request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowPolicy {
    pub is_popup: bool,
    pub queue_priority: QueuePriority,
    pub lost_foreground: LostForeground,
    pub take_foreground: TakeForeground,
}

impl WindowPolicy {
    pub fn popup() -> Self {
        Self {
            is_popup: true,
            ..Self::default()
        }
    }

    pub fn enqueued() -> Self {
        Self {
            queue_priority: QueuePriority::Enqueue,
            ..Self::default()
        }
    }
}

/// Message posted by a screen (through its handles) to its layer's mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenMessage {
    pub id: ScreenId,
    pub generation: u64,
    pub kind: MessageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Finished { token: u64, transition: TransitionKind },
    CloseRequested { animate: bool },
    Destroyed,
}

fn post(tx: &Sender<ScreenMessage>, message: ScreenMessage) {
    let id = message.id.clone();
    if tx.send(message).is_err() {
        warn!("Dropped message from screen '{}': layer is gone", id);
    }
}

/// Completion handle for one issued transition.
///
/// Keep it until the animation is done, then call [`Transition::finish`].
/// Handles from cancelled transitions may still be finished; the layer
/// ignores them.
#[derive(Debug, Clone)]
pub struct Transition {
    id: ScreenId,
    generation: u64,
    token: u64,
    kind: TransitionKind,
    tx: Sender<ScreenMessage>,
}

impl Transition {
    pub(crate) fn new(
        id: ScreenId,
        generation: u64,
        token: u64,
        kind: TransitionKind,
        tx: Sender<ScreenMessage>,
    ) -> Self {
        Self {
            id,
            generation,
            token,
            kind,
            tx,
        }
    }

    pub fn id(&self) -> &ScreenId {
        &self.id
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn finish(&self) {
        post(
            &self.tx,
            ScreenMessage {
                id: self.id.clone(),
                generation: self.generation,
                kind: MessageKind::Finished {
                    token: self.token,
                    transition: self.kind,
                },
            },
        );
    }
}

/// Handle given to a screen when it is registered: its way back to the layer.
#[derive(Debug, Clone)]
pub struct Lifeline {
    id: ScreenId,
    generation: u64,
    tx: Sender<ScreenMessage>,
}

impl Lifeline {
    pub(crate) fn new(id: ScreenId, generation: u64, tx: Sender<ScreenMessage>) -> Self {
        Self { id, generation, tx }
    }

    pub fn id(&self) -> &ScreenId {
        &self.id
    }

    /// Ask the layer to close this screen. Goes through the normal hide path,
    /// so a window that isn't current is refused.
    pub fn request_close(&self, animate: bool) {
        self.send(MessageKind::CloseRequested { animate });
    }

    /// The screen is being torn down; the layer unregisters it.
    pub fn notify_destroyed(&self) {
        self.send(MessageKind::Destroyed);
    }

    fn send(&self, kind: MessageKind) {
        post(
            &self.tx,
            ScreenMessage {
                id: self.id.clone(),
                generation: self.generation,
                kind,
            },
        );
    }
}

/// A registrable surface.
///
/// `show` and `hide` must return right after starting the transition; the
/// implementation finishes the handed-over [`Transition`] later (or right
/// away for instant transitions).
pub trait Screen {
    /// Called once on successful registration.
    fn on_registered(&mut self, _id: &ScreenId, _lifeline: Lifeline) {}

    fn show(&mut self, data: Option<&Value>, transition: Transition) -> Result<(), ScreenError>;

    fn hide(&mut self, animate: bool, transition: Transition) -> Result<(), ScreenError>;

    /// Abort the running transition. Called before an opening screen is
    /// hidden and when the watchdog gives up on a stalled transition.
    fn stop_transition(&mut self) {}
}

/// A mutually exclusive screen with queue and foreground policies.
pub trait Window: Screen {
    fn policy(&self) -> WindowPolicy {
        WindowPolicy::default()
    }
}

/// A screen that coexists with other panels.
pub trait Panel: Screen {
    fn priority(&self) -> PanelPriority {
        PanelPriority::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_state_predicates() {
        assert!(!ScreenState::Closed.is_visible());
        assert!(ScreenState::Opening.is_open());
        assert!(ScreenState::Opening.is_transitioning());
        assert!(ScreenState::Open.is_open());
        assert!(!ScreenState::Closing.is_open());
        assert!(ScreenState::Closing.is_visible());
    }

    #[test]
    fn test_transition_finish_posts_message() {
        let (tx, rx) = mpsc::channel();
        let transition = Transition::new(ScreenId::from("Map"), 3, 7, TransitionKind::Out, tx);
        transition.finish();
        let message = rx.try_recv().unwrap();
        assert_eq!(message.id, "Map");
        assert_eq!(message.generation, 3);
        assert_eq!(
            message.kind,
            MessageKind::Finished {
                token: 7,
                transition: TransitionKind::Out
            }
        );
    }

    #[test]
    fn test_lifeline_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        let lifeline = Lifeline::new(ScreenId::from("Map"), 1, tx);
        drop(rx);
        // Logged, not panicking.
        lifeline.notify_destroyed();
    }

    #[test]
    fn test_policy_toml_names() {
        let text = "queue_priority = \"enqueue\"\nlost_foreground = \"stay_open\"";
        let policy: WindowPolicy = toml::from_str(text).unwrap();
        assert_eq!(policy.queue_priority, QueuePriority::Enqueue);
        assert_eq!(policy.lost_foreground, LostForeground::StayOpen);
        assert!(!policy.is_popup);
        assert_eq!(policy.take_foreground, TakeForeground::None);
    }
}
