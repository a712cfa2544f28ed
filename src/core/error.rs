use std::fmt;

use crate::core::screen::{PanelPriority, ScreenId};

/// Errors returned by the registry and layers.
///
/// Protocol violations (closing a window that isn't current, re-showing the
/// current window) are not errors: they are logged and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// A screen with this id is already registered on the layer.
    DuplicateId(ScreenId),
    /// No screen with this id is registered on the layer.
    NotRegistered(ScreenId),
    /// The panel's priority tier has no para-layer configured. Wiring mistake.
    UnmappedPriority { id: ScreenId, priority: PanelPriority },
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::DuplicateId(id) => write!(f, "screen '{id}' is already registered"),
            NavError::NotRegistered(id) => write!(f, "screen '{id}' is not registered"),
            NavError::UnmappedPriority { id, priority } => {
                write!(f, "panel '{id}' has priority {priority:?} with no para-layer")
            }
        }
    }
}

impl std::error::Error for NavError {}

/// Failure raised by a screen implementation while starting a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenError(pub String);

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen error: {}", self.0)
    }
}

impl std::error::Error for ScreenError {}
