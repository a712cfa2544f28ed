//! # Show-time properties
//!
//! Payloads passed with a show request. The policy fields only take effect
//! when `suppress_defaults` is set; otherwise the window's own defaults win.
//! The opaque `data` is handed to the screen, which decodes it into whatever
//! shape it expects with [`decode_or`] / [`decode_or_default`].

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::screen::{QueuePriority, ScreenId, WindowPolicy};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowProperties {
    /// Use `policy` from this payload instead of the window's defaults.
    pub suppress_defaults: bool,
    pub policy: WindowPolicy,
    pub data: Option<Value>,
}

impl WindowProperties {
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Properties whose policy overrides the window's built-in one.
    pub fn overriding(policy: WindowPolicy) -> Self {
        Self {
            suppress_defaults: true,
            policy,
            data: None,
        }
    }

    pub fn resolve_policy(&self, defaults: WindowPolicy) -> WindowPolicy {
        if self.suppress_defaults {
            self.policy
        } else {
            defaults
        }
    }

    pub fn forces_foreground(&self, defaults: WindowPolicy) -> bool {
        self.resolve_policy(defaults).queue_priority == QueuePriority::ForceForeground
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelProperties {
    pub data: Option<Value>,
}

impl PanelProperties {
    pub fn with_data(data: Value) -> Self {
        Self { data: Some(data) }
    }
}

/// Decode a payload into `T`, falling back to `fallback` when there is no
/// payload or its shape doesn't match.
pub fn decode_or<T: DeserializeOwned>(id: &ScreenId, data: Option<&Value>, fallback: T) -> T {
    let Some(value) = data else {
        return fallback;
    };
    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(
                "Screen '{}' got properties of the wrong shape ({}), using defaults",
                id, e
            );
            fallback
        }
    }
}

pub fn decode_or_default<T: DeserializeOwned + Default>(id: &ScreenId, data: Option<&Value>) -> T {
    decode_or(id, data, T::default())
}
