//! # Window layer
//!
//! The window stack controller. At most one window is current; requests that
//! can't take the foreground wait in a FIFO queue; windows pushed out of the
//! foreground wait in a LIFO history and come back when the window above them
//! closes.
//!
//! ```text
//!   show(w) ──▶ w is current? ──yes──▶ refuse (logged)
//!                   │ no
//!                   ▼
//!        foreground busy and w not ForceForeground? ──yes──▶ w already queued?
//!                   │ no                              yes: refuse │ no: push_back
//!                   ▼
//!   do_show: supersede current (history / hide / close), show w, current = w,
//!            drop w's older history and queue entries
//!
//!   hide(w) ──▶ w not current? ──yes──▶ refuse (logged)
//!                   │ no
//!                   ▼
//!   hide w, current = none, then queue.pop_front ▸ history.pop ▸ empty
//! ```
//!
//! Popups don't push the current window out of sight, but they still become
//! current; the window underneath goes to history and is resumed (without a
//! new transition, it never closed) when the popup closes. A non-popup taking
//! over from a popup supersedes the windows under it as well, and resuming
//! that popup from history shows them again.
//!
//! Every public operation compares "anything in flight" before and after and
//! emits one [`InputSignal`] per edge, so blocks and unblocks always pair up.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::core::error::NavError;
use crate::core::layer::Layer;
use crate::core::popup::PopupParaLayer;
use crate::core::properties::WindowProperties;
use crate::core::registry::{Issue, Notice, Registry};
use crate::core::screen::{
    LostForeground, ScreenId, ScreenState, TakeForeground, TransitionKind, Window,
    WindowPolicy,
};
use crate::core::transition::InputSignal;

/// A show request frozen with the policy it was resolved to, so the window
/// can be shown again later exactly as first requested.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    id: ScreenId,
    properties: WindowProperties,
    policy: WindowPolicy,
}

impl HistoryEntry {
    pub fn id(&self) -> &ScreenId {
        &self.id
    }

    pub fn properties(&self) -> &WindowProperties {
        &self.properties
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }
}

pub struct WindowLayer {
    registry: Registry<dyn Window>,
    current: Option<HistoryEntry>,
    queue: VecDeque<HistoryEntry>,
    history: Vec<HistoryEntry>,
    popups: PopupParaLayer,
    signals: Vec<InputSignal>,
}

impl Default for WindowLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowLayer {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            current: None,
            queue: VecDeque::new(),
            history: Vec::new(),
            popups: PopupParaLayer::new(),
            signals: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        id: impl Into<ScreenId>,
        window: Box<dyn Window>,
    ) -> Result<(), NavError> {
        let id = id.into();
        let policy = window.policy();
        self.registry.register(id.clone(), window)?;
        if policy.is_popup {
            self.popups.add_screen(&id);
        }
        info!("Registered window '{}' ({:?})", id, policy);
        Ok(())
    }

    /// Unregister a window and drop every pending request for it. If it was
    /// current, the next queued or history entry takes over.
    pub fn unregister(&mut self, id: &str) -> Result<(), NavError> {
        let was_busy = self.registry.is_busy();
        let result = self.forget(id);
        self.sync_input(was_busy);
        result
    }

    fn forget(&mut self, id: &str) -> Result<(), NavError> {
        self.registry.unregister(id)?;
        self.queue.retain(|entry| entry.id.as_str() != id);
        self.history.retain(|entry| entry.id.as_str() != id);
        self.popups.remove_screen(id);
        self.refresh_darken();
        if self.current.as_ref().is_some_and(|entry| entry.id.as_str() == id) {
            self.current = None;
            self.resolve_next();
        }
        info!("Unregistered window '{}'", id);
        Ok(())
    }

    pub fn current_window(&self) -> Option<&ScreenId> {
        self.current.as_ref().map(|entry| &entry.id)
    }

    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.current.as_ref()
    }

    /// Superseded windows, oldest first. Never contains the current window's
    /// own entry.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn history_ids(&self) -> Vec<ScreenId> {
        self.history.iter().map(|entry| entry.id.clone()).collect()
    }

    pub fn queue(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.queue.iter()
    }

    pub fn queued_ids(&self) -> Vec<ScreenId> {
        self.queue.iter().map(|entry| entry.id.clone()).collect()
    }

    pub fn is_window_open(&self, id: &str) -> bool {
        self.registry.is_open(id)
    }

    pub fn state(&self, id: &str) -> Option<ScreenState> {
        self.registry.state(id)
    }

    pub fn popups(&self) -> &PopupParaLayer {
        &self.popups
    }

    pub fn is_background_darkened(&self) -> bool {
        self.popups.is_darkened()
    }

    pub fn is_busy(&self) -> bool {
        self.registry.is_busy()
    }

    pub fn take_signals(&mut self) -> Vec<InputSignal> {
        std::mem::take(&mut self.signals)
    }

    /// Visible non-popup windows, bottom to top.
    pub fn base_render_order(&self) -> Vec<ScreenId> {
        let is_base = |id: &ScreenId| {
            self.registry.is_visible(id.as_str()) && !self.popups.contains(id.as_str())
        };
        let stacked = self
            .history
            .iter()
            .chain(self.current.iter())
            .map(|entry| &entry.id);
        let mut order: Vec<ScreenId> = self
            .registry
            .ids()
            .into_iter()
            .filter(|id| is_base(id))
            .filter(|id| !self.history.iter().chain(self.current.iter()).any(|e| &e.id == id))
            .collect();
        for id in stacked {
            if is_base(id) && !order.contains(id) {
                order.push(id.clone());
            }
        }
        order
    }

    /// Visible popups, bottom to top.
    pub fn popup_render_order(&self) -> Vec<ScreenId> {
        self.popups
            .members()
            .iter()
            .filter(|id| self.registry.is_visible(id.as_str()))
            .cloned()
            .collect()
    }

    pub fn process_messages(&mut self) {
        let was_busy = self.registry.is_busy();
        let notices = self.registry.drain_messages();
        self.react(notices);
        self.sync_input(was_busy);
    }

    pub fn expire_transitions(&mut self, now: Instant, timeout: Duration) {
        let was_busy = self.registry.is_busy();
        let notices = self.registry.expire(now, timeout);
        self.react(notices);
        self.sync_input(was_busy);
    }

    fn react(&mut self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::Finished {
                    id,
                    transition: TransitionKind::Out,
                } => {
                    debug!("Window '{}' finished closing", id);
                    if self.popups.contains(id.as_str()) {
                        self.refresh_darken();
                    }
                }
                Notice::Finished { id, transition } => {
                    debug!("Window '{}' finished {:?} transition", id, transition);
                }
                Notice::CloseRequested { id, animate } => self.request_hide(&id, animate),
                Notice::Destroyed { id } => {
                    info!("Window '{}' was destroyed", id);
                    if let Err(e) = self.forget(id.as_str()) {
                        warn!("Could not unregister destroyed window: {}", e);
                    }
                }
            }
        }
    }

    fn sync_input(&mut self, was_busy: bool) {
        if let Some(signal) = InputSignal::between(was_busy, self.registry.is_busy()) {
            debug!("Input {:?} ({} in flight)", signal, self.registry.transitions().len());
            self.signals.push(signal);
        }
    }

    fn refresh_darken(&mut self) {
        let registry = &self.registry;
        self.popups.refresh_darken(|id| registry.is_open(id));
    }

    fn request_show(&mut self, id: &ScreenId, properties: WindowProperties) {
        if self.current.as_ref().is_some_and(|entry| &entry.id == id) {
            warn!("Window '{}' is already current, ignoring show request", id);
            return;
        }
        let Some(defaults) = self.registry.get(id.as_str()).map(|window| window.policy()) else {
            warn!("Show requested for unknown window '{}'", id);
            return;
        };
        let forced = properties.forces_foreground(defaults);
        let entry = HistoryEntry {
            id: id.clone(),
            policy: properties.resolve_policy(defaults),
            properties,
        };

        let contended = self.current.is_some() || !self.queue.is_empty();
        if contended && !forced {
            if self.queue.iter().any(|queued| &queued.id == id) {
                warn!("Window '{}' is already queued, ignoring show request", id);
                return;
            }
            info!(
                "Window '{}' queued (position {})",
                id,
                self.queue.len() + 1
            );
            self.queue.push_back(entry);
            return;
        }
        if !self.do_show(entry) {
            self.resolve_next();
        }
    }

    /// Put `entry` in the foreground. Returns false if the window refused to
    /// show; `current` is then left empty for the caller to resolve.
    fn do_show(&mut self, entry: HistoryEntry) -> bool {
        if let Some(previous) = self.current.take() {
            if entry.policy.is_popup {
                self.history.push(previous);
            } else {
                // Bottom first, so history keeps its order.
                for covered in self.uncover(previous, &entry.id).into_iter().rev() {
                    self.supersede(covered, &entry);
                }
            }
        }
        // A window is current or stacked, never both.
        self.history.retain(|stacked| stacked.id != entry.id);
        self.queue.retain(|queued| queued.id != entry.id);

        let id = entry.id.clone();
        let issue = self
            .registry
            .issue_show(id.as_str(), entry.properties.data.as_ref());
        if !issue.succeeded() {
            warn!("Window '{}' could not be shown", id);
            return false;
        }
        if entry.policy.is_popup {
            self.popups.darken_background(&id);
        }
        info!("Window '{}' is now current", id);
        self.current = Some(entry);
        true
    }

    fn supersede(&mut self, previous: HistoryEntry, incoming: &HistoryEntry) {
        match incoming.policy.take_foreground {
            TakeForeground::CloseAll => {
                let others: Vec<ScreenId> = self
                    .registry
                    .ids()
                    .into_iter()
                    .filter(|id| id != &incoming.id && self.registry.is_visible(id.as_str()))
                    .collect();
                for id in &others {
                    self.hide_window(id, true);
                }
                self.history.clear();
                debug!("'{}' closed {} other window(s)", incoming.id, others.len());
            }
            TakeForeground::ClosePrevious => self.hide_window(&previous.id, true),
            TakeForeground::None => match previous.policy.lost_foreground {
                LostForeground::StayOpen => self.history.push(previous),
                LostForeground::Hide => {
                    self.hide_window(&previous.id, true);
                    self.history.push(previous);
                }
                LostForeground::Close => self.hide_window(&previous.id, true),
            },
        }
    }

    /// `top` plus every history entry it keeps visible: a popup leaves the
    /// window below it open, and so on down to the first non-popup.
    /// Returned top to bottom; `incoming` is left out.
    fn uncover(&mut self, top: HistoryEntry, incoming: &ScreenId) -> Vec<HistoryEntry> {
        let mut above_is_popup = top.policy.is_popup;
        let mut covered = vec![top];
        while above_is_popup {
            let Some(below) = self.history.pop() else {
                break;
            };
            above_is_popup = below.policy.is_popup;
            if &below.id != incoming {
                covered.push(below);
            }
        }
        covered
    }

    /// Show again whatever a resumed popup sat on, down to the first
    /// non-popup. Already open windows are left alone.
    fn reveal_below(&mut self) {
        for below in self.history.iter().rev() {
            let issue = self
                .registry
                .issue_show(below.id.as_str(), below.properties.data.as_ref());
            if !issue.succeeded() {
                warn!("Window '{}' under a popup could not be shown", below.id);
            }
            if !below.policy.is_popup {
                break;
            }
        }
    }

    fn request_hide(&mut self, id: &ScreenId, animate: bool) {
        if self.current.as_ref().is_none_or(|entry| &entry.id != id) {
            warn!("Window '{}' is not current, ignoring close request", id);
            return;
        }
        self.current = None;
        self.hide_window(id, animate);
        self.resolve_next();
    }

    fn hide_window(&mut self, id: &ScreenId, animate: bool) {
        if self.registry.issue_hide(id.as_str(), animate) == Issue::Failed
            && self.popups.contains(id.as_str())
        {
            self.refresh_darken();
        }
    }

    /// Fill an empty foreground: queue first, then history.
    fn resolve_next(&mut self) {
        while self.current.is_none() {
            let entry = if let Some(queued) = self.queue.pop_front() {
                queued
            } else if let Some(stacked) = self.history.pop() {
                if stacked.policy.is_popup {
                    self.reveal_below();
                }
                stacked
            } else {
                debug!("Window stack is empty");
                return;
            };
            debug!("Resuming window '{}'", entry.id);
            self.do_show(entry);
        }
    }
}

impl Layer for WindowLayer {
    type Surface = dyn Window;
    type Properties = WindowProperties;

    fn registry(&self) -> &Registry<dyn Window> {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut Registry<dyn Window> {
        &mut self.registry
    }

    fn show_screen(&mut self, id: &ScreenId, properties: WindowProperties) {
        let was_busy = self.registry.is_busy();
        self.request_show(id, properties);
        self.sync_input(was_busy);
    }

    fn hide_screen(&mut self, id: &ScreenId, animate: bool) {
        let was_busy = self.registry.is_busy();
        self.request_hide(id, animate);
        self.sync_input(was_busy);
    }

    /// Hide every window and forget the stack: current, history and queue.
    fn hide_all(&mut self, animate: bool) {
        let was_busy = self.registry.is_busy();
        let failures = self.registry.hide_each(animate);
        if failures > 0 {
            warn!("{} window(s) failed to hide", failures);
        }
        self.current = None;
        self.history.clear();
        self.queue.clear();
        self.refresh_darken();
        info!("All windows hidden");
        self.sync_input(was_busy);
    }
}
