//! # Frame
//!
//! The single entry point for the host: one [`PanelLayer`], one
//! [`WindowLayer`], and a queue of [`FrameEvent`]s the host polls after each
//! call. Construct it once at start-up and pass it by reference; there is no
//! global instance.
//!
//! Nothing settles synchronously. Screens post completions into their
//! layer's mailbox and the host calls [`Frame::process_messages`] (or
//! [`Frame::tick`]) from its event loop to apply them.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::core::error::NavError;
use crate::core::layer::Layer;
use crate::core::panel_layer::PanelLayer;
use crate::core::properties::{PanelProperties, WindowProperties};
use crate::core::screen::{Panel, ScreenId, ScreenState, Window};
use crate::core::transition::InputSignal;
use crate::core::window_layer::WindowLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// A window became current while none was.
    FirstWindowOpened,
    /// The last current window went away.
    AllWindowsClosed,
    /// A window transition started while none was running.
    BlockInput,
    /// The last running window transition finished.
    UnblockInput,
}

pub struct Frame {
    panels: PanelLayer,
    windows: WindowLayer,
    events: VecDeque<FrameEvent>,
    input_blocked: bool,
    transition_timeout: Option<Duration>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    pub fn new() -> Self {
        Self::with_layers(PanelLayer::new(), WindowLayer::new())
    }

    pub fn with_layers(panels: PanelLayer, windows: WindowLayer) -> Self {
        Self {
            panels,
            windows,
            events: VecDeque::new(),
            input_blocked: false,
            transition_timeout: None,
        }
    }

    /// Force-complete transitions that run longer than `timeout` on
    /// [`Frame::tick`]. `None` or zero disables the watchdog.
    pub fn with_transition_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transition_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn transition_timeout(&self) -> Option<Duration> {
        self.transition_timeout
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    pub fn register_window(
        &mut self,
        id: impl Into<ScreenId>,
        window: Box<dyn Window>,
    ) -> Result<(), NavError> {
        self.windows.register(id, window)
    }

    pub fn unregister_window(&mut self, id: &str) -> Result<(), NavError> {
        let had_window = self.has_current_window();
        let result = self.windows.unregister(id);
        self.observe(had_window);
        result
    }

    pub fn register_panel(
        &mut self,
        id: impl Into<ScreenId>,
        panel: Box<dyn Panel>,
    ) -> Result<(), NavError> {
        self.panels.register(id, panel)
    }

    pub fn unregister_panel(&mut self, id: &str) -> Result<(), NavError> {
        self.panels.unregister(id)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn open_window(&mut self, id: &str, properties: WindowProperties) -> Result<(), NavError> {
        let had_window = self.has_current_window();
        let result = self.windows.show_by_id(id, properties);
        self.observe(had_window);
        result
    }

    pub fn close_window(&mut self, id: &str, animate: bool) -> Result<(), NavError> {
        let had_window = self.has_current_window();
        let result = self.windows.hide_by_id(id, animate);
        self.observe(had_window);
        result
    }

    /// Close whatever window is current. Does nothing when none is.
    pub fn close_current_window(&mut self, animate: bool) {
        let Some(id) = self.windows.current_window().cloned() else {
            debug!("No current window to close");
            return;
        };
        if let Err(e) = self.close_window(id.as_str(), animate) {
            debug!("Closing current window failed: {}", e);
        }
    }

    pub fn show_panel(&mut self, id: &str, properties: PanelProperties) -> Result<(), NavError> {
        self.panels.show_by_id(id, properties)
    }

    pub fn hide_panel(&mut self, id: &str, animate: bool) -> Result<(), NavError> {
        self.panels.hide_by_id(id, animate)
    }

    /// Hide every panel and window and reset the window stack.
    pub fn hide_all(&mut self, animate: bool) {
        let had_window = self.has_current_window();
        self.panels.hide_all(animate);
        self.windows.hide_all(animate);
        self.observe(had_window);
    }

    // ------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------

    /// Apply every completion, close request and destruction posted since
    /// the last call.
    pub fn process_messages(&mut self) {
        let had_window = self.has_current_window();
        self.panels.process_messages();
        self.windows.process_messages();
        self.observe(had_window);
    }

    /// One host loop step: process messages, then run the watchdog.
    pub fn tick(&mut self, now: Instant) {
        self.process_messages();
        let Some(timeout) = self.transition_timeout else {
            return;
        };
        let had_window = self.has_current_window();
        self.panels.expire_transitions(now, timeout);
        self.windows.expire_transitions(now, timeout);
        self.observe(had_window);
    }

    pub fn poll_event(&mut self) -> Option<FrameEvent> {
        self.events.pop_front()
    }

    pub fn drain_events(&mut self) -> Vec<FrameEvent> {
        self.events.drain(..).collect()
    }

    fn has_current_window(&self) -> bool {
        self.windows.current_window().is_some()
    }

    fn observe(&mut self, had_window: bool) {
        for signal in self.windows.take_signals() {
            let event = match signal {
                InputSignal::Block => FrameEvent::BlockInput,
                InputSignal::Unblock => FrameEvent::UnblockInput,
            };
            self.input_blocked = signal == InputSignal::Block;
            self.events.push_back(event);
        }

        match (had_window, self.has_current_window()) {
            (false, true) => {
                info!("First window opened");
                self.events.push_back(FrameEvent::FirstWindowOpened);
            }
            (true, false) => {
                info!("All windows closed");
                self.events.push_back(FrameEvent::AllWindowsClosed);
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_window_open(&self, id: &str) -> bool {
        self.windows.is_window_open(id)
    }

    pub fn is_panel_open(&self, id: &str) -> bool {
        self.panels.is_panel_visible(id)
    }

    /// Registered in either layer.
    pub fn is_screen_registered(&self, id: &str) -> bool {
        self.windows.is_registered(id) || self.panels.is_registered(id)
    }

    pub fn is_input_blocked(&self) -> bool {
        self.input_blocked
    }

    pub fn current_window(&self) -> Option<&ScreenId> {
        self.windows.current_window()
    }

    pub fn history_ids(&self) -> Vec<ScreenId> {
        self.windows.history_ids()
    }

    pub fn queued_ids(&self) -> Vec<ScreenId> {
        self.windows.queued_ids()
    }

    pub fn window_state(&self, id: &str) -> Option<ScreenState> {
        self.windows.state(id)
    }

    pub fn panel_state(&self, id: &str) -> Option<ScreenState> {
        self.panels.state(id)
    }

    pub fn is_background_darkened(&self) -> bool {
        self.windows.is_background_darkened()
    }

    pub fn veil_under(&self) -> Option<&ScreenId> {
        self.windows.popups().veil_under()
    }

    pub fn panel_render_order(&self) -> Vec<ScreenId> {
        self.panels.render_order()
    }

    pub fn window_render_order(&self) -> Vec<ScreenId> {
        self.windows.base_render_order()
    }

    pub fn popup_render_order(&self) -> Vec<ScreenId> {
        self.windows.popup_render_order()
    }

    pub fn windows(&self) -> &WindowLayer {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut WindowLayer {
        &mut self.windows
    }

    pub fn panels(&self) -> &PanelLayer {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut PanelLayer {
        &mut self.panels
    }
}
