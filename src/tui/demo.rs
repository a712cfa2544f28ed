//! # Demo state
//!
//! Everything the terminal front end keeps between ticks: the navigation
//! [`Frame`], the visuals shared with each registered screen, the key
//! bindings and the last status message.

use std::time::Instant;

use log::{debug, error, info, warn};
use serde_json::json;

use crate::core::config::ResolvedConfig;
use crate::core::frame::{Frame, FrameEvent};
use crate::core::panel_layer::PanelLayer;
use crate::core::properties::{PanelProperties, WindowProperties};
use crate::core::screen::{Lifeline, ScreenId};
use crate::core::window_layer::WindowLayer;
use crate::tui::animated::{AnimatedScreen, SharedVisual, Visual};
use crate::tui::component::EventHandler;
use crate::tui::components::{Command, Controls};
use crate::tui::event::TuiEvent;

pub struct Demo {
    frame: Frame,
    windows: Vec<(ScreenId, SharedVisual)>,
    panels: Vec<(ScreenId, SharedVisual)>,
    pub controls: Controls,
    pub status_message: String,
    opened: u32,
}

impl Demo {
    /// Register every configured screen. Screens that fail to register are
    /// logged and left out.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let panel_layer = PanelLayer::with_para_layers(config.para_layers.iter().copied());
        let mut frame = Frame::with_layers(panel_layer, WindowLayer::new())
            .with_transition_timeout(config.transition_timeout);
        let mut status_message = String::new();

        let mut windows = Vec::new();
        for entry in &config.windows {
            let visual = Visual::new(entry.title(), entry.transition()).shared();
            let screen =
                AnimatedScreen::new(visual.clone(), config.animate).with_policy(entry.policy());
            match frame.register_window(entry.id.as_str(), Box::new(screen)) {
                Ok(()) => windows.push((ScreenId::from(entry.id.as_str()), visual)),
                Err(e) => {
                    error!("Skipping window '{}': {}", entry.id, e);
                    status_message = e.to_string();
                }
            }
        }

        let mut panels = Vec::new();
        for entry in &config.panels {
            let visual = Visual::new(entry.title(), entry.transition()).shared();
            let screen =
                AnimatedScreen::new(visual.clone(), config.animate).with_priority(entry.priority());
            match frame.register_panel(entry.id.as_str(), Box::new(screen)) {
                Ok(()) => panels.push((ScreenId::from(entry.id.as_str()), visual)),
                Err(e) => {
                    error!("Skipping panel '{}': {}", entry.id, e);
                    status_message = e.to_string();
                }
            }
        }

        let controls = Controls::new(
            windows.iter().map(|(id, _)| id.as_str()),
            panels.iter().map(|(id, _)| id.as_str()),
        );
        info!(
            "Demo ready: {} window(s), {} panel(s)",
            windows.len(),
            panels.len()
        );

        Self {
            frame,
            windows,
            panels,
            controls,
            status_message,
            opened: 0,
        }
    }

    pub fn nav(&self) -> &Frame {
        &self.frame
    }

    pub fn window_visual(&self, id: &str) -> Option<&SharedVisual> {
        find(&self.windows, id)
    }

    pub fn panel_visual(&self, id: &str) -> Option<&SharedVisual> {
        find(&self.panels, id)
    }

    pub fn is_animating(&self) -> bool {
        self.all_visuals().any(|visual| visual.borrow().is_animating())
    }

    /// Advance animations, settle what they finished, run the watchdog and
    /// pick up frame events. Returns true if anything changed.
    pub fn step(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for visual in self.all_visuals() {
            changed |= visual.borrow_mut().advance(now);
        }
        self.frame.tick(now);

        for event in self.frame.drain_events() {
            changed = true;
            match event {
                FrameEvent::FirstWindowOpened => {
                    self.status_message = "First window opened".to_string()
                }
                FrameEvent::AllWindowsClosed => {
                    self.status_message = "All windows closed".to_string()
                }
                FrameEvent::BlockInput | FrameEvent::UnblockInput => debug!("{:?}", event),
            }
        }
        self.controls.input_blocked = self.frame.is_input_blocked();
        changed
    }

    /// Route a terminal event. Returns true when the demo should quit.
    pub fn handle(&mut self, event: &TuiEvent) -> bool {
        let Some(command) = self.controls.handle_event(event) else {
            return false;
        };
        if self.frame.is_input_blocked() && !command.bypasses_block() {
            debug!("Input blocked, dropping {:?}", command);
            return false;
        }
        self.apply(command)
    }

    fn apply(&mut self, command: Command) -> bool {
        debug!("Applying {:?}", command);
        let result = match command {
            Command::Quit => return true,
            Command::OpenWindow(id) => {
                self.opened += 1;
                let note = format!("request #{}", self.opened);
                let properties = WindowProperties::with_data(json!({ "note": note }));
                self.frame.open_window(&id, properties)
            }
            Command::TogglePanel(id) => {
                if self.frame.is_panel_open(&id) {
                    self.frame.hide_panel(&id, true)
                } else {
                    self.frame.show_panel(&id, PanelProperties::default())
                }
            }
            Command::CloseCurrent => {
                self.frame.close_current_window(true);
                Ok(())
            }
            Command::HideAll => {
                self.frame.hide_all(true);
                Ok(())
            }
            Command::RequestClose => {
                self.with_current_lifeline(|lifeline| lifeline.request_close(true));
                Ok(())
            }
            Command::DestroyCurrent => {
                self.with_current_lifeline(|lifeline| lifeline.notify_destroyed());
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!("{}", e);
            self.status_message = e.to_string();
        }
        false
    }

    fn with_current_lifeline(&self, f: impl FnOnce(&Lifeline)) {
        let Some(current) = self.frame.current_window() else {
            debug!("No current window");
            return;
        };
        match self.window_visual(current.as_str()) {
            Some(visual) => {
                if let Some(lifeline) = visual.borrow().lifeline() {
                    f(lifeline);
                }
            }
            None => warn!("No visual for window '{}'", current),
        }
    }

    fn all_visuals(&self) -> impl Iterator<Item = &SharedVisual> {
        self.windows
            .iter()
            .chain(self.panels.iter())
            .map(|(_, visual)| visual)
    }
}

fn find<'a>(list: &'a [(ScreenId, SharedVisual)], id: &str) -> Option<&'a SharedVisual> {
    list.iter()
        .find(|(entry, _)| entry.as_str() == id)
        .map(|(_, visual)| visual)
}
