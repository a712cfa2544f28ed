//! # Controls Component
//!
//! Key bindings for the demo, and the help line that lists them.
//!
//! Windows get the digits `1`-`9` in declaration order, panels get the
//! bottom-row letters. Everything else is fixed:
//!
//! | key      | command                                     |
//! |----------|---------------------------------------------|
//! | `Esc`    | close the current window                    |
//! | `r`      | current window asks to close itself         |
//! | `k`      | current window is destroyed (unregistered)  |
//! | `a`      | hide everything                             |
//! | `q`      | quit                                        |

use log::warn;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const PANEL_KEYS: [char; 7] = ['z', 'x', 'c', 'v', 'b', 'n', 'm'];
const WINDOW_KEYS: [char; 9] = ['1', '2', '3', '4', '5', '6', '7', '8', '9'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenWindow(String),
    TogglePanel(String),
    CloseCurrent,
    RequestClose,
    DestroyCurrent,
    HideAll,
    Quit,
}

impl Command {
    /// Commands that still go through while input is blocked.
    pub fn bypasses_block(&self) -> bool {
        matches!(self, Command::Quit)
    }
}

pub struct Controls {
    windows: Vec<(char, String)>,
    panels: Vec<(char, String)>,
    /// Dims the help line.
    pub input_blocked: bool,
}

impl Controls {
    pub fn new<'a>(
        window_ids: impl IntoIterator<Item = &'a str>,
        panel_ids: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            windows: bind(&WINDOW_KEYS, window_ids, "window"),
            panels: bind(&PANEL_KEYS, panel_ids, "panel"),
            input_blocked: false,
        }
    }

    pub fn window_key(&self, id: &str) -> Option<char> {
        self.windows
            .iter()
            .find(|(_, bound)| bound == id)
            .map(|(key, _)| *key)
    }
}

fn bind<'a>(
    keys: &[char],
    ids: impl IntoIterator<Item = &'a str>,
    kind: &str,
) -> Vec<(char, String)> {
    let ids: Vec<&str> = ids.into_iter().collect();
    if ids.len() > keys.len() {
        warn!(
            "Only the first {} {}s get a key binding ({} declared)",
            keys.len(),
            kind,
            ids.len()
        );
    }
    keys.iter()
        .copied()
        .zip(ids.into_iter().map(str::to_string))
        .collect()
}

impl EventHandler for Controls {
    type Event = Command;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Command> {
        match event {
            TuiEvent::ForceQuit | TuiEvent::Key('q') => Some(Command::Quit),
            TuiEvent::Escape => Some(Command::CloseCurrent),
            TuiEvent::Key('a') => Some(Command::HideAll),
            TuiEvent::Key('r') => Some(Command::RequestClose),
            TuiEvent::Key('k') => Some(Command::DestroyCurrent),
            TuiEvent::Key(c) => {
                if let Some((_, id)) = self.windows.iter().find(|(key, _)| key == c) {
                    return Some(Command::OpenWindow(id.clone()));
                }
                self.panels
                    .iter()
                    .find(|(key, _)| key == c)
                    .map(|(_, id)| Command::TogglePanel(id.clone()))
            }
            TuiEvent::Resize => None,
        }
    }
}

impl Component for Controls {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default().fg(Color::Yellow);
        let mut spans = Vec::new();
        let bindings = self
            .windows
            .iter()
            .chain(self.panels.iter())
            .map(|(key, id)| (key.to_string(), id.as_str()))
            .chain([
                ("Esc".to_string(), "close"),
                ("r".to_string(), "self-close"),
                ("k".to_string(), "destroy"),
                ("a".to_string(), "hide all"),
                ("q".to_string(), "quit"),
            ]);
        for (key, label) in bindings {
            spans.push(Span::styled(key, key_style));
            spans.push(Span::raw(format!(" {label}  ")));
        }
        let mut line = Line::from(spans);
        if self.input_blocked {
            line = line.style(Style::default().add_modifier(Modifier::DIM));
        }
        frame.render_widget(line, area);
    }
}
