//! # TitleBar Component
//!
//! Top status line summarizing the window stack.
//!
//! Stateless: every field is a prop filled from the `Frame` right before
//! drawing. Segments are dropped from the right on narrow terminals by
//! ratatui's own clipping, so the most useful ones come first:
//!
//! 1. current window
//! 2. `INPUT BLOCKED` while a window transition runs
//! 3. history and queue (only when non-empty)
//! 4. the last status message

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    pub current: Option<String>,
    pub history: Vec<String>,
    pub queue: Vec<String>,
    pub input_blocked: bool,
    pub status_message: String,
}

impl TitleBar {
    fn spans(&self) -> Vec<Span<'static>> {
        let separator = || Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![
            Span::styled("screenstack", Style::default().add_modifier(Modifier::BOLD)),
            separator(),
            Span::raw(format!(
                "current: {}",
                self.current.as_deref().unwrap_or("-")
            )),
        ];
        if self.input_blocked {
            spans.push(separator());
            spans.push(Span::styled(
                "INPUT BLOCKED",
                Style::default().fg(Color::Yellow),
            ));
        }
        if !self.history.is_empty() {
            spans.push(separator());
            spans.push(Span::raw(format!("history: {}", self.history.join(" > "))));
        }
        if !self.queue.is_empty() {
            spans.push(separator());
            spans.push(Span::raw(format!("queue: {}", self.queue.join(", "))));
        }
        if !self.status_message.is_empty() {
            spans.push(separator());
            spans.push(Span::styled(
                self.status_message.clone(),
                Style::default().fg(Color::Cyan),
            ));
        }
        spans
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Line::from(self.spans()), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(140, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_empty_stack() {
        let mut title_bar = TitleBar {
            current: None,
            history: Vec::new(),
            queue: Vec::new(),
            input_blocked: false,
            status_message: String::new(),
        };
        let text = draw(&mut title_bar);
        assert!(text.contains("current: -"));
        assert!(!text.contains("history"));
        assert!(!text.contains("BLOCKED"));
    }

    #[test]
    fn test_title_bar_full_stack() {
        let mut title_bar = TitleBar {
            current: Some("Settings".to_string()),
            history: vec!["Inventory".to_string(), "Map".to_string()],
            queue: vec!["Mail".to_string()],
            input_blocked: true,
            status_message: "First window opened".to_string(),
        };
        let text = draw(&mut title_bar);
        assert!(text.contains("current: Settings"));
        assert!(text.contains("INPUT BLOCKED"));
        assert!(text.contains("history: Inventory > Map"));
        assert!(text.contains("queue: Mail"));
        assert!(text.contains("First window opened"));
    }
}
