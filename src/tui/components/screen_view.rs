//! # ScreenView Component
//!
//! Draws one demo screen: a bordered box that grows out of (and shrinks
//! back into) the center of its slot as the transition progresses.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::animated::Phase;
use crate::tui::component::Component;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Window,
    Popup,
    Panel,
}

pub struct ScreenView {
    pub title: String,
    pub note: Option<String>,
    pub phase: Phase,
    pub progress: f32,
    pub role: Role,
    /// Topmost window, drawn highlighted.
    pub focused: bool,
}

impl ScreenView {
    fn border_style(&self) -> Style {
        let color = match self.role {
            Role::Window => Color::Green,
            Role::Popup => Color::Magenta,
            Role::Panel => Color::Blue,
        };
        let style = Style::default().fg(color);
        if self.focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style.add_modifier(Modifier::DIM)
        }
    }

    fn phase_label(&self) -> &'static str {
        match self.phase {
            Phase::Hidden => "hidden",
            Phase::Entering => "opening",
            Phase::Shown => "open",
            Phase::Leaving => "closing",
        }
    }
}

/// Shrink `area` around its center to `progress` (0.0 to 1.0) of its size.
pub fn scale_rect(area: Rect, progress: f32) -> Rect {
    let progress = progress.clamp(0.0, 1.0);
    let width = ((area.width as f32) * progress).round() as u16;
    let height = ((area.height as f32) * progress).round() as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Component for ScreenView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = scale_rect(area, self.progress);
        if area.width < 2 || area.height < 2 {
            return;
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.border_style())
            .title(format!(" {} ", self.title))
            .title_bottom(Line::from(format!(" {} ", self.phase_label())).right_aligned());

        let body = self.note.clone().unwrap_or_default();
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(body).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_scale_rect_centers() {
        let area = Rect::new(0, 0, 40, 20);
        assert_eq!(scale_rect(area, 1.0), area);
        assert_eq!(scale_rect(area, 0.5), Rect::new(10, 5, 20, 10));
        assert_eq!(scale_rect(area, 0.0).width, 0);
        assert_eq!(scale_rect(area, 7.0), area);
    }

    #[test]
    fn test_screen_view_renders_title_and_note() {
        let backend = TestBackend::new(40, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut view = ScreenView {
            title: "Inventory".to_string(),
            note: Some("12 items".to_string()),
            phase: Phase::Shown,
            progress: 1.0,
            role: Role::Window,
            focused: true,
        };
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Inventory"));
        assert!(text.contains("12 items"));
        assert!(text.contains("open"));
    }

    #[test]
    fn test_collapsed_view_draws_nothing() {
        let backend = TestBackend::new(20, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut view = ScreenView {
            title: "Gone".to_string(),
            note: None,
            phase: Phase::Leaving,
            progress: 0.0,
            role: Role::Popup,
            focused: false,
        };
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(!text.contains("Gone"));
    }
}
