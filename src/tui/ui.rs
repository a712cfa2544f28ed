use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};

use crate::core::screen::ScreenId;
use crate::tui::animated::SharedVisual;
use crate::tui::component::Component;
use crate::tui::components::{Role, ScreenView, TitleBar};
use crate::tui::demo::Demo;

const PANEL_COLUMN_WIDTH: u16 = 26;
const PANEL_HEIGHT: u16 = 4;

/// Draw order, bottom to top: panels by para-layer, windows, popups below
/// the veil, the veil, the remaining popups.
pub fn draw_ui(frame: &mut Frame, demo: &mut Demo, now: Instant) {
    use Constraint::{Length, Min};
    let [title_area, main_area, help_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());
    let [stage, panel_column] =
        Layout::horizontal([Min(0), Length(PANEL_COLUMN_WIDTH)]).areas(main_area);

    let nav = demo.nav();
    let current = nav.current_window().cloned();

    for (index, id) in nav.panel_render_order().iter().enumerate() {
        let slot = Rect {
            y: panel_column.y + index as u16 * (PANEL_HEIGHT - 1),
            height: PANEL_HEIGHT,
            ..panel_column
        }
        .intersection(panel_column);
        if let Some(visual) = demo.panel_visual(id.as_str()) {
            draw_screen(frame, slot, visual, Role::Panel, false, now);
        }
    }

    for (index, id) in nav.window_render_order().iter().enumerate() {
        let slot = cascade(centered_rect(70, 70, stage), index).intersection(stage);
        if let Some(visual) = demo.window_visual(id.as_str()) {
            let focused = current.as_ref() == Some(id);
            draw_screen(frame, slot, visual, Role::Window, focused, now);
        }
    }

    let popups = nav.popup_render_order();
    let veil_at = if nav.is_background_darkened() {
        nav.veil_under()
            .and_then(|under| popups.iter().position(|id| id == under))
    } else {
        None
    };
    for (index, id) in popups.iter().enumerate() {
        if veil_at == Some(index) {
            draw_veil(frame, main_area);
        }
        let slot = cascade(centered_rect(45, 35, stage), index).intersection(stage);
        if let Some(visual) = demo.window_visual(id.as_str()) {
            let focused = current.as_ref() == Some(id);
            draw_screen(frame, slot, visual, Role::Popup, focused, now);
        }
    }

    let mut title_bar = TitleBar {
        current: current.map(|id| id.to_string()),
        history: names(&nav.history_ids()),
        queue: names(&nav.queued_ids()),
        input_blocked: nav.is_input_blocked(),
        status_message: demo.status_message.clone(),
    };
    title_bar.render(frame, title_area);
    demo.controls.render(frame, help_area);
}

fn names(ids: &[ScreenId]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

fn draw_screen(
    frame: &mut Frame,
    area: Rect,
    visual: &SharedVisual,
    role: Role,
    focused: bool,
    now: Instant,
) {
    let visual = visual.borrow();
    let mut view = ScreenView {
        title: visual.title.clone(),
        note: visual.note.clone(),
        phase: visual.phase,
        progress: visual.progress(now),
        role,
        focused,
    };
    view.render(frame, area);
}

fn draw_veil(frame: &mut Frame, area: Rect) {
    frame.buffer_mut().set_style(
        area,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
    );
}

/// Shift each stacked surface a little down and right of the one below.
fn cascade(area: Rect, index: usize) -> Rect {
    let step = index.min(8) as u16;
    Rect {
        x: area.x + step * 2,
        y: area.y + step,
        ..area
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
