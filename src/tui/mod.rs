//! # TUI Adapter
//!
//! The ratatui-specific layer: terminal I/O, animated demo screens, drawing,
//! and translating keys into navigation commands. This is the only module
//! that knows about ratatui and crossterm; the core never sees a terminal.
//!
//! ## Loop
//!
//! Each pass advances animations (finishing the transitions whose time is
//! up), lets the `Frame` settle the posted completions, redraws if anything
//! changed, then waits for input:
//!
//! - **Animating**: polls every ~60ms (about 16 fps) and redraws each pass.
//! - **Idle**: sleeps up to 250ms and only redraws on input or state change.

mod animated;
mod component;
mod components;
mod demo;
mod event;
mod ui;

use log::info;
use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::config::ResolvedConfig;
use crate::tui::demo::Demo;
use crate::tui::event::{poll_event_immediate, poll_event_timeout};

const FRAME_INTERVAL: Duration = Duration::from_millis(60);
const IDLE_INTERVAL: Duration = Duration::from_millis(250);

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Disambiguated escape codes make a lone Esc arrive immediately.
        execute!(
            stdout(),
            Hide,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (hidden cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, Show);
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut demo = Demo::from_config(&config);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let mut needs_redraw = true;
    loop {
        let now = Instant::now();
        if demo.step(now) {
            needs_redraw = true;
        }
        let animating = demo.is_animating();

        if animating || needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &mut demo, now))?;
            needs_redraw = false;
        }

        let timeout = if animating { FRAME_INTERVAL } else { IDLE_INTERVAL };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain everything pending before the next draw
        let should_quit = first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
            .any(|event| demo.handle(&event));
        if should_quit {
            break;
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}
