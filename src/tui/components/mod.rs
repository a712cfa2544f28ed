//! # TUI Components
//!
//! Stateless components are pure props-in-struct renderers:
//! - `TitleBar`: window stack summary
//! - `ScreenView`: a single animated screen
//!
//! `Controls` is also an [`EventHandler`](crate::tui::component::EventHandler):
//! it turns key presses into [`Command`]s and renders the help line.
//!
//! ```text
//! components/
//! ├── mod.rs          (this file)
//! ├── title_bar.rs    (top status line)
//! ├── screen_view.rs  (window / popup / panel box)
//! └── controls.rs     (key bindings + help line)
//! ```

mod controls;
mod screen_view;
mod title_bar;

pub use controls::{Command, Controls};
pub use screen_view::{Role, ScreenView};
pub use title_bar::TitleBar;
