//! # Navigation Core
//!
//! Decides which screens are visible, in what order, and when it is safe to
//! accept the next request. It knows nothing about any specific UI
//! technology: screens are trait objects that start transitions and report
//! back through message handles.
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!                    │            Frame             │
//!                    │ open/close/show/hide, events │
//!                    └──────┬────────────────┬──────┘
//!                           │                │
//!                  ┌────────▼──────┐  ┌──────▼─────────────┐
//!                  │  PanelLayer   │  │    WindowLayer     │
//!                  │ para-layer per│  │ current/queue/     │
//!                  │ priority tier │  │ history + popups   │
//!                  └────────┬──────┘  └──────┬─────────────┘
//!                           │ Registry<dyn _>│
//!                           ▼                ▼
//!                     Screen::show / Screen::hide
//!                           │                ▲
//!                           └─ Transition ───┘  (mpsc mailbox,
//!                              ::finish()        settled on
//!                                                process_messages)
//! ```
//!
//! ## Modules
//!
//! - [`screen`]: ids, states, policies, the `Screen`/`Window`/`Panel` traits
//! - [`registry`]: per-layer screen table and transition bookkeeping
//! - [`window_layer`]: the window stack controller
//! - [`frame`]: the orchestrator the host talks to
//! - [`config`]: settings and demo screen declarations

pub mod config;
pub mod error;
pub mod frame;
pub mod layer;
pub mod panel_layer;
pub mod popup;
pub mod properties;
pub mod registry;
pub mod screen;
pub mod transition;
pub mod window_layer;
