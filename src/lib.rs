//! clinput - interactive input widgets for character-grid terminals
//!
//! A [`Session`] owns the terminal for one run and stacks widgets down the
//! screen, clearing it when the next widget would not fit.
//!
//! # Widgets
//!
//! - [`TextField`]: append/backspace line editor, optional mask and validator
//! - [`SelectionMenu`]: wraparound single-select list with scrolling
//! - [`prompts`]: email, integer, float and password fields
//!
//! # Example
//!
//! ```ignore
//! use clinput::{prompts, CrosstermBackend, SelectionMenu, Session};
//!
//! let mut session = Session::with_header(CrosstermBackend::new(), "Submit", "")?;
//! let email = prompts::email(&mut session)?;
//! let project = SelectionMenu::select(&mut session, &["pset1", "final"], "Project")?;
//! session.close()?;
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod ui;

pub use crate::core::backend::{Key, TerminalBackend};
pub use crate::core::crossterm_backend::CrosstermBackend;
pub use crate::core::screen::VirtualScreen;
pub use crate::core::session::Session;
pub use crate::error::{InputError, Result};
pub use crate::ui::{prompts, SelectionMenu, TextField, Validator};
