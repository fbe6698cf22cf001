//! Terminal plumbing shared by all widgets.
//!
//! - **backend**: `TerminalBackend` capability and the `Key` enum
//! - **crossterm_backend**: real terminal via crossterm
//! - **screen**: in-memory `VirtualScreen` for tests and demo mode
//! - **session**: `Session`, owner of the backend and the row offset
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── offset (next free row)
//! └── B: TerminalBackend
//!     ├── CrosstermBackend (stdout, raw mode)
//!     └── VirtualScreen    (cell grid, scripted keys)
//! ```

pub mod backend;
pub mod crossterm_backend;
pub mod screen;
pub mod session;
