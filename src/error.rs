//! Error type shared by the session, the backends and the widgets.
//!
//! Errors fall into two families:
//!
//! - **usage** errors: the caller broke a precondition (empty menu, session
//!   already closed). Nothing was drawn and nothing needs cleaning up.
//! - **backend** errors: the terminal itself failed. The session tears the
//!   backend down before the error reaches the caller.
//!
//! A value rejected by a validator is not an error at all; the text field
//! re-prompts until the input is accepted.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("session is already closed")]
    SessionClosed,

    #[error("cannot select from an empty list")]
    EmptyMenu,

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("write at row {row}, column {col} is outside the {rows}x{cols} screen")]
    OutOfBounds { row: u16, col: u16, rows: u16, cols: u16 },

    #[error("terminal is already owned by another session")]
    TerminalBusy,

    #[error("no more input available")]
    InputExhausted,

    #[error("interrupted by user")]
    Interrupted,
}

impl InputError {
    /// Caller-side precondition violations.
    pub fn is_usage(&self) -> bool {
        matches!(self, InputError::SessionClosed | InputError::EmptyMenu)
    }

    /// Failures that leave the terminal in an unknown state.
    pub fn is_backend(&self) -> bool {
        !self.is_usage()
    }
}

pub type Result<T> = std::result::Result<T, InputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(InputError::SessionClosed.is_usage());
        assert!(InputError::EmptyMenu.is_usage());
        assert!(InputError::TerminalBusy.is_backend());
        assert!(InputError::Interrupted.is_backend());
        assert!(InputError::from(io::Error::new(io::ErrorKind::Other, "boom")).is_backend());
    }

    #[test]
    fn test_out_of_bounds_message() {
        let err = InputError::OutOfBounds { row: 30, col: 0, rows: 24, cols: 80 };
        assert_eq!(
            err.to_string(),
            "write at row 30, column 0 is outside the 24x80 screen"
        );
    }
}
