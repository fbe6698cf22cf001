//! Session management
//!
//! A `Session` owns the terminal backend for one interactive run and tracks
//! the next free screen row, so successive widgets stack below each other.
//! When the next widget would run off the bottom, the screen is cleared and
//! drawing starts again from the top.

use tracing::{debug, info, warn};

use super::backend::TerminalBackend;
use crate::error::{InputError, Result};

/// An interactive run against one terminal.
///
/// The backend is initialized on construction and torn down exactly once:
/// by [`Session::close`], by a backend failure, or on drop.
pub struct Session<B: TerminalBackend> {
    backend: B,
    /// Next writable row
    offset: u16,
    rows: u16,
    cols: u16,
    closed: bool,
}

impl<B: TerminalBackend> Session<B> {
    /// Acquire the terminal and start drawing at the top row.
    pub fn new(backend: B) -> Result<Self> {
        Self::with_header(backend, "", "")
    }

    /// Acquire the terminal and print an optional title and subtitle line.
    pub fn with_header(mut backend: B, title: &str, subtitle: &str) -> Result<Self> {
        if let Err(e) = backend.init() {
            let _ = backend.teardown();
            return Err(e);
        }

        let mut session = Self {
            backend,
            offset: 0,
            rows: 0,
            cols: 0,
            closed: false,
        };
        session.guarded(|s| {
            s.refresh_dimensions()?;
            info!("session started ({}x{})", s.cols, s.rows);
            for line in [title, subtitle] {
                if !line.is_empty() {
                    s.line(line)?;
                }
            }
            s.backend.flush()
        })?;
        Ok(session)
    }

    /// Write `text` on the next free row.
    pub fn print(&mut self, text: &str) -> Result<()> {
        self.guarded(|s| {
            s.line(text)?;
            s.backend.flush()
        })
    }

    /// Make sure `n` rows fit below the current offset, clearing the screen if not.
    pub fn ensure_room(&mut self, n: u16) -> Result<()> {
        self.guarded(|s| s.make_room(n))
    }

    /// Flush and release the terminal.
    ///
    /// May only be called once; later calls and any widget operation fail
    /// with [`InputError::SessionClosed`].
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(InputError::SessionClosed);
        }
        self.closed = true;
        let flushed = self.backend.flush();
        let restored = self.backend.teardown();
        info!("session closed");
        flushed.and(restored)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next writable row.
    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// Screen size as `(rows, cols)`, as of the last layout decision.
    pub fn dimensions(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Run a widget operation against the open session.
    ///
    /// A backend failure inside `op` tears the terminal down before the error
    /// is returned, and the session stays closed afterwards.
    pub(crate) fn guarded<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.closed {
            return Err(InputError::SessionClosed);
        }
        let result = op(self);
        if let Err(e) = &result {
            if e.is_backend() {
                self.abandon(e);
            }
        }
        result
    }

    fn abandon(&mut self, cause: &InputError) {
        warn!("terminal failure: {}; restoring terminal", cause);
        if let Err(e) = self.backend.teardown() {
            warn!("teardown after failure also failed: {}", e);
        }
        self.closed = true;
    }

    pub(crate) fn refresh_dimensions(&mut self) -> Result<(u16, u16)> {
        let (rows, cols) = self.backend.dimensions()?;
        self.rows = rows;
        self.cols = cols;
        Ok((rows, cols))
    }

    pub(crate) fn make_room(&mut self, n: u16) -> Result<()> {
        self.refresh_dimensions()?;
        if u32::from(self.offset) + u32::from(n) >= u32::from(self.rows) {
            debug!("screen full at row {} (need {}), clearing", self.offset, n);
            self.backend.clear()?;
            self.offset = 0;
        }
        Ok(())
    }

    /// Hand out the current row and move the offset past it.
    pub(crate) fn take_row(&mut self) -> u16 {
        let row = self.offset;
        self.offset = self.offset.saturating_add(1);
        row
    }

    pub(crate) fn advance(&mut self, n: u16) {
        self.offset = self.offset.saturating_add(n);
    }

    /// Unguarded `print` for use inside widget operations.
    pub(crate) fn line(&mut self, text: &str) -> Result<u16> {
        self.make_room(1)?;
        let row = self.take_row();
        self.backend.write_at(row, 0, text)?;
        Ok(row)
    }
}

impl<B: TerminalBackend> Drop for Session<B> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.backend.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::screen::VirtualScreen;

    #[test]
    fn test_print_stacks_rows() {
        let mut screen = VirtualScreen::new(5, 10);
        let mut session = Session::new(&mut screen).unwrap();
        session.print("one").unwrap();
        session.print("two").unwrap();
        assert_eq!(session.offset(), 2);
        drop(session);

        assert_eq!(screen.row_text(0), "one       ");
        assert_eq!(screen.row_text(1), "two       ");
    }

    #[test]
    fn test_header() {
        let mut screen = VirtualScreen::new(5, 20);
        let session = Session::with_header(&mut screen, "Title", "Sub").unwrap();
        assert_eq!(session.offset(), 2);
        drop(session);

        assert_eq!(screen.row_text(0).trim_end(), "Title");
        assert_eq!(screen.row_text(1).trim_end(), "Sub");
    }

    #[test]
    fn test_print_clears_when_full() {
        let mut screen = VirtualScreen::new(3, 10);
        let mut session = Session::new(&mut screen).unwrap();
        session.print("a").unwrap();
        session.print("b").unwrap();
        // offset == rows - 1, so the next print starts over
        session.print("c").unwrap();
        assert_eq!(session.offset(), 1);
        drop(session);

        assert_eq!(screen.clear_count, 1);
        assert_eq!(screen.row_text(0).trim_end(), "c");
        assert_eq!(screen.row_text(1).trim_end(), "");
    }

    #[test]
    fn test_ensure_room() {
        let mut screen = VirtualScreen::new(10, 10);
        let mut session = Session::new(&mut screen).unwrap();
        session.print("a").unwrap();
        session.print("b").unwrap();
        session.ensure_room(5).unwrap();
        assert_eq!(session.offset(), 2);
        session.ensure_room(8).unwrap();
        assert_eq!(session.offset(), 0);
        drop(session);
        assert_eq!(screen.clear_count, 1);
    }

    #[test]
    fn test_dimensions_follow_resize() {
        let mut screen = VirtualScreen::new(4, 10);
        let mut session = Session::new(&mut screen).unwrap();
        assert_eq!(session.dimensions(), (4, 10));
        session.backend_mut().resize(8, 30);
        session.print("x").unwrap();
        assert_eq!(session.dimensions(), (8, 30));
    }

    #[test]
    fn test_close_once() {
        let mut screen = VirtualScreen::new(4, 10);
        let mut session = Session::new(&mut screen).unwrap();
        assert!(session.backend().is_active());
        session.close().unwrap();
        assert!(session.is_closed());
        assert!(matches!(session.close(), Err(InputError::SessionClosed)));
        assert!(matches!(session.print("late"), Err(InputError::SessionClosed)));
        drop(session);

        assert_eq!(screen.init_count, 1);
        assert_eq!(screen.teardown_count, 1);
        assert!(!screen.is_active());
    }

    #[test]
    fn test_drop_tears_down() {
        let mut screen = VirtualScreen::new(4, 10);
        {
            let mut session = Session::new(&mut screen).unwrap();
            session.print("x").unwrap();
        }
        assert_eq!(screen.teardown_count, 1);
        assert!(!screen.is_active());
    }

    #[test]
    fn test_backend_failure_tears_down() {
        // Zero columns: every write lands out of bounds
        let mut screen = VirtualScreen::new(4, 0);
        let mut session = Session::new(&mut screen).unwrap();
        let err = session.print("x").unwrap_err();
        assert!(matches!(err, InputError::OutOfBounds { .. }));
        assert!(session.is_closed());
        assert!(matches!(session.print("y"), Err(InputError::SessionClosed)));
        drop(session);

        assert_eq!(screen.teardown_count, 1);
    }
}
