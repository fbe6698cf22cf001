//! Terminal backend using crossterm
//!
//! Drives the real terminal: raw mode, alternate screen, absolute cursor
//! moves and reverse video. Only one instance may own the terminal at a time.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use tracing::{debug, info};

use super::backend::{clip, Key, TerminalBackend};
use crate::error::{InputError, Result};

/// Set while some backend holds raw mode.
static TERMINAL_HELD: AtomicBool = AtomicBool::new(false);

/// Backend writing to stdout through crossterm.
pub struct CrosstermBackend {
    stdout: Stdout,
    /// Whether this instance currently owns the terminal
    initialized: bool,
    /// Last size reported by the terminal, as (rows, cols)
    size: (u16, u16),
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            initialized: false,
            size: (0, 0),
        }
    }

    /// Map a crossterm key event onto a widget key.
    ///
    /// Returns `Ok(None)` for keys the widgets have no use for.
    pub fn map_key(event: &KeyEvent) -> Result<Option<Key>> {
        if event.kind == KeyEventKind::Release {
            return Ok(None);
        }

        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let key = match event.code {
            // Raw mode swallows SIGINT, so surface it ourselves
            KeyCode::Char('c') | KeyCode::Char('C') if ctrl => {
                return Err(InputError::Interrupted);
            }
            KeyCode::Char('j') | KeyCode::Char('m') if ctrl => Some(Key::Enter),
            KeyCode::Char('h') if ctrl => Some(Key::Backspace),
            KeyCode::Char(_) if ctrl => None,
            KeyCode::Char(ch) if ch.is_ascii() => Key::from_byte(ch as u8),
            KeyCode::Enter => Some(Key::Enter),
            KeyCode::Backspace => Some(Key::Backspace),
            KeyCode::Up => Some(Key::ArrowUp),
            KeyCode::Down => Some(Key::ArrowDown),
            KeyCode::Left => Some(Key::ArrowLeft),
            KeyCode::Right => Some(Key::ArrowRight),
            _ => None,
        };
        Ok(key)
    }

    fn check_bounds(&self, row: u16, col: u16) -> Result<()> {
        let (rows, cols) = self.size;
        if row >= rows || col >= cols {
            return Err(InputError::OutOfBounds { row, col, rows, cols });
        }
        Ok(())
    }
}

impl TerminalBackend for CrosstermBackend {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        if TERMINAL_HELD
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(InputError::TerminalBusy);
        }

        debug!("enabling raw mode");
        if let Err(e) = terminal::enable_raw_mode() {
            TERMINAL_HELD.store(false, Ordering::SeqCst);
            return Err(e.into());
        }
        self.initialized = true;

        execute!(
            self.stdout,
            EnterAlternateScreen,
            DisableLineWrap,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        self.dimensions()?;
        info!("terminal acquired ({}x{})", self.size.1, self.size.0);
        Ok(())
    }

    fn teardown(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        // Restore as much as possible even if one step fails
        let _ = execute!(self.stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(self.stdout, Show);
        let _ = execute!(self.stdout, EnableLineWrap);
        let _ = execute!(self.stdout, LeaveAlternateScreen);
        let _ = self.stdout.flush();

        let result = terminal::disable_raw_mode();
        TERMINAL_HELD.store(false, Ordering::SeqCst);
        info!("terminal released");
        result.map_err(InputError::from)
    }

    fn dimensions(&mut self) -> Result<(u16, u16)> {
        let (cols, rows) = terminal::size()?;
        self.size = (rows, cols);
        Ok(self.size)
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str) -> Result<()> {
        self.check_bounds(row, col)?;
        let room = (self.size.1 - col) as usize;
        queue!(self.stdout, MoveTo(col, row), Print(clip(text, room)))?;
        Ok(())
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> Result<()> {
        // The cursor may rest one column past a full row
        let (rows, cols) = self.size;
        if row >= rows || col > cols {
            return Err(InputError::OutOfBounds { row, col, rows, cols });
        }
        queue!(self.stdout, MoveTo(col.min(cols.saturating_sub(1)), row))?;
        Ok(())
    }

    fn set_reverse_video(&mut self, on: bool) -> Result<()> {
        let attr = if on { Attribute::Reverse } else { Attribute::NoReverse };
        queue!(self.stdout, SetAttribute(attr))?;
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        if visible {
            queue!(self.stdout, Show)?;
        } else {
            queue!(self.stdout, Hide)?;
        }
        Ok(())
    }

    fn read_key(&mut self) -> Result<Key> {
        loop {
            match event::read()? {
                Event::Key(key_event) => {
                    if let Some(key) = Self::map_key(&key_event)? {
                        return Ok(key);
                    }
                }
                Event::Resize(cols, rows) => {
                    debug!("resize: {}x{}", cols, rows);
                    self.size = (rows, cols);
                }
                _ => {}
            }
        }
    }

    fn clear(&mut self) -> Result<()> {
        queue!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_char_keys() {
        let event = key_event(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(CrosstermBackend::map_key(&event).unwrap(), Some(Key::Printable(b'a')));

        let event = key_event(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(CrosstermBackend::map_key(&event).unwrap(), Some(Key::Printable(b'A')));

        // Non-ASCII is outside the byte-width model
        let event = key_event(KeyCode::Char('é'), KeyModifiers::NONE);
        assert_eq!(CrosstermBackend::map_key(&event).unwrap(), None);
    }

    #[test]
    fn test_control_keys() {
        let event = key_event(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(
            CrosstermBackend::map_key(&event),
            Err(InputError::Interrupted)
        ));

        let event = key_event(KeyCode::Char('m'), KeyModifiers::CONTROL);
        assert_eq!(CrosstermBackend::map_key(&event).unwrap(), Some(Key::Enter));

        let event = key_event(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(CrosstermBackend::map_key(&event).unwrap(), None);
    }

    #[test]
    fn test_navigation_keys() {
        let cases = [
            (KeyCode::Up, Key::ArrowUp),
            (KeyCode::Down, Key::ArrowDown),
            (KeyCode::Left, Key::ArrowLeft),
            (KeyCode::Right, Key::ArrowRight),
            (KeyCode::Enter, Key::Enter),
            (KeyCode::Backspace, Key::Backspace),
        ];
        for (code, expected) in cases {
            let event = key_event(code, KeyModifiers::NONE);
            assert_eq!(CrosstermBackend::map_key(&event).unwrap(), Some(expected));
        }

        let event = key_event(KeyCode::F(1), KeyModifiers::NONE);
        assert_eq!(CrosstermBackend::map_key(&event).unwrap(), None);
    }

    #[test]
    fn test_release_ignored() {
        let mut event = key_event(KeyCode::Char('a'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(CrosstermBackend::map_key(&event).unwrap(), None);
    }

    #[test]
    fn test_write_requires_known_size() {
        // Before init the size is unknown, so every write is out of bounds
        let mut backend = CrosstermBackend::new();
        assert!(matches!(
            backend.write_at(0, 0, "x"),
            Err(InputError::OutOfBounds { .. })
        ));
    }
}
