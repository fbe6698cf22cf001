//! Terminal backend capability
//!
//! The widgets never talk to a terminal directly. They go through
//! [`TerminalBackend`], which exposes just enough of a character grid to
//! draw rows, toggle reverse video and read one key at a time.

use crate::error::Result;

/// A decoded key press.
///
/// Backends collapse whatever their terminal reports into this closed set;
/// anything else is dropped before it reaches a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable ASCII byte (space included).
    Printable(u8),
    /// Carriage return or line feed.
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Decode a raw input byte the way a cooked line discipline would.
    pub fn from_byte(byte: u8) -> Option<Key> {
        match byte {
            b'\r' | b'\n' => Some(Key::Enter),
            0x08 | 0x7F => Some(Key::Backspace),
            0x20..=0x7E => Some(Key::Printable(byte)),
            _ => None,
        }
    }

    /// Keys for every byte of `text`, skipping bytes with no key meaning.
    pub fn sequence(text: &str) -> Vec<Key> {
        text.bytes().filter_map(Key::from_byte).collect()
    }
}

/// Character-grid terminal consumed by the session and the widgets.
///
/// Coordinates are zero-based `(row, col)`. Writes never wrap: text running
/// past the right edge is clipped.
pub trait TerminalBackend {
    /// Enter raw, non-echoing input mode.
    fn init(&mut self) -> Result<()>;

    /// Leave raw mode and restore the terminal.
    fn teardown(&mut self) -> Result<()>;

    /// Current `(rows, cols)`. Queried fresh before layout decisions.
    fn dimensions(&mut self) -> Result<(u16, u16)>;

    fn write_at(&mut self, row: u16, col: u16, text: &str) -> Result<()>;

    fn move_cursor(&mut self, row: u16, col: u16) -> Result<()>;

    fn set_reverse_video(&mut self, on: bool) -> Result<()>;

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()>;

    /// Block until the next key.
    fn read_key(&mut self) -> Result<Key>;

    fn clear(&mut self) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

impl<B: TerminalBackend + ?Sized> TerminalBackend for &mut B {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }

    fn teardown(&mut self) -> Result<()> {
        (**self).teardown()
    }

    fn dimensions(&mut self) -> Result<(u16, u16)> {
        (**self).dimensions()
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str) -> Result<()> {
        (**self).write_at(row, col, text)
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> Result<()> {
        (**self).move_cursor(row, col)
    }

    fn set_reverse_video(&mut self, on: bool) -> Result<()> {
        (**self).set_reverse_video(on)
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        (**self).set_cursor_visible(visible)
    }

    fn read_key(&mut self) -> Result<Key> {
        (**self).read_key()
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Longest prefix of `text` that fits in `width` bytes without splitting a char.
pub(crate) fn clip(text: &str, width: usize) -> &str {
    if text.len() <= width {
        return text;
    }
    let mut end = width;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
