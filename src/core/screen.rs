//! In-memory terminal backend
//!
//! `VirtualScreen` keeps a cell grid instead of talking to a terminal.
//! Keys come from a script queued up front. It backs the unit tests and the
//! binary's `--demo` mode.

use std::collections::VecDeque;
use std::fmt::Write as _;

use bitflags::bitflags;

use super::backend::{clip, Key, TerminalBackend};
use crate::error::{InputError, Result};

bitflags! {
    /// Cell attributes
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AttrFlags: u8 {
        const INVERSE = 0b0000_0001;
    }
}

/// A single screen cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: u8,
    pub flags: AttrFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: b' ', flags: AttrFlags::empty() }
    }
}

/// One recorded `write_at` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRecord {
    pub row: u16,
    pub col: u16,
    pub text: String,
    pub inverse: bool,
}

/// Headless terminal with a scripted keyboard.
pub struct VirtualScreen {
    rows: u16,
    cols: u16,
    cells: Vec<Vec<Cell>>,
    cursor: (u16, u16),
    cursor_visible: bool,
    current: AttrFlags,
    keys: VecDeque<Key>,
    keys_read: usize,
    /// `(after, rows, cols)`: resize once `after` keys have been read
    scripted_resize: Option<(usize, u16, u16)>,
    writes: Vec<WriteRecord>,
    cursor_toggles: Vec<bool>,
    active: bool,
    pub init_count: usize,
    pub teardown_count: usize,
    pub clear_count: usize,
    pub flush_count: usize,
    /// Keys handed out while the cursor was hidden
    pub hidden_reads: usize,
}

impl VirtualScreen {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![Cell::default(); cols as usize]; rows as usize],
            cursor: (0, 0),
            cursor_visible: true,
            current: AttrFlags::empty(),
            keys: VecDeque::new(),
            keys_read: 0,
            scripted_resize: None,
            writes: Vec::new(),
            cursor_toggles: Vec::new(),
            active: false,
            init_count: 0,
            teardown_count: 0,
            clear_count: 0,
            flush_count: 0,
            hidden_reads: 0,
        }
    }

    /// Queue keys to be returned by `read_key`.
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.push_keys(keys);
        self
    }

    pub fn push_keys(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.keys.extend(keys);
    }

    /// Queue the bytes of `text` as keys, as if typed.
    pub fn type_text(&mut self, text: &str) {
        self.keys.extend(Key::sequence(text));
    }

    pub fn pending_keys(&self) -> usize {
        self.keys.len()
    }

    /// Resize to `rows` x `cols` while reading key number `nth` (counting
    /// from 1), the way a terminal reports a resize between keystrokes.
    pub fn resize_on_key(&mut self, nth: usize, rows: u16, cols: u16) {
        self.scripted_resize = Some((nth.saturating_sub(1), rows, cols));
    }

    /// Change the reported size. Existing content is kept where it still fits.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.cells.resize(rows as usize, vec![Cell::default(); cols as usize]);
        for row in &mut self.cells {
            row.resize(cols as usize, Cell::default());
        }
        self.rows = rows;
        self.cols = cols;
        self.cursor.0 = self.cursor.0.min(rows.saturating_sub(1));
        self.cursor.1 = self.cursor.1.min(cols);
    }

    /// Text content of a row, trailing spaces included.
    pub fn row_text(&self, row: u16) -> String {
        self.cells
            .get(row as usize)
            .map(|cells| cells.iter().map(|c| c.ch as char).collect())
            .unwrap_or_default()
    }

    /// Whether every cell in `row` is drawn in reverse video.
    pub fn is_row_inverse(&self, row: u16) -> bool {
        self.cells
            .get(row as usize)
            .map(|cells| !cells.is_empty() && cells.iter().all(|c| c.flags.contains(AttrFlags::INVERSE)))
            .unwrap_or(false)
    }

    pub fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        self.cells.get(row as usize)?.get(col as usize).copied()
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Every `set_cursor_visible` call, in order. Teardown is not included.
    pub fn cursor_toggles(&self) -> &[bool] {
        &self.cursor_toggles
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Every write since creation, in order.
    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }

    /// How many writes put exactly `text` on screen.
    pub fn count_writes(&self, text: &str) -> usize {
        self.writes.iter().filter(|w| w.text == text).count()
    }

    /// Render the grid to a string (for debugging and demo output)
    pub fn dump(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(
            output,
            "=== Screen {}x{} === cursor: ({}, {}) visible={}",
            self.cols, self.rows, self.cursor.1, self.cursor.0, self.cursor_visible
        );
        output.push_str(&"-".repeat(self.cols as usize + 2));
        output.push('\n');
        for (idx, row) in self.cells.iter().enumerate() {
            let marker = if self.is_row_inverse(idx as u16) { '>' } else { '|' };
            output.push(marker);
            output.extend(row.iter().map(|c| c.ch as char));
            output.push('|');
            output.push('\n');
        }
        output.push_str(&"-".repeat(self.cols as usize + 2));
        output.push('\n');
        output
    }
}

impl TerminalBackend for VirtualScreen {
    fn init(&mut self) -> Result<()> {
        self.init_count += 1;
        self.active = true;
        Ok(())
    }

    fn teardown(&mut self) -> Result<()> {
        self.teardown_count += 1;
        self.active = false;
        self.cursor_visible = true;
        self.current = AttrFlags::empty();
        Ok(())
    }

    fn dimensions(&mut self) -> Result<(u16, u16)> {
        Ok((self.rows, self.cols))
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(InputError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let visible = clip(text, (self.cols - col) as usize);
        let cells = &mut self.cells[row as usize];
        for (offset, byte) in visible.bytes().enumerate() {
            cells[col as usize + offset] = Cell { ch: byte, flags: self.current };
        }
        self.cursor = (row, col + visible.len() as u16);
        self.writes.push(WriteRecord {
            row,
            col,
            text: text.to_string(),
            inverse: self.current.contains(AttrFlags::INVERSE),
        });
        Ok(())
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> Result<()> {
        if row >= self.rows || col > self.cols {
            return Err(InputError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        self.cursor = (row, col);
        Ok(())
    }

    fn set_reverse_video(&mut self, on: bool) -> Result<()> {
        self.current.set(AttrFlags::INVERSE, on);
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        self.cursor_visible = visible;
        self.cursor_toggles.push(visible);
        Ok(())
    }

    fn read_key(&mut self) -> Result<Key> {
        if let Some((after, rows, cols)) = self.scripted_resize {
            if self.keys_read == after {
                self.scripted_resize = None;
                self.resize(rows, cols);
            }
        }
        let key = self.keys.pop_front().ok_or(InputError::InputExhausted)?;
        self.keys_read += 1;
        if !self.cursor_visible {
            self.hidden_reads += 1;
        }
        Ok(key)
    }

    fn clear(&mut self) -> Result<()> {
        self.clear_count += 1;
        for row in &mut self.cells {
            row.fill(Cell::default());
        }
        self.cursor = (0, 0);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_count += 1;
        Ok(())
    }
}
