//! Single-select menu
//!
//! Draws a prompt, a `---` divider and the list of items below it, with the
//! current item in reverse video. Up/Down move the highlight (wrapping at
//! both ends) and Enter or Space commits.
//!
//! # Windowing
//!
//! When the list plus its two header rows cannot fit on screen, the session
//! is cleared and only `rows - 2` items are shown at a time. The window is
//! recomputed from scratch on every redraw:
//!
//! ```text
//! window_start = max(0, selected - rows + 3)
//! ```
//!
//! which keeps the highlight on the last visible row once it moves past
//! the first screenful.

use tracing::{debug, info};

use crate::core::backend::{clip, Key, TerminalBackend};
use crate::core::session::Session;
use crate::error::{InputError, Result};

/// Rows used by the prompt and the divider.
const HEADER_ROWS: usize = 2;

/// Visible slice of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible item index
    pub start: usize,
    /// Number of visible items
    pub visible: usize,
}

impl Viewport {
    /// Window over `count` items that keeps `selected` in view, given
    /// `available` rows for the list itself. With no rows available the
    /// window is empty.
    pub fn compute(count: usize, selected: usize, available: usize) -> Self {
        if count <= available {
            return Self { start: 0, visible: count };
        }
        Self {
            start: (selected + 1).saturating_sub(available.max(1)),
            visible: available,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.start + self.visible
    }
}

/// Fit an item into a row of `width` bytes.
///
/// Shorter items are padded with spaces so a redraw overwrites whatever a
/// longer item left behind; longer ones are cut and end in `...`.
pub fn fit_to_width(item: &str, width: usize) -> String {
    if item.len() < width {
        let mut row = String::with_capacity(width);
        row.push_str(item);
        row.push_str(&" ".repeat(width - item.len()));
        row
    } else if item.len() > width {
        let mut row = clip(item, width.saturating_sub(3)).to_string();
        row.push_str(clip("...", width));
        row
    } else {
        item.to_string()
    }
}

/// Menu navigation state.
pub struct SelectionMenu<'a, S> {
    items: &'a [S],
    selected: usize,
}

impl<'a, S: AsRef<str>> SelectionMenu<'a, S> {
    pub fn new(items: &'a [S]) -> Self {
        Self { items, selected: 0 }
    }

    /// Show `items` under `prompt` and return the index the user commits.
    ///
    /// Fails with [`InputError::EmptyMenu`] when `items` is empty.
    pub fn select<B: TerminalBackend>(
        session: &mut Session<B>,
        items: &'a [S],
        prompt: &str,
    ) -> Result<usize> {
        session.guarded(|s| {
            if items.is_empty() {
                return Err(InputError::EmptyMenu);
            }
            let mut menu = Self::new(items);
            menu.run(s, prompt)?;
            info!("menu {:?}: selected item {}", prompt, menu.selected);
            Ok(menu.selected)
        })
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Move selection up
    pub fn up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    /// Move selection down
    pub fn down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }

    fn run<B: TerminalBackend>(&mut self, session: &mut Session<B>, prompt: &str) -> Result<()> {
        let wanted = (self.items.len() + HEADER_ROWS).min(u16::MAX as usize) as u16;
        session.make_room(wanted)?;

        let prompt_row = session.take_row();
        if !prompt.is_empty() {
            session.backend_mut().write_at(prompt_row, 0, &format!("{}: ", prompt))?;
        }
        let divider_row = session.take_row();
        session.backend_mut().write_at(divider_row, 0, "---")?;
        let list_top = session.offset();

        session.backend_mut().set_cursor_visible(false)?;
        let navigated = self.navigate(session, list_top);
        // Restore the cursor even when navigation failed
        let restored = session.backend_mut().set_cursor_visible(true);
        let visible = navigated?;
        restored?;

        session.advance(visible);
        session.backend_mut().flush()
    }

    /// Redraw and read keys until commit. Returns how many rows the list took.
    fn navigate<B: TerminalBackend>(&mut self, session: &mut Session<B>, list_top: u16) -> Result<u16> {
        loop {
            let viewport = self.render(session, list_top)?;
            match session.backend_mut().read_key()? {
                Key::Enter | Key::Printable(b' ') => return Ok(viewport.visible as u16),
                Key::ArrowUp => self.up(),
                Key::ArrowDown => self.down(),
                _ => {}
            }
        }
    }

    /// Draw the visible window with the selection highlighted.
    fn render<B: TerminalBackend>(&self, session: &mut Session<B>, list_top: u16) -> Result<Viewport> {
        let (rows, cols) = session.refresh_dimensions()?;
        let available = rows.saturating_sub(list_top) as usize;
        let viewport = Viewport::compute(self.items.len(), self.selected, available);
        if viewport.visible == 0 {
            debug!("menu has no rows left at {} on a {}-row screen", list_top, rows);
        } else if viewport.visible < self.items.len() {
            debug!("menu window {}..{} of {}", viewport.start, viewport.start + viewport.visible, self.items.len());
        }

        let backend = session.backend_mut();
        for i in 0..viewport.visible {
            let idx = viewport.start + i;
            let row = list_top + i as u16;
            let text = fit_to_width(self.items[idx].as_ref(), cols as usize);
            if idx == self.selected {
                backend.set_reverse_video(true)?;
                backend.write_at(row, 0, &text)?;
                backend.set_reverse_video(false)?;
            } else {
                backend.write_at(row, 0, &text)?;
            }
        }
        backend.flush()?;
        Ok(viewport)
    }
}
