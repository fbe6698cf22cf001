//! Single-line text field
//!
//! Editing is append and backspace only; arrow keys are ignored. The
//! finished line is checked by an optional [`Validator`], and a rejected
//! line is answered with the error message and a fresh prompt row.

use tracing::debug;

use super::validator::Validator;
use crate::core::backend::{Key, TerminalBackend};
use crate::core::session::Session;
use crate::error::Result;

const DEFAULT_ERROR: &str = "Invalid input, please try again.";

/// Line editor configuration.
///
/// # Example
///
/// ```ignore
/// let name = TextField::new("Name")
///     .validator(|s: &str| !s.is_empty())
///     .error_message("Name cannot be empty")
///     .edit(&mut session)?;
/// ```
pub struct TextField<'a> {
    prompt: String,
    validator: Option<Box<dyn Validator + 'a>>,
    error_message: String,
    mask: Option<u8>,
}

impl<'a> TextField<'a> {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            validator: None,
            error_message: DEFAULT_ERROR.to_string(),
            mask: None,
        }
    }

    pub fn validator(mut self, validator: impl Validator + 'a) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Echo `mask` instead of each typed byte.
    pub fn mask(mut self, mask: u8) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Read lines until one passes the validator, and return it.
    pub fn edit<B: TerminalBackend>(&self, session: &mut Session<B>) -> Result<String> {
        session.guarded(|s| {
            let mut rejected = false;
            loop {
                if rejected {
                    s.line(&self.error_message)?;
                }
                let value = self.attempt(s)?;
                match &self.validator {
                    Some(validator) if !validator.validate(&value) => {
                        debug!("field {:?} rejected input", self.prompt);
                        rejected = true;
                    }
                    _ => return Ok(value),
                }
            }
        })
    }

    /// One prompt row, read up to the terminator.
    fn attempt<B: TerminalBackend>(&self, session: &mut Session<B>) -> Result<String> {
        session.make_room(1)?;
        let row = session.take_row();
        let size = session.dimensions();

        let label = if self.prompt.is_empty() {
            String::new()
        } else {
            format!("{}: ", self.prompt)
        };

        let backend = session.backend_mut();
        if !label.is_empty() {
            backend.write_at(row, 0, &label)?;
        }

        let mut editor = LineEditor::new(row, label.len(), size, self.mask);
        editor.park(backend)?;
        backend.flush()?;

        loop {
            let key = session.backend_mut().read_key()?;
            // The terminal may have been resized while waiting for the key
            let (rows, cols) = session.refresh_dimensions()?;
            editor.resize(rows, cols);

            let backend = session.backend_mut();
            let submitted = editor.handle(key, backend)?;
            backend.flush()?;
            if submitted {
                return Ok(editor.value());
            }
        }
    }
}

/// Per-row editing state.
///
/// `column` is a screen column: always `prompt_len + buffer.len()`.
struct LineEditor {
    row: u16,
    prompt_len: usize,
    column: usize,
    /// Screen size; bytes typed past the right edge are kept but not drawn
    rows: u16,
    cols: usize,
    buffer: Vec<u8>,
    mask: Option<u8>,
}

impl LineEditor {
    fn new(row: u16, prompt_len: usize, (rows, cols): (u16, u16), mask: Option<u8>) -> Self {
        Self {
            row,
            prompt_len,
            column: prompt_len,
            rows,
            cols: cols as usize,
            buffer: Vec::new(),
            mask,
        }
    }

    fn resize(&mut self, rows: u16, cols: u16) {
        self.rows = rows;
        self.cols = cols as usize;
    }

    /// Whether the cell at `column` of this row is on screen.
    fn drawable(&self, column: usize) -> bool {
        self.row < self.rows && column < self.cols
    }

    /// Apply one key. Returns true once the line is submitted.
    fn handle<B: TerminalBackend + ?Sized>(&mut self, key: Key, backend: &mut B) -> Result<bool> {
        match key {
            Key::Enter => return Ok(true),
            Key::Backspace => self.erase(backend)?,
            Key::Printable(byte) => self.insert(byte, backend)?,
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {}
        }
        Ok(false)
    }

    fn insert<B: TerminalBackend + ?Sized>(&mut self, byte: u8, backend: &mut B) -> Result<()> {
        self.buffer.push(byte);
        let shown = self.mask.unwrap_or(byte);
        if self.drawable(self.column) {
            let mut cell = [0u8; 4];
            backend.write_at(self.row, self.column as u16, char::from(shown).encode_utf8(&mut cell))?;
        }
        self.column += 1;
        self.park(backend)
    }

    fn erase<B: TerminalBackend + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        if self.column <= self.prompt_len {
            return Ok(());
        }
        self.buffer.pop();
        self.column -= 1;
        if self.drawable(self.column) {
            backend.write_at(self.row, self.column as u16, " ")?;
        }
        self.park(backend)
    }

    /// Put the terminal cursor where the next byte will appear.
    fn park<B: TerminalBackend + ?Sized>(&self, backend: &mut B) -> Result<()> {
        if self.row >= self.rows {
            return Ok(());
        }
        backend.move_cursor(self.row, self.column.min(self.cols) as u16)
    }

    fn value(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::screen::VirtualScreen;
    use crate::error::InputError;

    #[test]
    fn test_plain_edit() {
        let mut screen = VirtualScreen::new(10, 20);
        screen.type_text("hi\r");
        let mut session = Session::new(&mut screen).unwrap();

        let value = TextField::new("Name").edit(&mut session).unwrap();
        assert_eq!(value, "hi");
        assert_eq!(session.offset(), 1);
        drop(session);

        assert_eq!(screen.row_text(0).trim_end(), "Name: hi");
        assert_eq!(screen.cursor(), (0, 8));
    }

    #[test]
    fn test_no_prompt() {
        let mut screen = VirtualScreen::new(10, 20);
        screen.type_text("abc\n");
        let mut session = Session::new(&mut screen).unwrap();

        assert_eq!(TextField::new("").edit(&mut session).unwrap(), "abc");
        drop(session);
        assert_eq!(screen.row_text(0).trim_end(), "abc");
    }

    #[test]
    fn test_empty_submission_without_validator() {
        let mut screen = VirtualScreen::new(10, 20).with_keys([Key::Enter]);
        let mut session = Session::new(&mut screen).unwrap();
        assert_eq!(TextField::new("Name").edit(&mut session).unwrap(), "");
    }

    #[test]
    fn test_backspace() {
        let mut screen = VirtualScreen::new(10, 20);
        screen.type_text("abc");
        screen.push_keys([Key::Backspace, Key::Printable(b'x'), Key::Enter]);
        let mut session = Session::new(&mut screen).unwrap();

        assert_eq!(TextField::new("In").edit(&mut session).unwrap(), "abx");
        drop(session);
        assert_eq!(screen.row_text(0).trim_end(), "In: abx");
    }

    #[test]
    fn test_backspace_at_prompt_boundary() {
        let mut screen = VirtualScreen::new(4, 20);
        let mut editor = LineEditor::new(0, 4, (4, 20), None);

        editor.handle(Key::Backspace, &mut screen).unwrap();
        assert_eq!(editor.column, 4);
        assert!(editor.buffer.is_empty());

        editor.handle(Key::Printable(b'a'), &mut screen).unwrap();
        editor.handle(Key::Backspace, &mut screen).unwrap();
        editor.handle(Key::Backspace, &mut screen).unwrap();
        assert_eq!(editor.column, 4);
        assert!(editor.buffer.is_empty());
        assert_eq!(screen.cursor(), (0, 4));
    }

    #[test]
    fn test_backspace_leaves_prompt_intact() {
        let mut screen = VirtualScreen::new(10, 20)
            .with_keys([Key::Backspace, Key::Backspace, Key::Printable(b'z'), Key::Enter]);
        let mut session = Session::new(&mut screen).unwrap();

        assert_eq!(TextField::new("Name").edit(&mut session).unwrap(), "z");
        drop(session);
        assert_eq!(screen.row_text(0).trim_end(), "Name: z");
    }

    #[test]
    fn test_arrows_ignored() {
        let mut screen = VirtualScreen::new(10, 20);
        screen.type_text("ab");
        screen.push_keys([Key::ArrowLeft, Key::ArrowUp, Key::Printable(b'c'), Key::ArrowRight, Key::ArrowDown, Key::Enter]);
        let mut session = Session::new(&mut screen).unwrap();

        assert_eq!(TextField::new("").edit(&mut session).unwrap(), "abc");
    }

    #[test]
    fn test_mask() {
        let mut screen = VirtualScreen::new(10, 20);
        screen.type_text("secret\r");
        let mut session = Session::new(&mut screen).unwrap();

        let value = TextField::new("Password").mask(b'*').edit(&mut session).unwrap();
        assert_eq!(value, "secret");
        drop(session);
        assert_eq!(screen.row_text(0).trim_end(), "Password: ******");
    }

    #[test]
    fn test_validator_retry() {
        let mut screen = VirtualScreen::new(10, 30);
        screen.type_text("bob\rtommy\r");
        let mut session = Session::new(&mut screen).unwrap();

        let value = TextField::new("Email")
            .validator(|s: &str| s == "tommy")
            .error_message("Wrong!")
            .edit(&mut session)
            .unwrap();
        assert_eq!(value, "tommy");
        assert_eq!(session.offset(), 3);
        drop(session);

        assert_eq!(screen.count_writes("Wrong!"), 1);
        assert_eq!(screen.row_text(0).trim_end(), "Email: bob");
        assert_eq!(screen.row_text(1).trim_end(), "Wrong!");
        assert_eq!(screen.row_text(2).trim_end(), "Email: tommy");
    }

    #[test]
    fn test_empty_submission_rejected() {
        let mut screen = VirtualScreen::new(10, 30).with_keys([Key::Enter]);
        screen.type_text("hi\r");
        let mut session = Session::new(&mut screen).unwrap();

        let value = TextField::new("Name")
            .validator(|s: &str| !s.is_empty())
            .edit(&mut session)
            .unwrap();
        assert_eq!(value, "hi");
        drop(session);
        assert_eq!(screen.count_writes(DEFAULT_ERROR), 1);
    }

    #[test]
    fn test_validator_runs_once_per_attempt() {
        use std::cell::Cell;

        let calls = Cell::new(0);
        let mut screen = VirtualScreen::new(10, 30);
        screen.type_text("abc\rabcd\r");
        let mut session = Session::new(&mut screen).unwrap();

        let value = TextField::new("")
            .validator(|s: &str| {
                calls.set(calls.get() + 1);
                s.len() > 3
            })
            .edit(&mut session)
            .unwrap();
        assert_eq!(value, "abcd");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_input_wider_than_screen() {
        let mut screen = VirtualScreen::new(4, 8);
        screen.type_text("abcdef");
        screen.push_keys([Key::Backspace, Key::Enter]);
        let mut session = Session::new(&mut screen).unwrap();

        // "In: " takes 4 columns; only "abcd" is drawn
        assert_eq!(TextField::new("In").edit(&mut session).unwrap(), "abcde");
        drop(session);
        assert_eq!(screen.row_text(0), "In: abcd");
    }

    #[test]
    fn test_terminal_narrows_mid_edit() {
        let mut screen = VirtualScreen::new(10, 20);
        screen.type_text("abcdefgh\r");
        screen.resize_on_key(4, 10, 6);
        let mut session = Session::new(&mut screen).unwrap();

        assert_eq!(TextField::new("In").edit(&mut session).unwrap(), "abcdefgh");
        assert!(!session.is_closed());
        assert_eq!(session.dimensions(), (10, 6));
        drop(session);

        assert_eq!(screen.row_text(0), "In: ab");
        assert_eq!(screen.cursor(), (0, 6));
    }

    #[test]
    fn test_terminal_shortens_mid_edit() {
        let mut screen = VirtualScreen::new(10, 20);
        screen.type_text("xy\r");
        screen.resize_on_key(2, 2, 20);
        let mut session = Session::new(&mut screen).unwrap();
        for line in ["one", "two", "three"] {
            session.print(line).unwrap();
        }

        // The prompt row is gone; keys are still taken but not drawn
        assert_eq!(TextField::new("In").edit(&mut session).unwrap(), "xy");
        assert!(!session.is_closed());
        session.print("after").unwrap();
        drop(session);

        assert_eq!(screen.row_text(0).trim_end(), "after");
    }

    #[test]
    fn test_flush_after_every_key() {
        let mut screen = VirtualScreen::new(10, 20);
        screen.type_text("abc");
        screen.push_keys([Key::Backspace, Key::ArrowLeft, Key::Enter]);
        let mut session = Session::new(&mut screen).unwrap();
        let before = session.backend().flush_count;

        TextField::new("In").edit(&mut session).unwrap();
        assert!(session.backend().flush_count - before >= 6);
        assert_eq!(session.backend().pending_keys(), 0);
    }

    #[test]
    fn test_fields_scroll_off_screen() {
        let mut screen = VirtualScreen::new(3, 20);
        screen.type_text("1\r2\r3\r");
        let mut session = Session::new(&mut screen).unwrap();

        for _ in 0..3 {
            TextField::new("n").edit(&mut session).unwrap();
        }
        assert_eq!(session.offset(), 1);
        drop(session);
        assert_eq!(screen.clear_count, 1);
        assert_eq!(screen.row_text(0).trim_end(), "n: 3");
    }

    #[test]
    fn test_exhausted_input_closes_session() {
        let mut screen = VirtualScreen::new(4, 20);
        screen.type_text("ab");
        let mut session = Session::new(&mut screen).unwrap();

        let err = TextField::new("x").edit(&mut session).unwrap_err();
        assert!(matches!(err, InputError::InputExhausted));
        assert!(session.is_closed());
        drop(session);
        assert_eq!(screen.teardown_count, 1);
    }
}
