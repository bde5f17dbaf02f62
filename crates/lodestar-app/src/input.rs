//! Text input component.
//!
//! Single-line editable field with a placeholder. Every edit that changes
//! the value is reported as [`InputEvent::Changed`], so the owner can react
//! the way an `on_change` callback would.

/// Key presses understood by the application, independent of terminal
/// backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Delete the character before the cursor.
    Backspace,
    /// Delete the character under the cursor.
    Delete,
    /// Move cursor left.
    Left,
    /// Move cursor right.
    Right,
    /// Move cursor to the start.
    Home,
    /// Move cursor to the end.
    End,
    /// Submit the current value.
    Enter,
    /// Leave the application.
    Esc,
}

/// Outcome of feeding a key to a [`TextInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Value changed; carries the new value.
    Changed(String),
    /// Enter pressed; carries the submitted value. The field is cleared.
    Submitted(String),
    /// Only the cursor moved.
    CursorMoved,
}

/// Editable single-line text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    placeholder: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl TextInput {
    /// Empty field showing `placeholder`.
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self { value: String::new(), placeholder: placeholder.into(), cursor: 0 }
    }

    /// Current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Placeholder shown while the value is empty.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply a key press. Returns `None` for keys the field ignores.
    pub fn handle(&mut self, key: KeyInput) -> Option<InputEvent> {
        let len = self.value.chars().count();
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                Some(InputEvent::Changed(self.value.clone()))
            },
            KeyInput::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.value.remove(at);
                Some(InputEvent::Changed(self.value.clone()))
            },
            KeyInput::Delete if self.cursor < len => {
                let at = self.byte_offset(self.cursor);
                self.value.remove(at);
                Some(InputEvent::Changed(self.value.clone()))
            },
            KeyInput::Left if self.cursor > 0 => {
                self.cursor -= 1;
                Some(InputEvent::CursorMoved)
            },
            KeyInput::Right if self.cursor < len => {
                self.cursor += 1;
                Some(InputEvent::CursorMoved)
            },
            KeyInput::Home => {
                self.cursor = 0;
                Some(InputEvent::CursorMoved)
            },
            KeyInput::End => {
                self.cursor = len;
                Some(InputEvent::CursorMoved)
            },
            KeyInput::Enter => {
                self.cursor = 0;
                Some(InputEvent::Submitted(std::mem::take(&mut self.value)))
            },
            _ => None,
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.value.char_indices().nth(chars).map_or(self.value.len(), |(i, _)| i)
    }
}
