use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::editor::LineBuffer;

/// Rows a field grows to before it starts scrolling vertically.
pub const MAX_FIELD_ROWS: usize = 5;

/// A focusable text-entry field.
///
/// Keys only edit the buffer while the field is focused. A multi-line field
/// takes newlines from Alt+Enter or Shift+Enter (plain Enter belongs to the
/// form). A single-line field never holds a newline.
#[derive(Debug, Default, Clone)]
pub struct TextField {
    buffer: LineBuffer,
    focused: bool,
    multiline: bool,
    width: u16,
}

/// What to draw for a field: the visible slice of each row and where the
/// cursor lands inside it.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldView {
    pub rows: Vec<String>,
    pub cursor: (u16, u16),
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn multiline() -> Self {
        Self {
            multiline: true,
            ..Self::default()
        }
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    pub fn value(&self) -> String {
        self.buffer.to_string()
    }

    /// Rows needed to show the field, capped at [`MAX_FIELD_ROWS`].
    pub fn height(&self) -> usize {
        self.buffer.line_count().clamp(1, MAX_FIELD_ROWS)
    }

    pub fn insert_str(&mut self, text: &str) {
        if !self.focused {
            return;
        }
        if self.multiline {
            self.buffer.insert_text(text);
        } else {
            let flat: String = text
                .chars()
                .filter(|&c| c != '\r')
                .map(|c| if c == '\n' { ' ' } else { c })
                .collect();
            self.buffer.insert_text(&flat);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if !self.focused {
            return;
        }
        let buf = &mut self.buffer;
        match (key.code, key.modifiers) {
            (KeyCode::Enter, m)
                if self.multiline && m.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
            {
                buf.split_line()
            }
            (KeyCode::Char('a'), KeyModifiers::CONTROL) | (KeyCode::Home, _) => buf.line_start(),
            (KeyCode::Char('e'), KeyModifiers::CONTROL) | (KeyCode::End, _) => buf.line_end(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => buf.erase_to_line_start(),
            (KeyCode::Char('w'), KeyModifiers::CONTROL) => buf.erase_word_back(),
            (KeyCode::Char(_), m) if m.contains(KeyModifiers::CONTROL) => {}
            (KeyCode::Char(c), _) => buf.insert(c),
            (KeyCode::Backspace, _) => buf.erase_back(),
            (KeyCode::Delete, _) => buf.erase_forward(),
            (KeyCode::Left, _) => buf.left(),
            (KeyCode::Right, _) => buf.right(),
            (KeyCode::Up, _) => {
                buf.up();
            }
            (KeyCode::Down, _) => {
                buf.down();
            }
            _ => {}
        }
    }

    /// Window the buffer to `height` rows and the field width, scrolled so
    /// the cursor stays visible.
    pub fn view(&self, height: usize) -> FieldView {
        let cursor = self.buffer.cursor();
        let (row, col) = (cursor.line, cursor.column);
        let height = height.max(1);
        let width = (self.width as usize).max(1);

        let top = (row + 1).saturating_sub(height);
        // Leave one cell for the cursor past the last char.
        let left = (col + 1).saturating_sub(width);

        let last = self.buffer.line_count().min(top + height);
        let rows = (top..last)
            .map(|i| self.buffer.line(i).iter().skip(left).take(width).collect())
            .collect();

        FieldView {
            rows,
            cursor: ((col - left) as u16, (row - top) as u16),
        }
    }
}
