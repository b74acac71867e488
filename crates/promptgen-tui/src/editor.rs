use std::fmt;

/// Where the cursor sits: a line index and a char index into that line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

/// Multi-line text behind a form field.
///
/// Lines are stored as chars so every column is a char index and there is no
/// byte boundary bookkeeping. There is always at least one line.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: Vec<Vec<char>>,
    cursor: Cursor,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self {
            lines: vec![Vec::new()],
            cursor: Cursor::default(),
        }
    }
}

impl LineBuffer {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> &[char] {
        self.lines.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn current(&mut self) -> &mut Vec<char> {
        &mut self.lines[self.cursor.line]
    }

    fn current_len(&self) -> usize {
        self.lines[self.cursor.line].len()
    }

    // ── Editing ──

    pub fn insert(&mut self, c: char) {
        let at = self.cursor.column;
        self.current().insert(at, c);
        self.cursor.column += 1;
    }

    /// Insert pasted text. `\n` starts a new line and `\r` is dropped.
    pub fn insert_text(&mut self, text: &str) {
        for c in text.chars().filter(|&c| c != '\r') {
            if c == '\n' {
                self.split_line();
            } else {
                self.insert(c);
            }
        }
    }

    pub fn split_line(&mut self) {
        let at = self.cursor.column;
        let tail = self.current().split_off(at);
        self.cursor.line += 1;
        self.cursor.column = 0;
        self.lines.insert(self.cursor.line, tail);
    }

    /// Backspace: erase the char before the cursor, joining with the
    /// previous line at column zero.
    pub fn erase_back(&mut self) {
        let Cursor { line, column } = self.cursor;
        if column > 0 {
            self.current().remove(column - 1);
            self.cursor.column -= 1;
        } else if line > 0 {
            let joined = self.lines.remove(line);
            self.cursor.line -= 1;
            self.cursor.column = self.current_len();
            self.current().extend(joined);
        }
    }

    /// Delete: erase the char under the cursor, pulling the next line up at
    /// end of line.
    pub fn erase_forward(&mut self) {
        let Cursor { line, column } = self.cursor;
        if column < self.current_len() {
            self.current().remove(column);
        } else if line + 1 < self.lines.len() {
            let next = self.lines.remove(line + 1);
            self.current().extend(next);
        }
    }

    pub fn erase_to_line_start(&mut self) {
        let column = self.cursor.column;
        self.current().drain(..column);
        self.cursor.column = 0;
    }

    /// Erase trailing whitespace before the cursor and then the word before it.
    pub fn erase_word_back(&mut self) {
        let end = self.cursor.column;
        let line = &self.lines[self.cursor.line][..end];
        let word_end = line
            .iter()
            .rposition(|c| !c.is_whitespace())
            .map_or(0, |i| i + 1);
        let start = line[..word_end]
            .iter()
            .rposition(|c| c.is_whitespace())
            .map_or(0, |i| i + 1);
        self.current().drain(start..end);
        self.cursor.column = start;
    }

    // ── Movement ──

    pub fn left(&mut self) {
        if self.cursor.column > 0 {
            self.cursor.column -= 1;
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.column = self.current_len();
        }
    }

    pub fn right(&mut self) {
        if self.cursor.column < self.current_len() {
            self.cursor.column += 1;
        } else if self.cursor.line + 1 < self.lines.len() {
            self.cursor = Cursor {
                line: self.cursor.line + 1,
                column: 0,
            };
        }
    }

    /// False on the first line.
    pub fn up(&mut self) -> bool {
        if self.cursor.line == 0 {
            return false;
        }
        self.cursor.line -= 1;
        self.cursor.column = self.cursor.column.min(self.current_len());
        true
    }

    /// False on the last line.
    pub fn down(&mut self) -> bool {
        if self.cursor.line + 1 == self.lines.len() {
            return false;
        }
        self.cursor.line += 1;
        self.cursor.column = self.cursor.column.min(self.current_len());
        true
    }

    pub fn line_start(&mut self) {
        self.cursor.column = 0;
    }

    pub fn line_end(&mut self) {
        self.cursor.column = self.current_len();
    }
}

impl fmt::Display for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for c in line {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_text(text: &str) -> LineBuffer {
        let mut b = LineBuffer::default();
        b.insert_text(text);
        b
    }

    fn at(line: usize, column: usize) -> Cursor {
        Cursor { line, column }
    }

    #[test]
    fn starts_with_one_blank_line() {
        let b = LineBuffer::default();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.cursor(), at(0, 0));
        assert_eq!(b.to_string(), "");
        assert!(b.line(3).is_empty());
    }

    #[test]
    fn pasted_text_splits_on_newlines() {
        let b = with_text("Title\r\nline two\nend");
        assert_eq!(b.line_count(), 3);
        assert_eq!(b.to_string(), "Title\nline two\nend");
        assert_eq!(b.cursor(), at(2, 3));
    }

    #[test]
    fn insert_mid_line() {
        let mut b = with_text("tage");
        b.left();
        b.left();
        b.insert('g');
        assert_eq!(b.to_string(), "tagge");
        assert_eq!(b.cursor(), at(0, 3));
    }

    #[test]
    fn split_then_erase_back_rejoins() {
        let mut b = with_text("foobar");
        b.left();
        b.left();
        b.left();
        b.split_line();
        assert_eq!(b.to_string(), "foo\nbar");
        assert_eq!(b.cursor(), at(1, 0));
        b.erase_back();
        assert_eq!(b.to_string(), "foobar");
        assert_eq!(b.cursor(), at(0, 3));
    }

    #[test]
    fn erase_back_at_origin_does_nothing() {
        let mut b = LineBuffer::default();
        b.erase_back();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.cursor(), at(0, 0));
    }

    #[test]
    fn erase_forward_pulls_next_line_up() {
        let mut b = with_text("x\ny");
        assert!(b.up());
        b.line_end();
        b.erase_forward();
        assert_eq!(b.to_string(), "xy");
        b.line_start();
        b.erase_forward();
        assert_eq!(b.to_string(), "y");
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let mut b = with_text("naïve");
        b.line_start();
        b.right();
        b.right();
        b.right();
        assert_eq!(b.cursor(), at(0, 3));
        b.erase_back();
        assert_eq!(b.to_string(), "nave");
    }

    #[test]
    fn vertical_moves_clamp_column() {
        let mut b = with_text("ab\nlonger line");
        assert!(b.up());
        assert_eq!(b.cursor(), at(0, 2));
        assert!(!b.up());
        assert!(b.down());
        assert_eq!(b.cursor(), at(1, 2));
        assert!(!b.down());
    }

    #[test]
    fn erase_to_line_start_keeps_other_lines() {
        let mut b = with_text("first\nsecond");
        b.left();
        b.erase_to_line_start();
        assert_eq!(b.to_string(), "first\nd");
        assert_eq!(b.cursor(), at(1, 0));
    }

    #[test]
    fn erase_word_back_skips_trailing_space() {
        let mut b = with_text("summarize this text  ");
        b.erase_word_back();
        assert_eq!(b.to_string(), "summarize this ");
        b.erase_word_back();
        b.erase_word_back();
        assert_eq!(b.to_string(), "");
        b.erase_word_back();
        assert_eq!(b.cursor(), at(0, 0));
    }

    #[test]
    fn horizontal_moves_cross_line_edges() {
        let mut b = with_text("a\nb");
        b.line_start();
        b.left();
        assert_eq!(b.cursor(), at(0, 1));
        b.right();
        assert_eq!(b.cursor(), at(1, 0));
        b.line_end();
        b.right();
        assert_eq!(b.cursor(), at(1, 1));
    }
}
