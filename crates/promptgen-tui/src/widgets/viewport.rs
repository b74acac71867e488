use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Read-only scrollable text pane.
///
/// Content is hard-wrapped to the viewport width so the scroll offset maps
/// one-to-one onto rendered rows.
#[derive(Debug, Default, Clone)]
pub struct Viewport {
    content: String,
    rows: Vec<String>,
    offset: usize,
    width: u16,
    height: u16,
}

impl Viewport {
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.rewrap();
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        if width != self.width {
            self.width = width;
            self.rewrap();
        }
        self.height = height;
        self.clamp_offset();
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[cfg(test)]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Rows currently inside the window.
    pub fn visible_rows(&self) -> &[String] {
        let end = (self.offset + self.height as usize).min(self.rows.len());
        &self.rows[self.offset.min(end)..end]
    }

    /// Percentage scrolled, 100 when everything fits.
    pub fn scroll_percent(&self) -> u16 {
        let max = self.max_offset();
        if max == 0 {
            return 100;
        }
        ((self.offset * 100) / max) as u16
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let page = (self.height as usize).max(1);
        let half = (page / 2).max(1);
        match (key.code, key.modifiers) {
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.scroll_up(half),
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => self.scroll_down(half),
            (KeyCode::Up | KeyCode::Char('k'), _) => self.scroll_up(1),
            (KeyCode::Down | KeyCode::Char('j'), _) => self.scroll_down(1),
            (KeyCode::PageUp | KeyCode::Char('b'), _) => self.scroll_up(page),
            (KeyCode::PageDown | KeyCode::Char('f') | KeyCode::Char(' '), _) => {
                self.scroll_down(page)
            }
            (KeyCode::Home | KeyCode::Char('g'), _) => self.goto_top(),
            (KeyCode::End | KeyCode::Char('G'), _) => self.goto_bottom(),
            _ => {}
        }
    }

    fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    fn max_offset(&self) -> usize {
        self.rows.len().saturating_sub(self.height as usize)
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    fn rewrap(&mut self) {
        self.rows = wrap(&self.content, self.width as usize);
        self.clamp_offset();
    }
}

/// Split into rows of at most `width` chars; `0` disables wrapping.
fn wrap(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for line in text.split('\n') {
        if width == 0 || line.chars().count() <= width {
            rows.push(line.to_string());
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        for chunk in chars.chunks(width) {
            rows.push(chunk.iter().collect());
        }
    }
    rows
}
