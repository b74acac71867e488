use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use promptgen_core::filter;
use promptgen_core::prompt::ListEntry;

use crate::theme::Theme;

const FILTER_PROMPT: &str = "Filter: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    Unfiltered,
    /// The filter line has focus and every key edits it.
    Filtering,
    /// A filter was accepted; navigation works on the matches.
    FilterApplied,
}

/// Selectable list with an embedded multi-token filter.
#[derive(Debug)]
pub struct Browser<T> {
    items: Vec<T>,
    filter_values: Vec<String>,
    /// Indices into `items` that pass the filter, in item order.
    visible: Vec<usize>,
    state: ListState,
    filter: String,
    filter_state: FilterState,
    page_size: usize,
}

impl<T: ListEntry> Default for Browser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ListEntry> Browser<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            filter_values: Vec::new(),
            visible: Vec::new(),
            state: ListState::default(),
            filter: String::new(),
            filter_state: FilterState::Unfiltered,
            page_size: 10,
        }
    }

    /// Replace the items, keeping any filter in place.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.filter_values = items.iter().map(ListEntry::filter_value).collect();
        self.items = items;
        self.refilter();
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_state == FilterState::Filtering
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_item(&self) -> Option<&T> {
        let pos = self.state.selected()?;
        self.visible.get(pos).map(|&i| &self.items[i])
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.is_filtering() {
            self.filter.extend(text.chars().filter(|c| !c.is_control()));
            self.refilter();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.is_filtering() {
            self.handle_filter_key(key);
            return;
        }
        let page = self.page_size as isize;
        match (key.code, key.modifiers) {
            (KeyCode::Char('b'), KeyModifiers::CONTROL) => self.move_selection(-page),
            (KeyCode::Char('f'), KeyModifiers::CONTROL) => self.move_selection(page),
            (KeyCode::Up | KeyCode::Char('k'), _) => self.move_selection(-1),
            (KeyCode::Down | KeyCode::Char('j'), _) => self.move_selection(1),
            (KeyCode::PageUp, _) => self.move_selection(-page),
            (KeyCode::PageDown, _) => self.move_selection(page),
            (KeyCode::Home | KeyCode::Char('g'), _) => self.select_first(),
            (KeyCode::End | KeyCode::Char('G'), _) => self.select_last(),
            (KeyCode::Char('/'), _) => {
                self.filter_state = FilterState::Filtering;
            }
            (KeyCode::Esc, _) if self.filter_state == FilterState::FilterApplied => {
                self.clear_filter();
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => self.clear_filter(),
            (KeyCode::Enter, _) => {
                self.filter_state = if self.filter.trim().is_empty() {
                    self.filter.clear();
                    FilterState::Unfiltered
                } else {
                    FilterState::FilterApplied
                };
            }
            (KeyCode::Up, _) => self.move_selection(-1),
            (KeyCode::Down, _) => self.move_selection(1),
            (KeyCode::Backspace, _) => {
                self.filter.pop();
                self.refilter();
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.filter.clear();
                self.refilter();
            }
            (KeyCode::Char(_), m) if m.contains(KeyModifiers::CONTROL) => {}
            (KeyCode::Char(c), _) => {
                self.filter.push(c);
                self.refilter();
            }
            _ => {}
        }
    }

    fn clear_filter(&mut self) {
        self.filter.clear();
        self.filter_state = FilterState::Unfiltered;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.visible = filter::rank(&self.filter, &self.filter_values);
        self.state
            .select(if self.visible.is_empty() { None } else { Some(0) });
    }

    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            self.state.select(None);
            return;
        }
        let max_index = self.visible.len() - 1;
        let current = self.state.selected().unwrap_or(0);
        self.state
            .select(Some(current.saturating_add_signed(delta).min(max_index)));
    }

    fn select_first(&mut self) {
        if !self.visible.is_empty() {
            self.state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        if !self.visible.is_empty() {
            self.state.select(Some(self.visible.len() - 1));
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, theme: &Theme, title: &str) {
        let block = Block::default()
            .title(Span::styled(format!(" {title} "), theme.title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        self.render_filter_line(f, chunks[0], theme);

        if self.visible.is_empty() {
            let msg = if self.item_count() == 0 {
                "No prompts yet."
            } else {
                "No matches."
            };
            f.render_widget(Paragraph::new(Span::styled(msg, theme.dimmed)), chunks[1]);
            return;
        }

        let selected = self.state.selected();
        let items: Vec<ListItem> = self
            .visible
            .iter()
            .enumerate()
            .map(|(pos, &i)| {
                let entry = &self.items[i];
                let (title_style, detail_style) = if Some(pos) == selected {
                    (theme.selected_title, theme.selected_detail)
                } else {
                    (theme.item_title, theme.item_detail)
                };
                ListItem::new(vec![
                    Line::from(Span::styled(entry.label().to_string(), title_style)),
                    Line::from(Span::styled(entry.detail(), detail_style)),
                ])
            })
            .collect();

        let list = List::new(items).highlight_symbol("┃ ");
        f.render_stateful_widget(list, chunks[1], &mut self.state);
    }

    fn render_filter_line(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let line = match self.filter_state {
            FilterState::Filtering => Line::from(vec![
                Span::styled(FILTER_PROMPT, theme.filter_prompt),
                Span::raw(self.filter.clone()),
            ]),
            FilterState::FilterApplied => Line::from(vec![
                Span::styled(format!("“{}” ", self.filter), theme.filter_prompt),
                Span::styled(
                    format!("{} of {} items", self.visible_len(), self.item_count()),
                    theme.dimmed,
                ),
            ]),
            FilterState::Unfiltered => {
                let count = self.item_count();
                let noun = if count == 1 { "item" } else { "items" };
                Line::from(Span::styled(
                    format!("{count} {noun}"),
                    theme.dimmed,
                ))
            }
        };
        f.render_widget(Paragraph::new(line), area);

        if self.is_filtering() {
            let column = usize::from(area.x)
                .saturating_add(FILTER_PROMPT.chars().count())
                .saturating_add(self.filter.chars().count())
                .min(usize::from(area.right().saturating_sub(1)));
            let x = u16::try_from(column).unwrap_or(u16::MAX);
            f.set_cursor_position(Position::new(x, area.y));
        }
    }
}
