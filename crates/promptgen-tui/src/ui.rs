use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};
use ratatui::Frame;

use promptgen_core::keymap::{Action, GlobalAction, ListAction};
use promptgen_core::prompt::Prompt;

use crate::app::{App, FormKind, Screen, StatusKind};
use crate::theme::Theme;
use crate::widgets::browser::FilterState;

/// Title line plus a blank spacer.
pub const HEADER_ROWS: u16 = 2;
const FIELD_PROMPT: &str = "┃ ";
const FORM_HINT: &str =
    "Use Tab/Shift+Tab or Up/Down to navigate, Enter to confirm, Esc to cancel.";
const HELP_SEPARATOR: &str = " • ";

type HelpRow = Vec<(String, &'static str)>;

// ── Layout metrics ──
//
// `App` feeds these into its widgets on every resize so that paging and
// wrapping agree with what gets drawn.

/// Margin, status line and help rows.
pub fn footer_rows(full_help: bool) -> u16 {
    1 + 1 + if full_help { 2 } else { 1 }
}

pub fn body_height(height: u16, full_help: bool) -> u16 {
    height.saturating_sub(HEADER_ROWS + footer_rows(full_help))
}

/// Two rows per entry inside the bordered list, below the filter line.
pub fn list_page_size(body_height: u16) -> usize {
    (body_height.saturating_sub(3) / 2).max(1) as usize
}

pub fn view_header_height(prompt: &Prompt) -> u16 {
    let mut rows = 1;
    if !prompt.tags.is_empty() {
        rows += 1;
    }
    if !prompt.description.is_empty() {
        rows += 1;
    }
    // blank + "Content:"
    rows + 2
}

/// Inner size of the bordered content pane on the view screen.
pub fn viewport_size(width: u16, body_height: u16, header_height: u16) -> (u16, u16) {
    (
        width.saturating_sub(2),
        body_height.saturating_sub(header_height + 2),
    )
}

/// Visible columns of a form input: borders, padding and the field prompt.
pub fn field_width(width: u16) -> u16 {
    width.saturating_sub(2 + 2 + 2 + 2).max(20)
}

// ── Rendering ──

pub fn render(f: &mut Frame, app: &mut App) {
    let full = app.full_help_visible();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS),
            Constraint::Min(0),
            Constraint::Length(footer_rows(full)),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Span::styled("PromptGen", app.theme.title)),
        chunks[0],
    );

    match app.screen {
        Screen::Loading => render_loading(f, app, chunks[1]),
        Screen::PromptList => app.browser.render(f, chunks[1], &app.theme, "AI Prompts"),
        Screen::PromptView => render_view(f, app, chunks[1]),
        Screen::PromptCreation | Screen::VariableInput => render_form(f, app, chunks[1]),
    }

    render_footer(f, app, chunks[2]);
}

fn render_loading(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut lines = vec![Line::from(vec![
        Span::styled(app.spinner.frame(), theme.spinner),
        Span::raw(" Loading prompts..."),
    ])];
    if let Some(err) = &app.load_error {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(err.clone(), theme.error)));
        lines.push(Line::from(Span::styled(
            "Press r to retry or ctrl+c to quit.",
            theme.dimmed,
        )));
    }

    let height = (lines.len() as u16).min(area.height);
    let top = area.y + area.height.saturating_sub(height) / 2;
    let centered = Rect::new(area.x, top, area.width, height);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        centered,
    );
}

fn render_view(f: &mut Frame, app: &App, area: Rect) {
    let Some(prompt) = app.selected.as_ref() else {
        return;
    };
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(view_header_height(prompt)),
            Constraint::Min(0),
        ])
        .split(area);

    let mut header = vec![Line::from(Span::styled(prompt.title.clone(), theme.title))];
    if !prompt.tags.is_empty() {
        let mut spans = Vec::new();
        for (i, tag) in prompt.tags.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(format!(" {tag} "), theme.tag));
        }
        header.push(Line::from(spans));
    }
    if !prompt.description.is_empty() {
        header.push(Line::from(Span::styled(
            prompt.description.clone(),
            theme.item_detail,
        )));
    }
    header.push(Line::default());
    header.push(Line::from(Span::styled(" Content: ", theme.content_header)));
    f.render_widget(Paragraph::new(header), chunks[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border)
        .title_bottom(
            Line::from(Span::styled(
                format!(" {}% ", app.viewport.scroll_percent()),
                theme.dimmed,
            ))
            .right_aligned(),
        );
    let rows: Vec<Line> = app
        .viewport
        .visible_rows()
        .iter()
        .map(|row| Line::raw(row.as_str()))
        .collect();
    f.render_widget(Paragraph::new(rows).block(block), chunks[1]);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let theme = &app.theme;
    let title = match form.kind {
        FormKind::Create => "New Prompt".to_string(),
        FormKind::Variables => format!(
            "Variables for: {}",
            app.selected.as_ref().map(|p| p.title.as_str()).unwrap_or("")
        ),
    };

    let block = Block::default()
        .title(Span::styled(format!(" {title} "), theme.title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border)
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor = None;
    for field in &form.fields {
        let focused = field.input.is_focused();
        lines.push(Line::from(Span::styled(
            format!("{}:", field.label),
            theme.input_label,
        )));
        let view = field.input.view(field.input.height());
        if focused {
            let (col, row) = view.cursor;
            cursor = Some((col, lines.len() as u16 + row));
        }
        let style = if focused {
            theme.input_focused
        } else {
            theme.input_blurred
        };
        for row in view.rows {
            lines.push(Line::from(vec![
                Span::styled(FIELD_PROMPT, style),
                Span::raw(row),
            ]));
        }
        lines.push(Line::default());
    }

    // Keep the focused row on screen when the form is taller than the pane.
    let scroll = cursor
        .map(|(_, y)| (y + 1).saturating_sub(chunks[0].height))
        .unwrap_or(0);
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(FORM_HINT, theme.dimmed)),
        chunks[1],
    );

    if let Some((x, y)) = cursor {
        let x = chunks[0].x + FIELD_PROMPT.chars().count() as u16 + x;
        f.set_cursor_position(Position::new(
            x.min(chunks[0].right().saturating_sub(1)),
            chunks[0].y + y - scroll,
        ));
    }
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    if let Some(status) = &app.status {
        let style = match status.kind {
            StatusKind::Info => theme.info,
            StatusKind::Success => theme.success,
            StatusKind::Error => theme.error,
        };
        f.render_widget(
            Paragraph::new(Span::styled(status.text.clone(), style)),
            chunks[1],
        );
    }

    let rows = help_rows(app);
    let lines: Vec<Line> = rows.iter().map(|row| help_line(row, theme)).collect();
    f.render_widget(Paragraph::new(lines), chunks[2]);
}

fn help_line<'a>(row: &'a [(String, &'static str)], theme: &Theme) -> Line<'a> {
    let mut spans = Vec::new();
    for (i, (key, desc)) in row.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(HELP_SEPARATOR, theme.help_desc));
        }
        spans.push(Span::styled(key.as_str(), theme.help_key));
        spans.push(Span::styled(format!(" {desc}"), theme.help_desc));
    }
    Line::from(spans)
}

fn quit() -> (String, &'static str) {
    ("ctrl+c".to_string(), "quit")
}

/// One short row, or two rows when full help is visible.
fn help_rows(app: &App) -> Vec<HelpRow> {
    let km = &app.keymap;
    let full = app.full_help_visible();
    let retry = app
        .load_error
        .as_ref()
        .map(|_| ("r".to_string(), "retry"));

    match app.screen {
        Screen::Loading => {
            let mut first: HelpRow = retry.into_iter().collect();
            first.push(quit());
            if full {
                vec![first, km.global.help()]
            } else {
                vec![first]
            }
        }
        Screen::PromptList if app.browser.is_filtering() => {
            let first = vec![
                ("Enter".to_string(), "apply filter"),
                ("Esc".to_string(), "cancel filter"),
            ];
            if full {
                vec![
                    first,
                    vec![
                        ("Up/Down".to_string(), "move"),
                        ("ctrl+u".to_string(), "clear"),
                        quit(),
                    ],
                ]
            } else {
                vec![first]
            }
        }
        Screen::PromptList => {
            if full {
                let mut first = km.list.help();
                first.push(("/".to_string(), "search"));
                if app.browser.filter_state() == FilterState::FilterApplied {
                    first.push(("Esc".to_string(), "clear filter"));
                }
                let mut second = vec![
                    ("k/j".to_string(), "up/down"),
                    ("PageUp/PageDown".to_string(), "page"),
                    ("g/G".to_string(), "first/last"),
                ];
                second.extend(km.global.help());
                second.push(quit());
                vec![first, second]
            } else {
                let mut row = vec![("/".to_string(), "search")];
                row.extend(
                    km.global
                        .hint(GlobalAction::ToggleHelp)
                        .map(|keys| (keys, GlobalAction::ToggleHelp.help())),
                );
                row.extend(
                    km.list
                        .hint(ListAction::Create)
                        .map(|keys| (keys, ListAction::Create.help())),
                );
                row.push(quit());
                vec![row]
            }
        }
        Screen::PromptView => {
            let mut first = km.view.help();
            first.push(("k/j".to_string(), "scroll"));
            if full {
                let mut second = km.global.help();
                second.push(quit());
                vec![first, second]
            } else {
                first.extend(km.global.help());
                first.push(quit());
                vec![first]
            }
        }
        Screen::PromptCreation | Screen::VariableInput => {
            let mut first = km.form.help();
            if full {
                vec![
                    first,
                    vec![
                        ("alt+Enter".to_string(), "newline"),
                        ("ctrl+u".to_string(), "clear line"),
                        ("ctrl+w".to_string(), "delete word"),
                        quit(),
                    ],
                ]
            } else {
                first.push(quit());
                vec![first]
            }
        }
    }
}
