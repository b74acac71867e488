use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use promptgen_core::config::DEFAULT_STATUS_TIMEOUT;
use promptgen_core::keymap::{
    load_toml_config, FormAction, GlobalAction, Keymap, ListAction, ViewAction,
};
use promptgen_core::prompt::{Prompt, PromptCollection};
use promptgen_core::template;

use crate::theme::Theme;
use crate::ui;
use crate::widgets::browser::Browser;
use crate::widgets::spinner::Spinner;
use crate::widgets::text_field::TextField;
use crate::widgets::viewport::Viewport;

pub const CREATE_LABELS: [&str; 4] = ["Title", "Tags (comma-sep)", "Description", "Content"];
/// Index of the only multi-line field of the creation form.
const CONTENT_FIELD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    PromptList,
    PromptView,
    PromptCreation,
    VariableInput,
}

/// Everything that can reach the session: terminal input and the results of
/// background work.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize { width: u16, height: u16 },
    Tick,
    PromptsLoaded(PromptCollection),
    LoadFailed(String),
    /// `warning` is set when the copy went through without the doc file.
    CopyDone { warning: Option<String> },
    CopyFailed(String),
    PromptSaved,
    SaveFailed(String),
    Status(String),
    StatusExpired(u64),
}

/// Work the session asks the event loop to run off-thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LoadPrompts,
    CopyToClipboard(Prompt),
    SavePrompt(Prompt),
    ExpireStatus { id: u64, after: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub id: u64,
}

/// Startup configuration, read once and handed to [`App::new`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub keymap: Keymap,
    pub theme: Theme,
    pub status_timeout: Duration,
    /// Start with full help rather than the one-line summary.
    pub show_help: bool,
}

impl SessionConfig {
    pub fn load(monochrome: bool) -> Self {
        let mut toml = load_toml_config();
        let settings = toml.settings.take().unwrap_or_default();
        Self {
            keymap: Keymap::from_toml(&toml),
            theme: if monochrome {
                Theme::monochrome()
            } else {
                Theme::default()
            },
            status_timeout: settings.status_timeout(),
            show_help: settings.show_help(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keymap: Keymap::default(),
            theme: Theme::default(),
            status_timeout: DEFAULT_STATUS_TIMEOUT,
            show_help: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Create,
    Variables,
}

#[derive(Debug)]
pub struct FormField {
    pub label: String,
    pub input: TextField,
}

/// Ordered labeled fields with exactly one focused.
#[derive(Debug)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub active: usize,
}

impl Form {
    fn new<S: AsRef<str>>(kind: FormKind, labels: &[S], width: u16) -> Self {
        let mut fields: Vec<FormField> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let multiline = match kind {
                    FormKind::Create => i == CONTENT_FIELD,
                    FormKind::Variables => true,
                };
                let mut input = if multiline {
                    TextField::multiline()
                } else {
                    TextField::new()
                };
                input.set_width(width);
                FormField {
                    label: label.as_ref().to_string(),
                    input,
                }
            })
            .collect();
        if let Some(first) = fields.first_mut() {
            first.input.focus();
        }
        Self {
            kind,
            fields,
            active: 0,
        }
    }

    pub fn focused_mut(&mut self) -> Option<&mut TextField> {
        self.fields.get_mut(self.active).map(|f| &mut f.input)
    }

    fn blur(&mut self) {
        if let Some(field) = self.focused_mut() {
            field.blur();
        }
    }

    /// Move focus one field forward or back, wrapping around.
    fn cycle(&mut self, forward: bool) {
        let n = self.fields.len();
        if n == 0 {
            return;
        }
        self.blur();
        self.active = if forward {
            (self.active + 1) % n
        } else {
            (self.active + n - 1) % n
        };
        if let Some(field) = self.focused_mut() {
            field.focus();
        }
    }

    fn value(&self, index: usize) -> String {
        self.fields
            .get(index)
            .map(|f| f.input.value())
            .unwrap_or_default()
    }

    fn values_by_label(&self) -> HashMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.label.clone(), f.input.value()))
            .collect()
    }

    fn set_width(&mut self, width: u16) {
        for field in &mut self.fields {
            field.input.set_width(width);
        }
    }
}

pub struct App {
    pub screen: Screen,
    pub prompts: PromptCollection,
    pub browser: Browser<Prompt>,
    pub viewport: Viewport,
    pub spinner: Spinner,
    /// Copy of the prompt being viewed.
    pub selected: Option<Prompt>,
    pub form: Option<Form>,
    /// Values collected by the last variable form.
    pub variables: HashMap<String, String>,
    pub status: Option<StatusMessage>,
    next_status_id: u64,
    /// User toggle for full help.
    pub show_help: bool,
    /// Whether the current screen offers full help at all.
    pub full_help: bool,
    /// Last load error while in `Loading`.
    pub load_error: Option<String>,
    /// A save request is in flight.
    pub save_pending: bool,
    pub width: u16,
    pub height: u16,
    pub should_quit: bool,
    pub keymap: Keymap,
    pub theme: Theme,
    status_timeout: Duration,
    requests: mpsc::UnboundedSender<Request>,
}

impl App {
    pub fn new(config: SessionConfig, requests: mpsc::UnboundedSender<Request>) -> Self {
        Self {
            screen: Screen::Loading,
            prompts: PromptCollection::default(),
            browser: Browser::new(),
            viewport: Viewport::default(),
            spinner: Spinner::default(),
            selected: None,
            form: None,
            variables: HashMap::new(),
            status: None,
            next_status_id: 0,
            show_help: config.show_help,
            full_help: true,
            load_error: None,
            save_pending: false,
            width: 0,
            height: 0,
            should_quit: false,
            keymap: config.keymap,
            theme: config.theme,
            status_timeout: config.status_timeout,
            requests,
        }
    }

    /// Kick off the initial load.
    pub fn start(&mut self) {
        self.enter_loading();
    }

    pub fn full_help_visible(&self) -> bool {
        self.show_help && self.full_help
    }

    /// True while keystrokes are text for a filter or a form field.
    pub fn accepts_text(&self) -> bool {
        match self.screen {
            Screen::PromptCreation | Screen::VariableInput => true,
            Screen::PromptList => self.browser.is_filtering(),
            Screen::Loading | Screen::PromptView => false,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Paste(text) => self.handle_paste(&text),
            AppEvent::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.update_layout();
            }
            AppEvent::Tick => {
                if self.screen == Screen::Loading {
                    self.spinner.tick();
                }
            }
            AppEvent::PromptsLoaded(collection) => self.apply_loaded(collection),
            AppEvent::LoadFailed(err) => {
                warn!(error = %err, "loading prompts failed");
                if self.screen == Screen::Loading {
                    self.load_error = Some(err.clone());
                }
                self.set_status(format!("ERROR: {err}"), StatusKind::Error);
            }
            AppEvent::CopyDone { warning: None } => {
                self.set_status("Copied to clipboard!", StatusKind::Success);
            }
            AppEvent::CopyDone {
                warning: Some(warning),
            } => {
                self.set_status(
                    format!("Copied to clipboard! ({warning})"),
                    StatusKind::Error,
                );
            }
            AppEvent::CopyFailed(err) => self.set_status(err, StatusKind::Error),
            AppEvent::PromptSaved => {
                self.save_pending = false;
                self.set_status("Prompt saved!", StatusKind::Success);
                if self.screen == Screen::PromptCreation {
                    if let Some(form) = self.form.as_mut() {
                        form.blur();
                    }
                    self.form = None;
                    self.enter_loading();
                }
            }
            AppEvent::SaveFailed(err) => {
                self.save_pending = false;
                self.set_status(format!("Error saving prompt: {err}"), StatusKind::Error);
            }
            AppEvent::Status(text) => self.set_status(text, StatusKind::Info),
            AppEvent::StatusExpired(id) => {
                if self.status.as_ref().is_some_and(|s| s.id == id) {
                    self.status = None;
                }
            }
        }
    }

    // ── Key handling ──

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if !self.accepts_text()
            && self.keymap.global.action(key) == Some(GlobalAction::ToggleHelp)
        {
            self.show_help = !self.show_help;
            self.update_layout();
            return;
        }

        match self.screen {
            Screen::Loading => self.handle_loading_key(key),
            Screen::PromptList => self.handle_list_key(key),
            Screen::PromptView => self.handle_view_key(key),
            Screen::PromptCreation | Screen::VariableInput => self.handle_form_key(key),
        }
    }

    fn handle_loading_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('r') && self.load_error.is_some() {
            info!("retrying prompt load");
            self.enter_loading();
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        if self.browser.is_filtering() {
            self.browser.handle_key(key);
            return;
        }
        match self.keymap.list.action(key) {
            Some(ListAction::Select) => {
                if let Some(prompt) = self.browser.selected_item().cloned() {
                    self.open_prompt(prompt);
                }
            }
            Some(ListAction::Create) => self.open_form(FormKind::Create),
            None => self.browser.handle_key(key),
        }
    }

    fn handle_view_key(&mut self, key: KeyEvent) {
        match self.keymap.view.action(key) {
            Some(ViewAction::Back) => {
                self.selected = None;
                self.viewport.set_content("");
                self.switch_to(Screen::PromptList);
            }
            Some(ViewAction::Copy) => {
                if let Some(prompt) = &self.selected {
                    self.send(Request::CopyToClipboard(prompt.clone()));
                }
            }
            Some(ViewAction::Fill)
                if self.selected.as_ref().is_some_and(Prompt::has_variables) =>
            {
                self.open_form(FormKind::Variables);
            }
            _ => self.viewport.handle_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        if key.code == KeyCode::Enter
            && key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT)
        {
            if let Some(field) = form.focused_mut() {
                field.handle_key(key);
            }
            return;
        }

        match self.keymap.form.action(key) {
            Some(FormAction::Cancel) => self.cancel_form(),
            Some(FormAction::Confirm) => self.confirm_form(),
            Some(action @ (FormAction::NextField | FormAction::PrevField)) => {
                if form.fields.len() > 1 {
                    form.cycle(action == FormAction::NextField);
                } else if let Some(field) = form.focused_mut() {
                    field.handle_key(key);
                }
            }
            None => {
                if let Some(field) = form.focused_mut() {
                    field.handle_key(key);
                }
            }
        }
    }

    fn handle_paste(&mut self, text: &str) {
        match self.screen {
            Screen::PromptList => self.browser.handle_paste(text),
            Screen::PromptCreation | Screen::VariableInput => {
                if let Some(field) = self.form.as_mut().and_then(Form::focused_mut) {
                    field.insert_str(text);
                }
            }
            Screen::Loading | Screen::PromptView => {}
        }
    }

    // ── Transitions ──

    fn enter_loading(&mut self) {
        debug!(cached = self.prompts.len(), "loading prompts");
        self.load_error = None;
        self.switch_to(Screen::Loading);
        self.send(Request::LoadPrompts);
    }

    fn apply_loaded(&mut self, collection: PromptCollection) {
        if self.screen != Screen::Loading {
            debug!(screen = ?self.screen, "ignoring prompts loaded outside Loading");
            return;
        }
        info!(count = collection.len(), "prompts ready");
        self.browser.set_items(collection.prompts.clone());
        self.prompts = collection;
        self.load_error = None;
        self.switch_to(Screen::PromptList);
    }

    fn open_prompt(&mut self, prompt: Prompt) {
        let undeclared = prompt.undeclared_variables();
        if !undeclared.is_empty() {
            warn!(
                title = %prompt.title,
                ?undeclared,
                "content uses variables the prompt does not declare"
            );
        }
        self.viewport.set_content(&prompt.content);
        self.viewport.goto_top();
        self.selected = Some(prompt);
        self.switch_to(Screen::PromptView);
    }

    fn open_form(&mut self, kind: FormKind) {
        let width = ui::field_width(self.width);
        let (form, screen) = match kind {
            FormKind::Create => (
                Form::new(kind, &CREATE_LABELS, width),
                Screen::PromptCreation,
            ),
            FormKind::Variables => {
                let labels = self
                    .selected
                    .as_ref()
                    .map(|p| p.variables.clone())
                    .unwrap_or_default();
                (Form::new(kind, &labels, width), Screen::VariableInput)
            }
        };
        self.form = Some(form);
        self.switch_to(screen);
    }

    fn close_form(&mut self) -> Option<Form> {
        let mut form = self.form.take()?;
        form.blur();
        let back = match form.kind {
            FormKind::Create => Screen::PromptList,
            FormKind::Variables => Screen::PromptView,
        };
        self.switch_to(back);
        Some(form)
    }

    fn cancel_form(&mut self) {
        self.close_form();
        self.variables.clear();
    }

    fn confirm_form(&mut self) {
        let Some(kind) = self.form.as_ref().map(|f| f.kind) else {
            return;
        };
        match kind {
            FormKind::Variables => self.confirm_variables(),
            FormKind::Create => self.confirm_create(),
        }
    }

    fn confirm_variables(&mut self) {
        let Some(form) = self.close_form() else {
            return;
        };
        self.variables = form.values_by_label();
        if let Some(selected) = &self.selected {
            let mut filled = selected.clone();
            filled.content = template::substitute(&selected.content, &self.variables);
            self.send(Request::CopyToClipboard(filled));
        }
    }

    fn confirm_create(&mut self) {
        if self.save_pending {
            debug!("save already in flight");
            return;
        }
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let title = form.value(0);
        let tags = form.value(1);
        let description = form.value(2);
        let content = form.value(CONTENT_FIELD);

        if title.trim().is_empty() {
            self.set_status("Title cannot be empty", StatusKind::Error);
            return;
        }
        if content.trim().is_empty() {
            self.set_status("Content cannot be empty", StatusKind::Error);
            return;
        }

        let prompt = Prompt::from_form(&title, &tags, &description, &content);
        self.save_pending = true;
        self.send(Request::SavePrompt(prompt));
    }

    fn switch_to(&mut self, screen: Screen) {
        debug!(from = ?self.screen, to = ?screen, "screen change");
        self.screen = screen;
        self.full_help = screen != Screen::PromptView;
        self.update_layout();
    }

    // ── Status ──

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.next_status_id += 1;
        let id = self.next_status_id;
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            id,
        });
        self.send(Request::ExpireStatus {
            id,
            after: self.status_timeout,
        });
    }

    fn send(&self, request: Request) {
        if self.requests.send(request).is_err() {
            warn!("request channel closed");
        }
    }

    // ── Layout ──

    /// Push the terminal size down into the widgets.
    fn update_layout(&mut self) {
        let body = ui::body_height(self.height, self.full_help_visible());
        self.browser.set_page_size(ui::list_page_size(body));

        let header = self
            .selected
            .as_ref()
            .map(ui::view_header_height)
            .unwrap_or(0);
        let (vw, vh) = ui::viewport_size(self.width, body, header);
        self.viewport.set_size(vw, vh);

        let field_width = ui::field_width(self.width);
        if let Some(form) = self.form.as_mut() {
            form.set_width(field_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ch(c: char) -> AppEvent {
        key(KeyCode::Char(c))
    }

    fn prompt(title: &str, tags: &[&str], variables: &[&str]) -> Prompt {
        Prompt {
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            content: format!("{title} says {{{{{{name}}}}}}"),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            ..Prompt::default()
        }
    }

    fn collection() -> PromptCollection {
        PromptCollection::new(vec![
            prompt("Alpha", &["code"], &["name"]),
            prompt("Beta", &["writing"], &[]),
            prompt("Gamma", &["code", "review"], &["name", "tone"]),
        ])
    }

    fn new_app() -> (App, mpsc::UnboundedReceiver<Request>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = App::new(SessionConfig::default(), tx);
        app.handle_event(AppEvent::Resize {
            width: 100,
            height: 40,
        });
        (app, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Request>) -> Vec<Request> {
        let mut out = Vec::new();
        while let Ok(req) = rx.try_recv() {
            out.push(req);
        }
        out
    }

    /// Requests other than status expiry timers.
    fn work(rx: &mut mpsc::UnboundedReceiver<Request>) -> Vec<Request> {
        drain(rx)
            .into_iter()
            .filter(|r| !matches!(r, Request::ExpireStatus { .. }))
            .collect()
    }

    fn loaded_app() -> (App, mpsc::UnboundedReceiver<Request>) {
        let (mut app, mut rx) = new_app();
        app.start();
        app.handle_event(AppEvent::PromptsLoaded(collection()));
        drain(&mut rx);
        (app, rx)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(ch(c));
        }
    }

    fn status_text(app: &App) -> Option<&str> {
        app.status.as_ref().map(|s| s.text.as_str())
    }

    // ── Loading ──

    #[test]
    fn start_requests_load() {
        let (mut app, mut rx) = new_app();
        assert_eq!(app.screen, Screen::Loading);
        app.start();
        assert_eq!(drain(&mut rx), vec![Request::LoadPrompts]);
    }

    #[test]
    fn loaded_prompts_open_list_with_full_help() {
        let (app, _rx) = loaded_app();
        assert_eq!(app.screen, Screen::PromptList);
        assert_eq!(app.prompts.len(), 3);
        assert_eq!(app.browser.visible_len(), 3);
        assert!(app.full_help_visible());
    }

    #[test]
    fn load_failure_stays_loading_and_retry_reloads() {
        let (mut app, mut rx) = new_app();
        app.start();
        drain(&mut rx);
        app.handle_event(AppEvent::LoadFailed("bad yaml".to_string()));
        assert_eq!(app.screen, Screen::Loading);
        assert_eq!(app.load_error.as_deref(), Some("bad yaml"));
        assert_eq!(status_text(&app), Some("ERROR: bad yaml"));
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Error);

        app.handle_event(ch('r'));
        assert!(app.load_error.is_none());
        assert_eq!(work(&mut rx), vec![Request::LoadPrompts]);
    }

    #[test]
    fn retry_key_ignored_without_error() {
        let (mut app, mut rx) = new_app();
        app.start();
        drain(&mut rx);
        app.handle_event(ch('r'));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn stale_load_result_ignored() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(AppEvent::PromptsLoaded(PromptCollection::default()));
        assert_eq!(app.prompts.len(), 3);
        assert_eq!(app.screen, Screen::PromptList);
    }

    #[test]
    fn tick_spins_only_while_loading() {
        let (mut app, _rx) = new_app();
        let before = app.spinner.frame();
        app.handle_event(AppEvent::Tick);
        assert_ne!(app.spinner.frame(), before);

        let (mut app, _rx) = loaded_app();
        let before = app.spinner.frame();
        app.handle_event(AppEvent::Tick);
        assert_eq!(app.spinner.frame(), before);
    }

    // ── List and view ──

    #[test]
    fn select_then_back_returns_to_list() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::PromptView);
        assert_eq!(app.selected.as_ref().unwrap().title, "Alpha");
        assert!(!app.full_help);

        app.handle_event(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::PromptList);
        assert!(app.selected.is_none());
        assert!(app.full_help);

        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Left));
        assert_eq!(app.screen, Screen::PromptList);
    }

    #[test]
    fn select_on_empty_list_is_noop() {
        let (mut app, _rx) = new_app();
        app.start();
        app.handle_event(AppEvent::PromptsLoaded(PromptCollection::default()));
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::PromptList);
    }

    #[test]
    fn view_scrolls_to_top_on_open() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.viewport.offset(), 0);
    }

    #[test]
    fn filter_keys_go_to_browser() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(ch('/'));
        assert!(app.accepts_text());
        // 'n' and '?' are text while filtering
        type_text(&mut app, "n?");
        assert_eq!(app.screen, Screen::PromptList);
        assert_eq!(app.browser.filter_text(), "n?");
        assert!(app.show_help);
    }

    #[test]
    fn filtered_selection_opens_match() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(ch('/'));
        type_text(&mut app, "review");
        app.handle_event(key(KeyCode::Enter));
        assert!(!app.browser.is_filtering());
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.selected.as_ref().unwrap().title, "Gamma");
    }

    #[test]
    fn navigation_keys_move_selection() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(ch('j'));
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.selected.as_ref().unwrap().title, "Beta");
    }

    #[test]
    fn copy_sends_selected_prompt() {
        let (mut app, mut rx) = loaded_app();
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(ch('c'));
        let reqs = work(&mut rx);
        assert_eq!(reqs.len(), 1);
        match &reqs[0] {
            Request::CopyToClipboard(p) => assert_eq!(p.title, "Alpha"),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn toggle_help_outside_text_entry() {
        let (mut app, _rx) = loaded_app();
        assert!(app.show_help);
        app.handle_event(ch('?'));
        assert!(!app.show_help);
        assert!(!app.full_help_visible());
        app.handle_event(ch('?'));
        assert!(app.show_help);
        assert_eq!(app.screen, Screen::PromptList);
    }

    #[test]
    fn ctrl_c_quits_from_any_screen() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(ch('n'));
        app.handle_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit);

        let (mut app, _rx) = new_app();
        app.handle_event(AppEvent::Key(KeyEvent::new_with_kind(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        )));
        assert!(app.should_quit);
    }

    // ── Variable form ──

    #[test]
    fn fill_without_variables_does_nothing() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(ch('j'));
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.selected.as_ref().unwrap().title, "Beta");
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::PromptView);
        assert!(app.form.is_none());
    }

    #[test]
    fn fill_variables_and_copy_rendered() {
        let (mut app, mut rx) = loaded_app();
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::VariableInput);
        let labels: Vec<&str> = app
            .form
            .as_ref()
            .unwrap()
            .fields
            .iter()
            .map(|f| f.label.as_str())
            .collect();
        assert_eq!(labels, vec!["name"]);

        type_text(&mut app, "World");
        app.handle_event(key(KeyCode::Enter));

        assert_eq!(app.screen, Screen::PromptView);
        assert!(app.form.is_none());
        assert_eq!(app.variables.get("name").map(String::as_str), Some("World"));
        let reqs = work(&mut rx);
        match &reqs[..] {
            [Request::CopyToClipboard(p)] => {
                assert_eq!(p.content, "Alpha says World");
                assert_eq!(p.title, "Alpha");
            }
            other => panic!("unexpected requests {other:?}"),
        }
        // The viewed prompt keeps its template.
        assert_eq!(app.selected.as_ref().unwrap().content, "Alpha says {{{name}}}");
    }

    #[test]
    fn single_field_up_down_go_to_editor() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Tab));
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.form.as_ref().unwrap().active, 0);
        assert!(app.form.as_ref().unwrap().fields[0].input.is_focused());
    }

    #[test]
    fn variable_form_cycles_between_fields() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(ch('G'));
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.selected.as_ref().unwrap().title, "Gamma");
        app.handle_event(key(KeyCode::Enter));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.fields.len(), 2);

        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.form.as_ref().unwrap().active, 1);
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.form.as_ref().unwrap().active, 0);
        app.handle_event(key(KeyCode::BackTab));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.active, 1);
        assert!(form.fields[1].input.is_focused());
        assert!(!form.fields[0].input.is_focused());
    }

    #[test]
    fn cancel_variable_form_returns_to_view() {
        let (mut app, mut rx) = loaded_app();
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Enter));
        type_text(&mut app, "x");
        app.handle_event(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::PromptView);
        assert!(app.form.is_none());
        assert!(app.variables.is_empty());
        assert!(work(&mut rx).is_empty());
    }

    // ── Creation form ──

    fn open_create(app: &mut App) {
        app.handle_event(ch('n'));
        assert_eq!(app.screen, Screen::PromptCreation);
    }

    #[test]
    fn create_form_has_four_fields() {
        let (mut app, _rx) = loaded_app();
        open_create(&mut app);
        let form = app.form.as_ref().unwrap();
        let labels: Vec<&str> = form.fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, CREATE_LABELS.to_vec());
        assert!(form.fields[0].input.is_focused());
        assert!(app.full_help);
    }

    #[test]
    fn blank_title_rejected_without_request() {
        let (mut app, mut rx) = loaded_app();
        open_create(&mut app);
        type_text(&mut app, "   ");
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::PromptCreation);
        assert_eq!(status_text(&app), Some("Title cannot be empty"));
        assert!(work(&mut rx).is_empty());
        assert!(!app.save_pending);
    }

    #[test]
    fn blank_content_rejected_without_request() {
        let (mut app, mut rx) = loaded_app();
        open_create(&mut app);
        type_text(&mut app, "My prompt");
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(status_text(&app), Some("Content cannot be empty"));
        assert!(work(&mut rx).is_empty());
    }

    fn fill_create_form(app: &mut App) {
        type_text(app, "Delta");
        app.handle_event(key(KeyCode::Tab));
        type_text(app, " a, b ,, c");
        app.handle_event(key(KeyCode::Down));
        type_text(app, "desc");
        app.handle_event(key(KeyCode::Tab));
        type_text(app, "body");
    }

    #[test]
    fn valid_form_sends_save_once() {
        let (mut app, mut rx) = loaded_app();
        open_create(&mut app);
        fill_create_form(&mut app);
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Enter));

        let reqs = work(&mut rx);
        match &reqs[..] {
            [Request::SavePrompt(p)] => {
                assert_eq!(p.title, "Delta");
                assert_eq!(p.tags, vec!["a", "b", "c"]);
                assert_eq!(p.description, "desc");
                assert_eq!(p.content, "body");
            }
            other => panic!("unexpected requests {other:?}"),
        }
        assert!(app.save_pending);
        assert_eq!(app.screen, Screen::PromptCreation);
    }

    #[test]
    fn saved_prompt_reloads() {
        let (mut app, mut rx) = loaded_app();
        open_create(&mut app);
        fill_create_form(&mut app);
        app.handle_event(key(KeyCode::Enter));
        drain(&mut rx);

        app.handle_event(AppEvent::PromptSaved);
        assert_eq!(app.screen, Screen::Loading);
        assert!(app.form.is_none());
        assert!(!app.save_pending);
        assert_eq!(status_text(&app), Some("Prompt saved!"));
        assert_eq!(work(&mut rx), vec![Request::LoadPrompts]);
    }

    #[test]
    fn save_failure_keeps_form() {
        let (mut app, mut rx) = loaded_app();
        open_create(&mut app);
        fill_create_form(&mut app);
        app.handle_event(key(KeyCode::Enter));
        drain(&mut rx);

        app.handle_event(AppEvent::SaveFailed("disk full".to_string()));
        assert_eq!(app.screen, Screen::PromptCreation);
        assert_eq!(app.form.as_ref().unwrap().value(0), "Delta");
        assert_eq!(status_text(&app), Some("Error saving prompt: disk full"));
        assert!(!app.save_pending);

        app.handle_event(key(KeyCode::Enter));
        assert_eq!(work(&mut rx).len(), 1);
    }

    #[test]
    fn saved_after_cancel_only_reports() {
        let (mut app, mut rx) = loaded_app();
        open_create(&mut app);
        fill_create_form(&mut app);
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::PromptList);
        drain(&mut rx);

        app.handle_event(AppEvent::PromptSaved);
        assert_eq!(app.screen, Screen::PromptList);
        assert!(work(&mut rx).is_empty());
    }

    #[test]
    fn alt_enter_adds_newline_only_in_content() {
        let (mut app, mut rx) = loaded_app();
        open_create(&mut app);
        let alt_enter = AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        type_text(&mut app, "a");
        app.handle_event(alt_enter);
        type_text(&mut app, "b");
        assert_eq!(app.form.as_ref().unwrap().value(0), "ab");

        app.handle_event(key(KeyCode::BackTab));
        assert_eq!(app.form.as_ref().unwrap().active, 3);
        type_text(&mut app, "x");
        app.handle_event(AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)));
        type_text(&mut app, "y");
        assert_eq!(app.form.as_ref().unwrap().value(3), "x\ny");
        assert_eq!(app.screen, Screen::PromptCreation);
        assert!(work(&mut rx).is_empty());
    }

    #[test]
    fn pasted_title_is_flattened() {
        let (mut app, _rx) = loaded_app();
        open_create(&mut app);
        app.handle_event(AppEvent::Paste("two\nlines".to_string()));
        assert_eq!(app.form.as_ref().unwrap().value(0), "two lines");
    }

    #[test]
    fn modified_keys_do_not_trigger_bindings() {
        let (mut app, mut rx) = loaded_app();
        app.handle_event(AppEvent::Key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL)));
        assert_eq!(app.screen, Screen::PromptList);

        app.handle_event(key(KeyCode::Enter));
        app.handle_event(AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::ALT)));
        assert_eq!(app.screen, Screen::PromptView);
        assert!(work(&mut rx).is_empty());
    }

    #[test]
    fn paste_goes_to_focused_field() {
        let (mut app, _rx) = loaded_app();
        open_create(&mut app);
        app.handle_event(AppEvent::Paste("Pasted title".to_string()));
        assert_eq!(app.form.as_ref().unwrap().value(0), "Pasted title");
    }

    #[test]
    fn help_key_is_text_in_forms() {
        let (mut app, _rx) = loaded_app();
        open_create(&mut app);
        app.handle_event(ch('?'));
        assert!(app.show_help);
        assert_eq!(app.form.as_ref().unwrap().value(0), "?");
    }

    // ── Status ──

    #[test]
    fn every_status_schedules_expiry() {
        let (mut app, mut rx) = loaded_app();
        app.handle_event(AppEvent::CopyDone { warning: None });
        assert_eq!(status_text(&app), Some("Copied to clipboard!"));
        let id = app.status.as_ref().unwrap().id;
        assert_eq!(
            drain(&mut rx),
            vec![Request::ExpireStatus {
                id,
                after: DEFAULT_STATUS_TIMEOUT
            }]
        );
        app.handle_event(AppEvent::StatusExpired(id));
        assert!(app.status.is_none());
    }

    #[test]
    fn superseded_status_survives_old_timer() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(AppEvent::Status("first".to_string()));
        let first = app.status.as_ref().unwrap().id;
        app.handle_event(AppEvent::CopyFailed("Clipboard error: none".to_string()));
        app.handle_event(AppEvent::StatusExpired(first));
        assert_eq!(status_text(&app), Some("Clipboard error: none"));
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn copy_with_doc_warning_reports_error() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(AppEvent::CopyDone {
            warning: Some("error loading doc file 'x'".to_string()),
        });
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.starts_with("Copied to clipboard!"));
    }

    // ── Layout ──

    #[test]
    fn resize_updates_widgets_without_changing_screen() {
        let (mut app, _rx) = loaded_app();
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(AppEvent::Resize {
            width: 60,
            height: 20,
        });
        assert_eq!(app.screen, Screen::PromptView);
        assert_eq!((app.width, app.height), (60, 20));
        let body = ui::body_height(20, app.full_help_visible());
        let header = ui::view_header_height(app.selected.as_ref().unwrap());
        assert_eq!(app.viewport.height(), ui::viewport_size(60, body, header).1);
    }
}
