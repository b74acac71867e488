//! Rebindable keys. Each screen has its own action set, and `config.toml`
//! can replace the keys of any action by name.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{config_path, TomlSettings};

/// `config.toml`. Binding tables map an action name to its key names.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub settings: Option<TomlSettings>,
    pub global: HashMap<String, Vec<String>>,
    pub list: HashMap<String, Vec<String>>,
    pub view: HashMap<String, Vec<String>>,
    pub form: HashMap<String, Vec<String>>,
}

/// Read the user's `config.toml`, or defaults when there is none.
pub fn load_toml_config() -> TomlConfig {
    config_path()
        .map(|path| read_config(&path))
        .unwrap_or_default()
}

/// A missing file gives defaults; an unparsable one is logged and ignored.
pub fn read_config(path: &Path) -> TomlConfig {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no config file");
            return TomlConfig::default();
        }
    };
    toml::from_str(&text).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring invalid config file");
        TomlConfig::default()
    })
}

// ── Key names ──

/// Names accepted besides single characters.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("Enter", KeyCode::Enter),
    ("Esc", KeyCode::Esc),
    ("Tab", KeyCode::Tab),
    ("BackTab", KeyCode::BackTab),
    ("Backspace", KeyCode::Backspace),
    ("Delete", KeyCode::Delete),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("Space", KeyCode::Char(' ')),
];

pub fn parse_key(name: &str) -> Option<KeyCode> {
    if let Some(&(_, code)) = NAMED_KEYS.iter().find(|(n, _)| *n == name) {
        return Some(code);
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeyCode::Char(c)),
        _ => None,
    }
}

pub fn key_name(code: KeyCode) -> String {
    if let Some((name, _)) = NAMED_KEYS.iter().find(|(_, c)| *c == code) {
        return (*name).to_string();
    }
    match code {
        KeyCode::Char(c) => c.to_string(),
        _ => "?".to_string(),
    }
}

// ── Actions ──

/// A screen's action set.
pub trait Action: Copy + Eq + 'static {
    /// Every action, in the order help lists them.
    const ALL: &'static [Self];
    /// Key used in `config.toml`.
    fn config_name(self) -> &'static str;
    fn help(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    ToggleHelp,
}

impl Action for GlobalAction {
    const ALL: &'static [Self] = &[GlobalAction::ToggleHelp];

    fn config_name(self) -> &'static str {
        "toggle_help"
    }

    fn help(self) -> &'static str {
        "toggle help"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Select,
    Create,
}

impl Action for ListAction {
    const ALL: &'static [Self] = &[ListAction::Select, ListAction::Create];

    fn config_name(self) -> &'static str {
        match self {
            ListAction::Select => "select",
            ListAction::Create => "create",
        }
    }

    fn help(self) -> &'static str {
        match self {
            ListAction::Select => "select",
            ListAction::Create => "new prompt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Copy,
    Fill,
    Back,
}

impl Action for ViewAction {
    const ALL: &'static [Self] = &[ViewAction::Copy, ViewAction::Fill, ViewAction::Back];

    fn config_name(self) -> &'static str {
        match self {
            ViewAction::Copy => "copy",
            ViewAction::Fill => "fill",
            ViewAction::Back => "back",
        }
    }

    fn help(self) -> &'static str {
        match self {
            ViewAction::Copy => "copy XML",
            ViewAction::Fill => "fill variables",
            ViewAction::Back => "back",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    NextField,
    PrevField,
    Confirm,
    Cancel,
}

impl Action for FormAction {
    const ALL: &'static [Self] = &[
        FormAction::NextField,
        FormAction::PrevField,
        FormAction::Confirm,
        FormAction::Cancel,
    ];

    fn config_name(self) -> &'static str {
        match self {
            FormAction::NextField => "next_field",
            FormAction::PrevField => "prev_field",
            FormAction::Confirm => "confirm",
            FormAction::Cancel => "cancel",
        }
    }

    fn help(self) -> &'static str {
        match self {
            FormAction::NextField => "next field",
            FormAction::PrevField => "previous field",
            FormAction::Confirm => "confirm",
            FormAction::Cancel => "cancel",
        }
    }
}

// ── Bindings ──

/// Key to action map for one screen.
#[derive(Debug, Clone)]
pub struct Bindings<A> {
    keys: HashMap<KeyCode, A>,
}

impl<A: Action> Bindings<A> {
    fn new(defaults: &[(KeyCode, A)]) -> Self {
        Self {
            keys: defaults.iter().copied().collect(),
        }
    }

    /// Bindings are plain keys, so Ctrl and Alt chords never match.
    pub fn action(&self, key: KeyEvent) -> Option<A> {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        self.keys.get(&key.code).copied()
    }

    /// Replace every key of `action`. Names that do not parse are skipped,
    /// so an empty or all-invalid list unbinds the action.
    pub fn rebind(&mut self, action: A, names: &[String]) {
        self.keys.retain(|_, a| *a != action);
        for name in names {
            match parse_key(name) {
                Some(code) => {
                    self.keys.insert(code, action);
                }
                None => warn!(key = %name, action = action.config_name(), "unknown key name"),
            }
        }
    }

    fn apply(&mut self, table: &HashMap<String, Vec<String>>) {
        for (name, keys) in table {
            match A::ALL.iter().find(|a| a.config_name() == name) {
                Some(&action) => self.rebind(action, keys),
                None => warn!(action = %name, "unknown action in config"),
            }
        }
    }

    /// Keys bound to `action`, in a stable display order.
    pub fn keys(&self, action: A) -> Vec<KeyCode> {
        let mut keys: Vec<KeyCode> = self
            .keys
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(code, _)| *code)
            .collect();
        keys.sort_by_key(|code| key_name(*code));
        keys
    }

    /// Key names of `action` joined with `/`, e.g. "Esc/Left".
    pub fn hint(&self, action: A) -> Option<String> {
        let keys = self.keys(action);
        if keys.is_empty() {
            return None;
        }
        let names: Vec<String> = keys.into_iter().map(key_name).collect();
        Some(names.join("/"))
    }

    /// (keys, description) for every bound action.
    pub fn help(&self) -> Vec<(String, &'static str)> {
        A::ALL
            .iter()
            .filter_map(|&a| self.hint(a).map(|keys| (keys, a.help())))
            .collect()
    }
}

/// All bindings for a session.
#[derive(Debug, Clone)]
pub struct Keymap {
    pub global: Bindings<GlobalAction>,
    pub list: Bindings<ListAction>,
    pub view: Bindings<ViewAction>,
    pub form: Bindings<FormAction>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            global: Bindings::new(&[(KeyCode::Char('?'), GlobalAction::ToggleHelp)]),
            list: Bindings::new(&[
                (KeyCode::Enter, ListAction::Select),
                (KeyCode::Char('n'), ListAction::Create),
            ]),
            view: Bindings::new(&[
                (KeyCode::Char('c'), ViewAction::Copy),
                (KeyCode::Enter, ViewAction::Fill),
                (KeyCode::Esc, ViewAction::Back),
                (KeyCode::Left, ViewAction::Back),
            ]),
            form: Bindings::new(&[
                (KeyCode::Tab, FormAction::NextField),
                (KeyCode::Down, FormAction::NextField),
                (KeyCode::BackTab, FormAction::PrevField),
                (KeyCode::Up, FormAction::PrevField),
                (KeyCode::Enter, FormAction::Confirm),
                (KeyCode::Esc, FormAction::Cancel),
            ]),
        }
    }
}

impl Keymap {
    /// Defaults with the config's binding tables applied on top.
    pub fn from_toml(config: &TomlConfig) -> Self {
        let mut keymap = Self::default();
        keymap.global.apply(&config.global);
        keymap.list.apply(&config.list);
        keymap.view.apply(&config.view);
        keymap.form.apply(&config.form);
        keymap
    }
}
