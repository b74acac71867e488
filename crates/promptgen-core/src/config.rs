//! Path helpers, prompt file resolution, and `[settings]` loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const APP_NAME: &str = "promptgen";
pub const DEFAULT_PROMPT_FILENAME: &str = "prompts.yaml";
pub const CONFIG_FILENAME: &str = "config.toml";
pub const LOG_FILENAME: &str = "promptgen.log";
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Config directory: `$XDG_CONFIG_HOME/promptgen/` or `~/.config/promptgen/`
pub fn config_dir() -> Option<PathBuf> {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })?;
    Some(base.join(APP_NAME))
}

/// Path to the keymap/settings file: `~/.config/promptgen/config.toml`
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILENAME))
}

/// Base data directory: `~/.local/share/promptgen/`
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_NAME))
}

/// Path to the log file: `~/.local/share/promptgen/promptgen.log`
pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join(LOG_FILENAME))
}

/// Where the prompt file path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFileSource {
    /// Given with `--file`.
    Explicit,
    /// `prompts.yaml` in the working directory.
    Local,
    /// Existing file in the config directory.
    Config,
    /// Config directory path for a file that does not exist yet.
    New,
}

impl PromptFileSource {
    pub fn label(&self) -> &'static str {
        match self {
            PromptFileSource::Explicit => "specified",
            PromptFileSource::Local => "local",
            PromptFileSource::Config => "config",
            PromptFileSource::New => "new",
        }
    }
}

/// Pick the prompt file: explicit path, then `./prompts.yaml`, then the
/// config directory. Directories that will hold the file are created.
pub fn resolve_prompt_file(
    explicit: Option<&Path>,
) -> Result<(PathBuf, PromptFileSource), ConfigError> {
    resolve_prompt_file_in(explicit, Path::new("."), config_dir())
}

/// [`resolve_prompt_file`] with the working directory and config directory
/// supplied by the caller.
pub fn resolve_prompt_file_in(
    explicit: Option<&Path>,
    working_dir: &Path,
    config_dir: Option<PathBuf>,
) -> Result<(PathBuf, PromptFileSource), ConfigError> {
    if let Some(path) = explicit {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        return Ok((path.to_path_buf(), PromptFileSource::Explicit));
    }

    let local = working_dir.join(DEFAULT_PROMPT_FILENAME);
    if local.is_file() {
        return Ok((local, PromptFileSource::Local));
    }

    let dir = config_dir.ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join(DEFAULT_PROMPT_FILENAME);
    if path.is_file() {
        return Ok((path, PromptFileSource::Config));
    }
    ensure_dir(&dir)?;
    Ok((path, PromptFileSource::New))
}

fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// `[settings]` table of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TomlSettings {
    pub status_timeout_secs: Option<u64>,
    pub show_help: Option<bool>,
}

impl TomlSettings {
    pub fn status_timeout(&self) -> Duration {
        match self.status_timeout_secs {
            Some(0) | None => DEFAULT_STATUS_TIMEOUT,
            Some(secs) => Duration::from_secs(secs),
        }
    }

    pub fn show_help(&self) -> bool {
        self.show_help.unwrap_or(true)
    }
}
