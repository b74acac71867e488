//! Error types for the prompt store, markup export, clipboard, and config.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing the prompt file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read prompt file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse YAML from '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to serialize prompts to YAML: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("failed to create directory '{}': {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to save prompt file '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to replace prompt file '{}': {source}", path.display())]
    Persist { path: PathBuf, source: io::Error },
}

/// Failures producing the XML export of a prompt.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("XML generation error: {0}")]
    Markup(String),

    /// The attached doc file could not be read. The prompt itself was
    /// serialized and is available through [`ExportError::partial_output`].
    #[error("error loading doc file '{}': {source}", path.display())]
    Doc {
        path: PathBuf,
        partial: String,
        source: io::Error,
    },
}

impl ExportError {
    /// The document produced before the failure, if any.
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            ExportError::Doc { partial, .. } => Some(partial),
            ExportError::Markup(_) => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("{0}")]
    System(#[from] arboard::Error),
}

/// Failures resolving config and data paths.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not resolve a config directory (is $HOME set?)")]
    NoConfigDir,

    #[error("could not create directory '{}': {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
}
