//! YAML-backed prompt persistence.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::prompt::{Prompt, PromptCollection};

/// Load-all / append access to the prompt collection.
pub trait PromptStore: Send + Sync {
    /// Load every prompt, sorted by title. A missing store is an empty collection.
    fn load_all(&self) -> Result<PromptCollection, StoreError>;

    /// Add one prompt and rewrite the store, keeping it sorted.
    fn append(&self, prompt: Prompt) -> Result<(), StoreError>;
}

/// A single YAML file holding a `prompts:` list.
#[derive(Debug, Clone)]
pub struct YamlStore {
    path: PathBuf,
}

impl YamlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sort and atomically replace the file with `collection`.
    pub fn save_all(&self, collection: &mut PromptCollection) -> Result<(), StoreError> {
        collection.sort_by_title();
        let yaml = serde_yaml::to_string(collection).map_err(StoreError::Serialize)?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        // Write next to the target so the final rename stays on one filesystem.
        let write_err = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(yaml.as_bytes()).map_err(write_err)?;
        // The temp file is created 0600; keep whatever mode the old file had.
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(write_err)?;
        }
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;

        debug!(path = %self.path.display(), count = collection.len(), "prompt file written");
        Ok(())
    }
}

impl PromptStore for YamlStore {
    fn load_all(&self) -> Result<PromptCollection, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "prompt file missing, starting empty");
                return Ok(PromptCollection::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        // An empty file deserializes to nothing rather than an error.
        let mut collection: PromptCollection = if data.trim().is_empty() {
            PromptCollection::default()
        } else {
            serde_yaml::from_str(&data).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?
        };
        collection.sort_by_title();

        info!(path = %self.path.display(), count = collection.len(), "prompts loaded");
        Ok(collection)
    }

    fn append(&self, prompt: Prompt) -> Result<(), StoreError> {
        let mut collection = self.load_all()?;
        let title = prompt.title.clone();
        collection.push(prompt);
        self.save_all(&mut collection)?;
        info!(path = %self.path.display(), %title, "prompt saved");
        Ok(())
    }
}
