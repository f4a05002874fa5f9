//! Sources of job script text.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("script does not exist")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Something that can provide the text of a job script by its identifier.
pub trait ScriptStore {
    fn fetch_script_text(&self, id: &str) -> Result<String, FetchError>;
}

/// Scripts stored as files in a directory, the identifier being the file name.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn script_path(&self, id: &str) -> Result<PathBuf, FetchError> {
        let path = Path::new(id);
        if id.is_empty() || path.components().count() != 1 || path.file_name().is_none() {
            return Err(FetchError::Other(anyhow::anyhow!(
                "'{id}' is not a valid script identifier"
            )));
        }
        Ok(self.root.join(path))
    }
}

impl ScriptStore for DirectoryStore {
    fn fetch_script_text(&self, id: &str) -> Result<String, FetchError> {
        let path = self.script_path(id)?;
        log::debug!("Reading job script from {}", path.display());
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound),
            Err(error) => Err(FetchError::Other(
                anyhow::Error::new(error)
                    .context(format!("Cannot read {}", path.display())),
            )),
        }
    }
}

/// In-memory scripts keyed by identifier.
impl ScriptStore for BTreeMap<String, String> {
    fn fetch_script_text(&self, id: &str) -> Result<String, FetchError> {
        self.get(id).cloned().ok_or(FetchError::NotFound)
    }
}
