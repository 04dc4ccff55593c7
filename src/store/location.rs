//! Where a tracked file lives on disk.

use crate::store::persistence::{PersistenceError, PersistenceResult};
use normalize_path::NormalizePath;
use std::env;
use std::path::{Path, PathBuf};

/// An absolute, normalized file path split into the parts callers usually want.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    directory: PathBuf,
    file_name: String,
}

impl FileLocation {
    /// Build a location from `path`, anchoring relative paths at the current directory.
    pub fn from_path(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.normalize()
        } else {
            env::current_dir()?.join(path).normalize()
        };

        let file_name = absolute
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| PersistenceError::MissingLocation("name".into()))?;
        let directory = absolute
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| PersistenceError::MissingLocation("directory".into()))?;

        Ok(Self {
            directory,
            file_name,
        })
    }

    pub fn absolute_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name up to the first `.`, so `notes.tar.gz` is `notes`.
    pub fn name(&self) -> &str {
        self.file_name
            .split('.')
            .next()
            .unwrap_or(self.file_name.as_str())
    }

    /// Last extension including its dot (`.gz`), or `""` when there is none.
    pub fn extension(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(idx) if idx > 0 => &self.file_name[idx..],
            _ => "",
        }
    }
}
