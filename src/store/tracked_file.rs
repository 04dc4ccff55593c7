//! A serializable payload bound to a file, with unsaved-change tracking.

use super::fingerprint::{DiskFingerprint, DiskStatus};
use super::location::FileLocation;
use super::persistence::{
    PersistenceConfig, PersistenceError, PersistenceManager, PersistenceResult,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Holds a payload of type `T` in memory and persists it as a single file.
///
/// Every operation that changes the payload marks the file dirty before it runs,
/// and only a successful [`save`](Self::save) or [`load`](Self::load) clears the
/// flag again. A failed mutation therefore still counts as an unsaved change.
pub struct TrackedFile<T> {
    location: Option<FileLocation>,
    payload: Option<T>,
    dirty: bool,
    fingerprint: Option<DiskFingerprint>,
    manager: PersistenceManager,
}

impl<T> TrackedFile<T> {
    /// A file with no location yet; it has to go through [`save_as`](Self::save_as)
    /// before it can be written.
    pub fn untitled() -> Self {
        Self::untitled_with_config(PersistenceConfig::default())
    }

    pub fn untitled_with_config(config: PersistenceConfig) -> Self {
        Self {
            location: None,
            payload: None,
            dirty: false,
            fingerprint: None,
            manager: PersistenceManager::new(config),
        }
    }

    pub fn get_data(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// Replace the payload. Always marks the file dirty.
    pub fn set_data(&mut self, value: T) {
        self.mutate(|payload| *payload = Some(value));
    }

    /// Run `change` against the payload as a mutating operation.
    ///
    /// The file is marked dirty before `change` runs, so the flag is set even
    /// when `change` returns an error or panics. Whatever `change` returns is
    /// handed back unchanged.
    pub fn mutate<R>(&mut self, change: impl FnOnce(&mut Option<T>) -> R) -> R {
        self.mark_changed();
        change(&mut self.payload)
    }

    /// Record that in-memory state has diverged from disk.
    pub fn mark_changed(&mut self) {
        if !self.dirty {
            trace!(path = ?self.absolute_path(), "tracked file marked dirty");
        }
        self.dirty = true;
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn location(&self) -> Option<&FileLocation> {
        self.location.as_ref()
    }

    pub fn absolute_path(&self) -> Option<PathBuf> {
        self.location.as_ref().map(FileLocation::absolute_path)
    }

    pub fn directory(&self) -> Option<&Path> {
        self.location.as_ref().map(FileLocation::directory)
    }

    pub fn name(&self) -> Option<&str> {
        self.location.as_ref().map(FileLocation::name)
    }

    pub fn extension(&self) -> Option<&str> {
        self.location.as_ref().map(FileLocation::extension)
    }

    pub fn config(&self) -> &PersistenceConfig {
        self.manager.config()
    }

    /// Point at a new location without reading or writing anything.
    ///
    /// Used after the file was moved or deleted externally. The next
    /// [`save`](Self::save) writes to `path`.
    pub fn relocate(&mut self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let location = FileLocation::from_path(path)?;
        debug!(
            from = ?self.absolute_path(),
            to = %location.absolute_path().display(),
            "tracked file relocated"
        );
        self.location = Some(location);
        self.fingerprint = None;
        Ok(())
    }

    /// Alias of [`relocate`](Self::relocate) for the delete-recovery flow.
    pub fn recover_from_delete(&mut self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        self.relocate(path)
    }

    /// Compare the file on disk with what was there at the last load or save.
    pub fn disk_status(&self) -> PersistenceResult<DiskStatus> {
        match &self.location {
            Some(location) => Ok(DiskStatus::check(
                &location.absolute_path(),
                self.fingerprint.as_ref(),
            )?),
            None => Ok(DiskStatus::Untracked),
        }
    }

    fn remember_disk_state(&mut self, path: &Path) {
        self.fingerprint = match DiskFingerprint::capture(path) {
            Ok(fingerprint) => Some(fingerprint),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unable to fingerprint tracked file");
                None
            }
        };
    }

    fn require_path(&self) -> PersistenceResult<PathBuf> {
        self.absolute_path()
            .ok_or_else(|| PersistenceError::MissingLocation("name, extension and directory".into()))
    }
}

impl<T> TrackedFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind to `path` with the default persistence settings.
    ///
    /// An existing file is loaded; a missing one leaves the payload empty. The
    /// file is never created here and the result starts clean either way.
    pub fn open(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        Self::open_with_config(path, PersistenceConfig::default())
    }

    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: PersistenceConfig,
    ) -> PersistenceResult<Self> {
        let mut file = Self::untitled_with_config(config);
        file.location = Some(FileLocation::from_path(path)?);
        match file.load() {
            Ok(()) => {}
            Err(PersistenceError::NotFound(path)) => {
                debug!(path = %path.display(), "no file on disk yet, starting empty");
            }
            Err(err) => return Err(err),
        }
        Ok(file)
    }

    /// Write the payload to the current location and mark the file clean.
    ///
    /// On failure the dirty flag is left as it was.
    pub fn save(&mut self) -> PersistenceResult<()> {
        let path = self.require_path()?;
        self.manager.store(&path, self.payload.as_ref())?;
        self.dirty = false;
        self.remember_disk_state(&path);
        Ok(())
    }

    /// Save to `path` and adopt it as the file's location.
    ///
    /// The previous location is kept if the write fails.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let location = FileLocation::from_path(path)?;
        let path = location.absolute_path();
        self.manager.store(&path, self.payload.as_ref())?;
        self.location = Some(location);
        self.dirty = false;
        self.remember_disk_state(&path);
        Ok(())
    }

    /// Replace the in-memory payload with the file's contents, discarding unsaved
    /// changes.
    ///
    /// Nothing changes in memory if the read fails.
    pub fn load(&mut self) -> PersistenceResult<()> {
        let path = self.require_path()?;
        let payload = self.manager.load(&path)?;
        self.payload = payload;
        self.dirty = false;
        self.remember_disk_state(&path);
        Ok(())
    }
}

impl<T> Default for TrackedFile<T> {
    fn default() -> Self {
        Self::untitled()
    }
}

impl<T: fmt::Debug> fmt::Debug for TrackedFile<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedFile")
            .field("location", &self.location)
            .field("payload", &self.payload)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
