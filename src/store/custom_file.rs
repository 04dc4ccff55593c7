//! Building block for user-defined file types.

use super::fingerprint::DiskStatus;
use super::persistence::PersistenceResult;
use super::tracked_file::TrackedFile;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// A custom file type backed by a [`TrackedFile`].
///
/// Implementors only expose their inner tracked file; the load/save surface and
/// change tracking come for free. Methods that change state should go through
/// [`makes_changes`](CustomFile::makes_changes) so the file is marked dirty.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tracked_file::{CustomFile, TrackedFile};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Scores(Vec<u32>);
///
/// struct ScoreFile(TrackedFile<Scores>);
///
/// impl CustomFile for ScoreFile {
///     type Data = Scores;
///
///     fn file(&self) -> &TrackedFile<Scores> {
///         &self.0
///     }
///
///     fn file_mut(&mut self) -> &mut TrackedFile<Scores> {
///         &mut self.0
///     }
/// }
///
/// impl ScoreFile {
///     fn record(&mut self, score: u32) {
///         self.makes_changes(|file| {
///             file.0
///                 .mutate(|data| data.get_or_insert_with(Scores::default).0.push(score))
///         });
///     }
/// }
///
/// let mut scores = ScoreFile(TrackedFile::untitled());
/// scores.record(42);
/// assert!(scores.has_unsaved_changes());
/// ```
pub trait CustomFile {
    type Data: Serialize + DeserializeOwned;

    fn file(&self) -> &TrackedFile<Self::Data>;

    fn file_mut(&mut self) -> &mut TrackedFile<Self::Data>;

    /// Run `change` as a mutating operation: the file is marked dirty first,
    /// whatever `change` goes on to do.
    fn makes_changes<R>(&mut self, change: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.file_mut().mark_changed();
        change(self)
    }

    fn get_data(&self) -> Option<&Self::Data> {
        self.file().get_data()
    }

    fn set_data(&mut self, data: Self::Data) {
        self.file_mut().set_data(data);
    }

    fn has_unsaved_changes(&self) -> bool {
        self.file().has_unsaved_changes()
    }

    fn save(&mut self) -> PersistenceResult<()> {
        self.file_mut().save()
    }

    fn save_as(&mut self, path: impl AsRef<Path>) -> PersistenceResult<()>
    where
        Self: Sized,
    {
        self.file_mut().save_as(path)
    }

    fn load(&mut self) -> PersistenceResult<()> {
        self.file_mut().load()
    }

    fn absolute_path(&self) -> Option<PathBuf> {
        self.file().absolute_path()
    }

    fn disk_status(&self) -> PersistenceResult<DiskStatus> {
        self.file().disk_status()
    }
}
