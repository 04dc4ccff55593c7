//! Detect changes made to a tracked file behind its back.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// What the file looked like the last time we read or wrote it.
///
/// The content digest is always recorded, so a same-length rewrite that lands
/// within the filesystem's timestamp resolution still shows up as a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskFingerprint {
    modified: Option<SystemTime>,
    len: u64,
    digest: [u8; 32],
}

impl DiskFingerprint {
    pub fn capture(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            ));
        }

        let bytes = fs::read(path)?;
        Ok(DiskFingerprint {
            modified: metadata.modified().ok(),
            len: metadata.len(),
            digest: Sha256::digest(&bytes).into(),
        })
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn byte_len(&self) -> u64 {
        self.len
    }

    /// Same bytes on disk, regardless of timestamps.
    pub fn same_contents(&self, other: &DiskFingerprint) -> bool {
        self.len == other.len && self.digest == other.digest
    }
}

/// Relationship between the on-disk file and the last load or save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskStatus {
    /// Nothing has been loaded from or saved to the current location yet.
    Untracked,
    Unchanged,
    /// Something else rewrote, replaced or renamed over the file.
    Modified,
    /// The file was deleted or moved away.
    Missing,
}

impl DiskStatus {
    pub fn check(path: &Path, recorded: Option<&DiskFingerprint>) -> io::Result<Self> {
        let Some(recorded) = recorded else {
            return Ok(DiskStatus::Untracked);
        };

        match DiskFingerprint::capture(path) {
            Ok(current) if current.same_contents(recorded) => Ok(DiskStatus::Unchanged),
            Ok(_) => Ok(DiskStatus::Modified),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(DiskStatus::Missing),
            Err(err) => Err(err),
        }
    }
}
