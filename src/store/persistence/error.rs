use crate::store::compress::CompressionError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no file found at '{}'", .0.display())]
    NotFound(PathBuf),
    #[error("unable to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("payload could not be serialized: {0}")]
    Serialization(String),
    #[error("payload could not be deserialized: {0}")]
    Deserialization(String),
    #[error("the file {0} must be known before it can be saved")]
    MissingLocation(String),
    #[error("persistence I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid tracked file magic header")]
    InvalidMagic,
    #[error("unsupported tracked file version {0}")]
    UnsupportedVersion(u32),
    #[error("unsupported tracked file flags {0:#X}")]
    UnsupportedFlags(u32),
    #[error("persistence encryption key is missing")]
    MissingEncryptionKey,
    #[error("persistence encrypted payload missing salt information")]
    MissingSalt,
    #[error("invalid encryption configuration: {0}")]
    InvalidEncryptionConfig(String),
    #[error("encryption failure: {0}")]
    Crypto(&'static str),
    #[error("payload could not be decrypted: {0}")]
    Undecryptable(&'static str),
    #[error("corrupt tracked file payload: {0}")]
    CorruptPayload(&'static str),
    #[error("compression failure: {0}")]
    Compression(#[from] CompressionError),
}

/// Coarse classification of a [`PersistenceError`].
///
/// Anything wrong with the bytes read from disk is `Deserialization`, including a
/// payload that fails to decrypt with the configured key. `Crypto` is reserved
/// for failures while sealing a payload on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Deserialization,
    Write,
    Serialization,
    MissingLocation,
    Io,
    Config,
    Crypto,
}

impl PersistenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PersistenceError::NotFound(_) => ErrorKind::NotFound,
            PersistenceError::Write { .. } => ErrorKind::Write,
            PersistenceError::Serialization(_) => ErrorKind::Serialization,
            PersistenceError::Deserialization(_)
            | PersistenceError::InvalidMagic
            | PersistenceError::UnsupportedVersion(_)
            | PersistenceError::UnsupportedFlags(_)
            | PersistenceError::CorruptPayload(_)
            | PersistenceError::Undecryptable(_)
            | PersistenceError::Compression(_) => ErrorKind::Deserialization,
            PersistenceError::MissingLocation(_) => ErrorKind::MissingLocation,
            PersistenceError::Io(_) => ErrorKind::Io,
            PersistenceError::MissingEncryptionKey
            | PersistenceError::MissingSalt
            | PersistenceError::InvalidEncryptionConfig(_) => ErrorKind::Config,
            PersistenceError::Crypto(_) => ErrorKind::Crypto,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PersistenceError::Write {
            path: path.into(),
            source,
        }
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
