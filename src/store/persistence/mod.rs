mod binary;
mod codec;
mod config;
mod crypto;
mod error;
mod manager;
mod pipeline;

pub use codec::PayloadFormat;
pub use config::PersistenceConfig;
pub use crypto::{EncryptionAlgorithm, EncryptionKeySource, EncryptionMode, EncryptionSettings};
pub use error::{ErrorKind, PersistenceError, PersistenceResult};
pub use manager::PersistenceManager;
