//! Custom file types that persist serde data to disk and track unsaved changes.

pub mod conf;
pub mod store;

pub use store::custom_file::CustomFile;
pub use store::fingerprint::DiskStatus;
pub use store::location::FileLocation;
pub use store::persistence::{ErrorKind, PayloadFormat, PersistenceConfig, PersistenceError};
pub use store::tracked_file::TrackedFile;
