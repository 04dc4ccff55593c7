pub mod compress;
pub mod custom_file;
pub mod fingerprint;
pub mod location;
pub mod persistence;
pub mod tracked_file;
