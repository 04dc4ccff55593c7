use super::codec::PayloadFormat;
use super::crypto::{self, EncryptionMode};
use crate::conf::ConfigurationModel;
use crate::store::compress::CompressionAlgorithm;
use std::env;
use tracing::warn;

const FORMAT_ENV: &str = "TRACKED_FILE_FORMAT";
const COMPRESSION_ENV: &str = "TRACKED_FILE_COMPRESSION";

/// How a tracked file turns its payload into bytes on disk.
#[derive(Debug, Clone, Default)]
pub struct PersistenceConfig {
    format: PayloadFormat,
    compression: CompressionAlgorithm,
    encryption: EncryptionMode,
    create_missing_dirs: bool,
}

impl PersistenceConfig {
    /// Resolve settings from the environment alone.
    pub fn from_env() -> Self {
        Self::from_sources(None)
    }

    /// Resolve settings from a loaded config file, with environment variables taking
    /// precedence over it.
    pub fn from_sources(config: Option<&ConfigurationModel>) -> Self {
        let section = config.map(|cfg| &cfg.persistence);

        let format = resolve_named(
            FORMAT_ENV,
            section.and_then(|s| s.format.as_deref()),
            PayloadFormat::from_name,
            "payload format",
        );
        let compression = resolve_named(
            COMPRESSION_ENV,
            section.and_then(|s| s.compression.as_deref()),
            CompressionAlgorithm::from_name,
            "compression algorithm",
        );

        Self {
            format,
            compression,
            encryption: crypto::resolve_encryption(config),
            create_missing_dirs: section
                .and_then(|s| s.create_missing_dirs)
                .unwrap_or(false),
        }
    }

    pub fn with_format(mut self, format: PayloadFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_encryption(mut self, encryption: EncryptionMode) -> Self {
        self.encryption = encryption;
        self
    }

    /// Create missing parent directories on save instead of failing.
    pub fn with_missing_dirs_created(mut self, create: bool) -> Self {
        self.create_missing_dirs = create;
        self
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    pub fn compression(&self) -> CompressionAlgorithm {
        self.compression
    }

    pub fn encryption(&self) -> &EncryptionMode {
        &self.encryption
    }

    pub fn creates_missing_dirs(&self) -> bool {
        self.create_missing_dirs
    }
}

fn resolve_named<T: Default>(
    env_key: &str,
    configured: Option<&str>,
    parse: fn(&str) -> Option<T>,
    what: &str,
) -> T {
    if let Ok(value) = env::var(env_key) {
        match parse(&value) {
            Some(parsed) => return parsed,
            None => warn!(%value, "unknown {what} in {env_key}, falling back"),
        }
    }

    if let Some(name) = configured {
        match parse(name) {
            Some(parsed) => return parsed,
            None => warn!(value = name, "unknown {what} in config, falling back to default"),
        }
    }

    T::default()
}

pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
