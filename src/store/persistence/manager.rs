use super::binary::BinaryContainer;
use super::config::PersistenceConfig;
use super::crypto::EncryptionMode;
use super::error::PersistenceResult;
use super::pipeline::{CompressionLayer, EncryptionLayer, PersistencePipeline};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Reads and writes whole payloads using one resolved [`PersistenceConfig`].
pub struct PersistenceManager {
    config: PersistenceConfig,
    pipeline: PersistencePipeline,
}

impl PersistenceManager {
    pub fn new(config: PersistenceConfig) -> Self {
        let mut pipeline = PersistencePipeline::new(config.format());
        pipeline.push_layer(Box::new(CompressionLayer::new(config.compression())));
        if let EncryptionMode::Enabled(settings) = config.encryption().clone() {
            pipeline.push_layer(Box::new(EncryptionLayer::new(settings)));
        }
        Self { config, pipeline }
    }

    /// Read the payload at `path`; `None` when the file was saved empty.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> PersistenceResult<Option<T>> {
        BinaryContainer::load(path, &self.pipeline)
    }

    /// Write `value` to `path`, recording `None` as an empty file.
    pub fn store<T: Serialize>(&self, path: &Path, value: Option<&T>) -> PersistenceResult<()> {
        BinaryContainer::store(
            path,
            &self.pipeline,
            value,
            self.config.creates_missing_dirs(),
        )
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }
}

impl Default for PersistenceManager {
    fn default() -> Self {
        Self::new(PersistenceConfig::default())
    }
}
