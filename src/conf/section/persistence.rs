use super::super::model::ConfigurationModel;
use serde::Deserialize;
use std::path::PathBuf;

/// The `persistence:` block of the config file.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PersistenceConfigSection {
    pub format: Option<String>,
    pub compression: Option<String>,
    pub create_missing_dirs: Option<bool>,
    pub encrypt: Option<bool>,
    pub algorithm: Option<String>,
    pub key_file: Option<String>,
    pub passphrase: Option<String>,
    pub pbkdf2_iterations: Option<u32>,
}

impl PersistenceConfigSection {
    pub fn resolved_key_path(&self, config: &ConfigurationModel) -> Option<PathBuf> {
        self.key_file.as_ref().map(|raw| config.resolve_path(raw))
    }
}
