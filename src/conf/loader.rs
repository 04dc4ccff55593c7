use super::model::ConfigurationModel;
use super::paths::resolve_config_path;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Load the user's configuration file, falling back to defaults when absent or invalid.
pub fn load() -> ConfigurationModel {
    match resolve_config_path() {
        Some(path) => load_from(&path),
        None => ConfigurationModel::default(),
    }
}

/// Load a specific configuration file, falling back to defaults when it cannot be used.
pub fn load_from(path: &Path) -> ConfigurationModel {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unable to read config file");
            return ConfigurationModel::default();
        }
    };

    match serde_yaml::from_str::<ConfigurationModel>(&contents) {
        Ok(mut cfg) => {
            debug!(path = %path.display(), "loaded config file");
            cfg.set_source_path(path.to_path_buf());
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unable to parse config file");
            ConfigurationModel::default()
        }
    }
}
