//! Serde-backed payload formats.

use super::error::{PersistenceError, PersistenceResult};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    #[default]
    Yaml,
    Json,
}

impl PayloadFormat {
    pub fn flag_bit(self) -> u32 {
        match self {
            PayloadFormat::Yaml => 0x0100,
            PayloadFormat::Json => 0x0200,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(PayloadFormat::Yaml),
            "json" => Some(PayloadFormat::Json),
            _ => None,
        }
    }

    pub fn encode<T: Serialize>(self, value: &T) -> PersistenceResult<Vec<u8>> {
        match self {
            PayloadFormat::Yaml => serde_yaml::to_string(value)
                .map(String::into_bytes)
                .map_err(|err| PersistenceError::Serialization(err.to_string())),
            PayloadFormat::Json => serde_json::to_vec(value)
                .map_err(|err| PersistenceError::Serialization(err.to_string())),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> PersistenceResult<T> {
        match self {
            PayloadFormat::Yaml => serde_yaml::from_slice(bytes)
                .map_err(|err| PersistenceError::Deserialization(err.to_string())),
            PayloadFormat::Json => serde_json::from_slice(bytes)
                .map_err(|err| PersistenceError::Deserialization(err.to_string())),
        }
    }
}
