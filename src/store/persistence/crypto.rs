use super::error::{PersistenceError, PersistenceResult};
use crate::conf::ConfigurationModel;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce as AesNonce};
use chacha20poly1305::{ChaCha20Poly1305, Nonce as ChaChaNonce};
use hex::FromHex;
use pbkdf2::pbkdf2_hmac;
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub(crate) const ENCRYPT_ENV: &str = "TRACKED_FILE_ENCRYPT";
const ENCRYPT_ALGO_ENV: &str = "TRACKED_FILE_ALGO";
const ENCRYPT_KEY_ENV: &str = "TRACKED_FILE_KEY";
const ENCRYPT_KEY_FILE_ENV: &str = "TRACKED_FILE_KEY_FILE";
const ENCRYPT_PASSPHRASE_ENV: &str = "TRACKED_FILE_PASSPHRASE";
const ENCRYPT_PBKDF_ITERS_ENV: &str = "TRACKED_FILE_PBKDF_ITERS";
const DEFAULT_PBKDF2_ITERS: u32 = 600_000;
const KEY_LEN: usize = 32;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Pick the encryption mode from the environment first, then the config file.
///
/// A broken encryption setup is logged and treated as disabled rather than
/// failing construction.
pub fn resolve_encryption(config: Option<&ConfigurationModel>) -> EncryptionMode {
    let from_env = env::var(ENCRYPT_ENV)
        .map(|val| super::config::is_truthy(&val))
        .unwrap_or(false);

    let attempt = if from_env {
        KeyInputs::from_env().into_mode()
    } else {
        match config {
            Some(cfg) if cfg.persistence.encrypt.unwrap_or(false) => {
                KeyInputs::from_config(cfg).into_mode()
            }
            _ => return EncryptionMode::Disabled,
        }
    };

    attempt.unwrap_or_else(|err| {
        warn!(error = %err, "encryption disabled due to configuration error");
        EncryptionMode::Disabled
    })
}

#[derive(Debug, Clone, Default)]
pub enum EncryptionMode {
    #[default]
    Disabled,
    Enabled(EncryptionSettings),
}

#[derive(Debug, Clone)]
pub struct EncryptionSettings {
    pub algorithm: EncryptionAlgorithm,
    pub key_source: EncryptionKeySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionAlgorithm {
    #[default]
    ChaCha20Poly1305,
    Aes256Gcm,
}

impl EncryptionAlgorithm {
    pub fn flag_bit(&self) -> u32 {
        match self {
            EncryptionAlgorithm::ChaCha20Poly1305 => 0x0001,
            EncryptionAlgorithm::Aes256Gcm => 0x0002,
        }
    }

    pub fn nonce_len(&self) -> usize {
        NONCE_LEN
    }

    pub fn from_name(value: &str) -> PersistenceResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "aes256gcm" | "aes-256-gcm" => Ok(EncryptionAlgorithm::Aes256Gcm),
            "chacha20poly1305" | "chacha20" | "chacha" | "default" => {
                Ok(EncryptionAlgorithm::ChaCha20Poly1305)
            }
            other => Err(PersistenceError::InvalidEncryptionConfig(format!(
                "unknown algorithm '{other}'"
            ))),
        }
    }

    pub fn encrypt(
        &self,
        key: &[u8; KEY_LEN],
        nonce: &[u8],
        plaintext: &[u8],
    ) -> PersistenceResult<Vec<u8>> {
        match self {
            EncryptionAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new(key.into())
                .encrypt(ChaChaNonce::from_slice(nonce), plaintext)
                .map_err(|_| PersistenceError::Crypto("ChaCha20-Poly1305 encryption failure")),
            EncryptionAlgorithm::Aes256Gcm => Aes256Gcm::new(key.into())
                .encrypt(AesNonce::from_slice(nonce), plaintext)
                .map_err(|_| PersistenceError::Crypto("AES-256-GCM encryption failure")),
        }
    }

    pub fn decrypt(
        &self,
        key: &[u8; KEY_LEN],
        nonce: &[u8],
        ciphertext: &[u8],
    ) -> PersistenceResult<Vec<u8>> {
        match self {
            EncryptionAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new(key.into())
                .decrypt(ChaChaNonce::from_slice(nonce), ciphertext)
                .map_err(|_| PersistenceError::Undecryptable("ChaCha20-Poly1305 decryption failure")),
            EncryptionAlgorithm::Aes256Gcm => Aes256Gcm::new(key.into())
                .decrypt(AesNonce::from_slice(nonce), ciphertext)
                .map_err(|_| PersistenceError::Undecryptable("AES-256-GCM decryption failure")),
        }
    }
}

#[derive(Debug, Clone)]
pub enum EncryptionKeySource {
    RawKey([u8; KEY_LEN]),
    Passphrase { passphrase: String, iterations: u32 },
}

impl EncryptionKeySource {
    pub fn derive_for_encrypt(&self) -> PersistenceResult<KeyMaterial> {
        match self {
            EncryptionKeySource::RawKey(key) => Ok(KeyMaterial {
                key: *key,
                salt: None,
            }),
            EncryptionKeySource::Passphrase {
                passphrase,
                iterations,
            } => {
                let mut salt = [0u8; SALT_LEN];
                OsRng.fill_bytes(&mut salt);
                Ok(KeyMaterial {
                    key: derive_key_from_passphrase(passphrase, &salt, *iterations),
                    salt: Some(salt.to_vec()),
                })
            }
        }
    }

    pub fn derive_for_decrypt(&self, salt: Option<&[u8]>) -> PersistenceResult<[u8; KEY_LEN]> {
        match (self, salt) {
            (EncryptionKeySource::RawKey(key), None) => Ok(*key),
            (EncryptionKeySource::RawKey(_), Some(_)) => {
                Err(PersistenceError::InvalidEncryptionConfig(
                    "file was sealed with a passphrase but a raw key is configured".into(),
                ))
            }
            (EncryptionKeySource::Passphrase { .. }, None) => Err(PersistenceError::MissingSalt),
            (
                EncryptionKeySource::Passphrase {
                    passphrase,
                    iterations,
                },
                Some(salt),
            ) => {
                if salt.len() != SALT_LEN {
                    return Err(PersistenceError::InvalidEncryptionConfig(
                        "encrypted file salt length mismatch".into(),
                    ));
                }
                Ok(derive_key_from_passphrase(passphrase, salt, *iterations))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub key: [u8; KEY_LEN],
    pub salt: Option<Vec<u8>>,
}

fn derive_key_from_passphrase(passphrase: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut key);
    key
}

/// Raw encryption inputs gathered from either the environment or a config file.
#[derive(Debug, Default)]
struct KeyInputs {
    algorithm: Option<String>,
    key_hex: Option<String>,
    key_file: Option<PathBuf>,
    passphrase: Option<String>,
    iterations: Option<u32>,
}

impl KeyInputs {
    fn from_env() -> Self {
        Self {
            algorithm: env::var(ENCRYPT_ALGO_ENV).ok(),
            key_hex: env::var(ENCRYPT_KEY_ENV).ok(),
            key_file: env::var_os(ENCRYPT_KEY_FILE_ENV).map(PathBuf::from),
            passphrase: env::var(ENCRYPT_PASSPHRASE_ENV).ok(),
            iterations: env::var(ENCRYPT_PBKDF_ITERS_ENV)
                .ok()
                .and_then(|raw| raw.trim().parse::<u32>().ok()),
        }
    }

    fn from_config(config: &ConfigurationModel) -> Self {
        let section = &config.persistence;
        Self {
            algorithm: section.algorithm.clone(),
            key_hex: None,
            key_file: section.resolved_key_path(config),
            passphrase: section.passphrase.clone(),
            iterations: section.pbkdf2_iterations,
        }
    }

    fn into_mode(self) -> PersistenceResult<EncryptionMode> {
        let algorithm = match self.algorithm.as_deref() {
            Some(name) => EncryptionAlgorithm::from_name(name)?,
            None => EncryptionAlgorithm::default(),
        };

        let key_source = if let Some(hex) = self.key_hex {
            EncryptionKeySource::RawKey(decode_hex_key(&hex)?)
        } else if let Some(path) = self.key_file {
            let contents = fs::read_to_string(&path)?;
            EncryptionKeySource::RawKey(decode_hex_key(&contents)?)
        } else if let Some(passphrase) = self.passphrase {
            if passphrase.is_empty() {
                return Err(PersistenceError::InvalidEncryptionConfig(
                    "passphrase cannot be empty".into(),
                ));
            }
            EncryptionKeySource::Passphrase {
                passphrase,
                iterations: self
                    .iterations
                    .filter(|iters| *iters > 0)
                    .unwrap_or(DEFAULT_PBKDF2_ITERS),
            }
        } else {
            return Err(PersistenceError::MissingEncryptionKey);
        };

        Ok(EncryptionMode::Enabled(EncryptionSettings {
            algorithm,
            key_source,
        }))
    }
}

fn decode_hex_key(input: &str) -> PersistenceResult<[u8; KEY_LEN]> {
    let sanitized: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    <[u8; KEY_LEN]>::from_hex(&sanitized)
        .map_err(|_| PersistenceError::InvalidEncryptionConfig("invalid hex key material".into()))
}
