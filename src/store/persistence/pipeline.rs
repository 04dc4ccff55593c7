use super::codec::PayloadFormat;
use super::crypto::EncryptionSettings;
use super::error::{PersistenceError, PersistenceResult};
use crate::store::compress::{self, CompressionAlgorithm};
use rand_core::{OsRng, RngCore};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Turns a payload into file body bytes and back.
///
/// The payload is first encoded with the configured [`PayloadFormat`], then
/// passed through each layer in order on the way out and in reverse order on
/// the way in.
pub struct PersistencePipeline {
    format: PayloadFormat,
    layers: Vec<Box<dyn PersistenceLayer + Send + Sync>>,
}

impl PersistencePipeline {
    pub fn new(format: PayloadFormat) -> Self {
        Self {
            format,
            layers: Vec::new(),
        }
    }

    pub fn push_layer(&mut self, layer: Box<dyn PersistenceLayer + Send + Sync>) {
        self.layers.push(layer);
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    pub fn flags(&self) -> u32 {
        self.layers
            .iter()
            .fold(self.format.flag_bit(), |acc, layer| acc | layer.flag_bit())
    }

    pub fn encode_value<T: Serialize>(&self, value: &T) -> PersistenceResult<Vec<u8>> {
        let encoded = self.format.encode(value)?;
        self.encode(encoded)
    }

    pub fn decode_value<T: DeserializeOwned>(&self, body: Vec<u8>) -> PersistenceResult<T> {
        let decoded = self.decode(body)?;
        self.format.decode(&decoded)
    }

    pub fn encode(&self, data: Vec<u8>) -> PersistenceResult<Vec<u8>> {
        self.layers
            .iter()
            .try_fold(data, |current, layer| layer.encode(current))
    }

    pub fn decode(&self, data: Vec<u8>) -> PersistenceResult<Vec<u8>> {
        self.layers
            .iter()
            .rev()
            .try_fold(data, |current, layer| layer.decode(current))
    }
}

pub trait PersistenceLayer {
    fn encode(&self, data: Vec<u8>) -> PersistenceResult<Vec<u8>>;
    fn decode(&self, data: Vec<u8>) -> PersistenceResult<Vec<u8>>;
    fn flag_bit(&self) -> u32;
}

pub struct CompressionLayer {
    algorithm: CompressionAlgorithm,
}

impl CompressionLayer {
    pub fn new(algorithm: CompressionAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl PersistenceLayer for CompressionLayer {
    fn encode(&self, data: Vec<u8>) -> PersistenceResult<Vec<u8>> {
        Ok(compress::compress(&data, self.algorithm)?)
    }

    fn decode(&self, data: Vec<u8>) -> PersistenceResult<Vec<u8>> {
        Ok(compress::decompress(&data, self.algorithm)?)
    }

    fn flag_bit(&self) -> u32 {
        self.algorithm.flag_bit()
    }
}

/// AEAD layer. Output is `salt_len | salt | nonce_len | nonce | ciphertext`.
pub struct EncryptionLayer {
    settings: EncryptionSettings,
}

impl EncryptionLayer {
    pub fn new(settings: EncryptionSettings) -> Self {
        Self { settings }
    }
}

impl PersistenceLayer for EncryptionLayer {
    fn encode(&self, data: Vec<u8>) -> PersistenceResult<Vec<u8>> {
        let material = self.settings.key_source.derive_for_encrypt()?;
        let mut nonce = vec![0u8; self.settings.algorithm.nonce_len()];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .settings
            .algorithm
            .encrypt(&material.key, &nonce, &data)?;

        let salt = material.salt.unwrap_or_default();
        let mut output = Vec::with_capacity(2 + salt.len() + nonce.len() + ciphertext.len());
        output.push(salt.len() as u8);
        output.extend_from_slice(&salt);
        output.push(nonce.len() as u8);
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    fn decode(&self, data: Vec<u8>) -> PersistenceResult<Vec<u8>> {
        let (salt, rest) = split_prefixed(&data)?;
        let (nonce, ciphertext) = split_prefixed(rest)?;
        if nonce.len() != self.settings.algorithm.nonce_len() {
            return Err(PersistenceError::CorruptPayload("nonce length"));
        }

        let salt = (!salt.is_empty()).then_some(salt);
        let key = self.settings.key_source.derive_for_decrypt(salt)?;
        self.settings.algorithm.decrypt(&key, nonce, ciphertext)
    }

    fn flag_bit(&self) -> u32 {
        self.settings.algorithm.flag_bit()
    }
}

/// Split a `len: u8` prefixed field off the front of `data`.
fn split_prefixed(data: &[u8]) -> PersistenceResult<(&[u8], &[u8])> {
    let (&len, rest) = data
        .split_first()
        .ok_or(PersistenceError::CorruptPayload("truncated envelope"))?;
    let len = len as usize;
    if rest.len() < len {
        return Err(PersistenceError::CorruptPayload("truncated envelope"));
    }
    Ok(rest.split_at(len))
}
