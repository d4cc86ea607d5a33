//! At-rest encryption
//!
//! AES-256-GCM with a SHA-256 derived key. Output is
//! `base64(nonce || ciphertext)`. When encryption is disabled both
//! directions pass text through unchanged.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::settings::Settings;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("Invalid base64 payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Encrypted payload is too short")]
    Truncated,

    #[error("Decryption failed: wrong key or corrupted data")]
    Decrypt,

    #[error("Encryption failed")]
    Encrypt,

    #[error("Decrypted text is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encrypts and decrypts save file contents
pub struct Encryption {
    cipher: Option<Aes256Gcm>,
}

impl std::fmt::Debug for Encryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encryption").field("enabled", &self.is_enabled()).finish()
    }
}

/// Name of the current login, used in derived keys
fn login_id() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "player".to_string())
}

/// Key text for the given settings: the configured key, or
/// `{project}_{login}` when none is set
pub fn key_material(settings: &Settings) -> String {
    if settings.encryption_key.is_empty() {
        format!("{}_{}", settings.project_name, login_id())
    } else {
        settings.encryption_key.clone()
    }
}

/// 32 random bytes, base64 encoded
pub fn generate_random_key() -> String {
    let mut key = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut key);
    STANDARD.encode(key)
}

impl Encryption {
    /// Pass-through encryption
    pub fn disabled() -> Self {
        Self { cipher: None }
    }

    /// Encryption keyed by SHA-256 of `key`
    pub fn with_key(key: &str) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        Self { cipher: Some(Aes256Gcm::new(&digest)) }
    }

    /// Enabled only when the settings ask for it
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.enable_encryption {
            Self::with_key(&key_material(settings))
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn encrypt_string(&self, plain: &str) -> Result<String, EncryptionError> {
        let Some(cipher) = &self.cipher else {
            return Ok(plain.to_string());
        };

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plain.as_bytes())
            .map_err(|_| EncryptionError::Encrypt)?;

        let mut payload = Vec::with_capacity(NONCE_LEN + sealed.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&sealed);
        Ok(STANDARD.encode(payload))
    }

    pub fn decrypt_string(&self, encoded: &str) -> Result<String, EncryptionError> {
        let Some(cipher) = &self.cipher else {
            return Ok(encoded.to_string());
        };

        let payload = STANDARD.decode(encoded.trim())?;
        if payload.len() < NONCE_LEN + TAG_LEN {
            return Err(EncryptionError::Truncated);
        }
        let (nonce, sealed) = payload.split_at(NONCE_LEN);
        let plain = cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| EncryptionError::Decrypt)?;
        Ok(String::from_utf8(plain)?)
    }
}
