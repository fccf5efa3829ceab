//! **Store vault**: AES-256-GCM sealing for the user data file.
//!
//! ## Wire Format
//!
//! Each sealed blob is `[12-byte nonce][ciphertext+16-byte tag]`. The nonce is
//! drawn from `OsRng` on every call, so no outside metadata is needed to open a
//! blob. A wrong key or any flipped byte fails authentication instead of
//! yielding garbage.

use super::secret_key::SecretKey;
use crate::error::VaultError;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};

/// AES-256-GCM nonce length (96 bits).
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// Seals and opens blobs under one [`SecretKey`].
pub struct SecretVault {
    cipher: Aes256Gcm,
}

impl SecretVault {
    pub fn new(key: &SecretKey) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        Self { cipher }
    }

    /// Encrypts `data` into `[nonce || ciphertext+tag]`.
    pub fn encrypt_blob(&self, data: &[u8]) -> Result<Vec<u8>, VaultError> {
        let nonce = Aes256Gcm::generate_nonce(OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, data)
            .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;
        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Opens a blob produced by [`encrypt_blob`](Self::encrypt_blob).
    ///
    /// `CorruptBlob` if it cannot even hold a nonce and tag, `DecryptionFailed`
    /// on a wrong key or tampered bytes.
    pub fn decrypt_blob(&self, sealed: &[u8]) -> Result<Vec<u8>, VaultError> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(VaultError::CorruptBlob(sealed.len()));
        }
        let (nonce_bytes, ct) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        self.cipher
            .decrypt(nonce, ct)
            .map_err(|e| VaultError::DecryptionFailed(e.to_string()))
    }
}
