//! Symmetric key file for the user store.
//!
//! The key is 32 raw bytes in its own file, generated on first start and never
//! rotated. An existing file is returned exactly as read; anything wrong with it
//! is fatal, since a regenerated key would orphan every byte already encrypted.

use crate::error::SecretKeyError;
use aes_gcm::{
    aead::{KeyInit, OsRng},
    Aes256Gcm,
};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// The store's symmetric key. `Debug` never prints key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; KEY_LEN]);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl From<[u8; KEY_LEN]> for SecretKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl SecretKey {
    /// Fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let key = Aes256Gcm::generate_key(OsRng);
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(key.as_slice());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Reads the key at `key_path`, or generates one and writes it there when no file exists.
    pub fn load_or_create(key_path: &Path) -> Result<Self, SecretKeyError> {
        match fs::read(key_path) {
            Ok(bytes) => Self::from_file_bytes(key_path, &bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let key = Self::generate();
                key.write_new(key_path)?;
                tracing::info!(
                    target: "coachbot::store",
                    path = %key_path.display(),
                    "generated new store key"
                );
                Ok(key)
            }
            Err(source) => Err(SecretKeyError::Read {
                path: key_path.to_path_buf(),
                source,
            }),
        }
    }

    fn from_file_bytes(key_path: &Path, bytes: &[u8]) -> Result<Self, SecretKeyError> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| SecretKeyError::InvalidLength {
            path: key_path.to_path_buf(),
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Writes the key to a path that must not exist yet (owner-only on unix).
    fn write_new(&self, key_path: &Path) -> Result<(), SecretKeyError> {
        let write_err = |source| SecretKeyError::Write {
            path: key_path.to_path_buf(),
            source,
        };
        if let Some(parent) = key_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(key_path).map_err(write_err)?;
        file.write_all(&self.0).map_err(write_err)?;
        file.sync_all().map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_then_reloads_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.key");

        let created = SecretKey::load_or_create(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), created.as_bytes().to_vec());

        let loaded = SecretKey::load_or_create(&path).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/keys/secret.key");
        SecretKey::load_or_create(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn wrong_length_is_fatal_and_not_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.key");
        std::fs::write(&path, b"too short").unwrap();

        let err = SecretKey::load_or_create(&path).unwrap_err();
        assert!(matches!(
            err,
            SecretKeyError::InvalidLength { expected: KEY_LEN, actual: 9, .. }
        ));
        // File left untouched.
        assert_eq!(std::fs::read(&path).unwrap(), b"too short");
    }

    #[test]
    fn unreadable_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the key file should be cannot be read as a file.
        let err = SecretKey::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, SecretKeyError::Read { .. }));
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(SecretKey::generate(), SecretKey::generate());
    }

    #[test]
    fn debug_is_redacted() {
        let key = SecretKey::from([7u8; KEY_LEN]);
        assert_eq!(format!("{:?}", key), "SecretKey(<redacted>)");
    }
}
