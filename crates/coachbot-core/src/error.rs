//! Error types for the coachbot core.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures of the secret key file. Always fatal at startup: regenerating a key
/// over an existing file would make the data file unreadable forever.
#[derive(Error, Debug)]
pub enum SecretKeyError {
    #[error("cannot read key file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write key file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("key file {path} holds {actual} bytes, expected {expected}")]
    InvalidLength {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
}

/// AES-256-GCM sealing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key or tampered ciphertext.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Blob shorter than nonce + tag.
    #[error("corrupt blob ({0} bytes)")]
    CorruptBlob(usize),
}

/// Encrypted user store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    SecretKey(#[from] SecretKeyError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("serialize dataset: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration and credential errors (fatal at startup).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingCredential(&'static str),

    #[error("invalid configuration: {0}")]
    Load(#[from] config::ConfigError),
}
