//! coachbot-core: shared record types, configuration, and the encrypted per-user store.
//!
//! The store owns the key file and the sealed data file; nothing else in the
//! workspace touches either.

mod config;
mod error;
mod knowledge;
mod shared;

pub use self::config::{
    required_env, CoreConfig, DEFAULT_COHERE_BASE_URL, DEFAULT_COHERE_MODEL, DEFAULT_OURA_BASE_URL,
    DEFAULT_TELEGRAM_API_BASE, ENV_COHERE_API_KEY, ENV_CONFIG_PATH, ENV_OURA_TOKEN,
    ENV_TELEGRAM_TOKEN,
};
pub use error::{ConfigError, SecretKeyError, StoreError, StoreResult, VaultError};
pub use knowledge::{LoadOutcome, SecretKey, SecretVault, UserStore, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use shared::{today_string, Dataset, JournalEntry, UserRecord, JOURNAL_DATE_FORMAT};
