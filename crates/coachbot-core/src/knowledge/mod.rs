//! Encrypted persistence: the key file, the AES-GCM vault and the per-user store.

mod secret_key;
mod user_store;
mod vault;

pub use secret_key::{SecretKey, KEY_LEN};
pub use user_store::{LoadOutcome, UserStore};
pub use vault::{SecretVault, NONCE_LEN, TAG_LEN};
