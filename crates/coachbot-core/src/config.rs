//! Runtime configuration and credentials.
//!
//! Non-secret settings come from [`CoreConfig::load`]; the three API secrets are read
//! from the process environment only (a `.env` file is honoured by the binary).
//!
//! | Env | Used by |
//! |-----|---------|
//! | TELEGRAM_TOKEN | chat transport (bot startup) |
//! | OURA_TOKEN | wearable client |
//! | COHERE_API_KEY | recommendation client |

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_OURA_TOKEN: &str = "OURA_TOKEN";
pub const ENV_COHERE_API_KEY: &str = "COHERE_API_KEY";

/// Env var naming an alternate config file (without extension is fine).
pub const ENV_CONFIG_PATH: &str = "COACHBOT_CONFIG";

pub const DEFAULT_OURA_BASE_URL: &str = "https://api.ouraring.com/v2/usercollection";
pub const DEFAULT_COHERE_BASE_URL: &str = "https://api.cohere.com";
pub const DEFAULT_COHERE_MODEL: &str = "command-r-plus-08-2024";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Application settings. Precedence: `COACHBOT__*` env > config file > defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Encrypted dataset file.
    pub data_path: PathBuf,
    /// Raw 32-byte key file.
    pub key_path: PathBuf,
    pub oura_base_url: String,
    pub cohere_base_url: String,
    pub cohere_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound for each remote HTTP call.
    pub http_timeout_secs: u64,
    /// Days of sleep history shown by `/oura_ring_4j`.
    pub oura_history_days: u32,
    /// Bot API root; the token is appended as `/bot{token}`.
    pub telegram_api_base: String,
    /// Telegram long-poll wait.
    pub poll_timeout_secs: u64,
}

impl CoreConfig {
    /// Load config from file and environment.
    /// Precedence: env `COACHBOT_CONFIG` path > `config/coachbot` > defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| "config/coachbot".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as [`load`](Self::load) with an explicit file; a missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .set_default("data_path", "userdata.enc")?
            .set_default("key_path", "secret.key")?
            .set_default("oura_base_url", DEFAULT_OURA_BASE_URL)?
            .set_default("cohere_base_url", DEFAULT_COHERE_BASE_URL)?
            .set_default("cohere_model", DEFAULT_COHERE_MODEL)?
            .set_default("max_tokens", 160_i64)?
            .set_default("temperature", 0.7_f64)?
            .set_default("http_timeout_secs", 30_i64)?
            .set_default("oura_history_days", 4_i64)?
            .set_default("telegram_api_base", DEFAULT_TELEGRAM_API_BASE)?
            .set_default("poll_timeout_secs", 30_i64)?;

        let built = builder
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("COACHBOT").separator("__"))
            .build()?;

        Ok(built.try_deserialize()?)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

/// Trimmed, non-empty value of `name`.
pub fn required_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingCredential(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CoreConfig::load_from(&dir.path().join("absent")).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("userdata.enc"));
        assert_eq!(cfg.key_path, PathBuf::from("secret.key"));
        assert_eq!(cfg.cohere_model, DEFAULT_COHERE_MODEL);
        assert_eq!(cfg.max_tokens, 160);
        assert_eq!(cfg.oura_history_days, 4);
        assert_eq!(cfg.http_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.telegram_api_base, DEFAULT_TELEGRAM_API_BASE);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("coachbot.toml");
        std::fs::write(
            &file,
            "data_path = \"/var/lib/coachbot/userdata.enc\"\noura_history_days = 7\n",
        )
        .unwrap();
        let cfg = CoreConfig::load_from(&file).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("/var/lib/coachbot/userdata.enc"));
        assert_eq!(cfg.oura_history_days, 7);
        assert_eq!(cfg.key_path, PathBuf::from("secret.key"));
    }

    #[test]
    fn missing_credential_is_named() {
        let err = required_env("COACHBOT_TEST_SURELY_UNSET_VAR").unwrap_err();
        assert!(err.to_string().contains("COACHBOT_TEST_SURELY_UNSET_VAR"));
    }
}
