use coachbot_core::ConfigError;
use thiserror::Error;

/// Construction failures of the remote clients. Fatal at startup.
#[derive(Error, Debug)]
pub enum ClientInitError {
    #[error("missing required environment variable {0}")]
    MissingCredential(&'static str),

    #[error(transparent)]
    Config(ConfigError),
}

impl From<ConfigError> for ClientInitError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::MissingCredential(name) => Self::MissingCredential(name),
            other => Self::Config(other),
        }
    }
}

/// Why a chat call produced no recommendation. Only ever logged.
#[derive(Error, Debug)]
pub(crate) enum CoachCallError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response carried no text content")]
    EmptyContent,
}
