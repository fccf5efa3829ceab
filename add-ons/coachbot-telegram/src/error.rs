use thiserror::Error;

pub type TelegramResult<T> = Result<T, TelegramError>;

/// Bot API call failures. URLs are stripped from transport errors since they embed the token.
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Telegram response carried no result")]
    MissingResult,
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url())
    }
}
