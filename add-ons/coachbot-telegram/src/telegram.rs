//! Minimal Telegram Bot API client: `getUpdates` long polling and `sendMessage`.

use crate::error::{TelegramError, TelegramResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Telegram rejects longer messages.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Extra time granted over the long-poll wait before the request is abandoned.
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

impl Update {
    /// `(chat_id, uid, text)` for text messages from a user; other updates are ignored.
    pub fn text_message(&self) -> Option<(i64, String, &str)> {
        let message = self.message.as_ref()?;
        let from = message.from.as_ref()?;
        let text = message.text.as_deref()?;
        Some((message.chat.id, from.id.to_string(), text))
    }
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

pub struct TelegramClient {
    client: reqwest::Client,
    /// `{api_base}/bot{token}`; never logged.
    endpoint: String,
    timeout: Duration,
}

impl TelegramClient {
    pub fn new(token: &str, api_base: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/bot{}", api_base.trim_end_matches('/'), token.trim()),
            timeout,
        }
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
        timeout: Duration,
    ) -> TelegramResult<T> {
        let res: ApiResponse<T> = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .timeout(timeout)
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if !res.ok {
            return Err(TelegramError::Api {
                code: res.error_code.unwrap_or_default(),
                description: res.description.unwrap_or_default(),
            });
        }
        res.result.ok_or(TelegramError::MissingResult)
    }

    /// Waits up to `poll_timeout` for updates with id `>= offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> TelegramResult<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: poll_timeout.as_secs(),
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &body, poll_timeout + POLL_GRACE).await
    }

    /// Sends `text`, split into several messages when it exceeds [`MAX_MESSAGE_CHARS`].
    pub async fn send_message(&self, chat_id: i64, text: &str) -> TelegramResult<()> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            let body = SendMessage {
                chat_id,
                text: &chunk,
            };
            let _sent: serde_json::Value = self.call("sendMessage", &body, self.timeout).await?;
        }
        Ok(())
    }
}

/// Splits on line boundaries where possible, never exceeding `max_chars` per piece.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > max_chars && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > max_chars {
            let chars: Vec<char> = line.chars().collect();
            for part in chars.chunks(max_chars) {
                pieces.push(part.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
