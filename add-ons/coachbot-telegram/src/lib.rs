//! coachbot-telegram: the chat front end.
//!
//! [`Dispatcher`] turns a user's message into a reply through [`BotHandlers`];
//! [`run_polling`] feeds it from the Telegram Bot API.

mod commands;
mod dispatcher;
mod error;
mod handlers;
mod poller;
mod telegram;

pub use commands::Command;
pub use dispatcher::{Dispatcher, Wizard};
pub use error::{TelegramError, TelegramResult};
pub use handlers::{BotHandlers, HELP_TEXT, STORE_FAILURE_REPLY};
pub use poller::{process_update, run_polling};
pub use telegram::{split_message, TelegramClient, Update, MAX_MESSAGE_CHARS};
