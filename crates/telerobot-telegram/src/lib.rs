//! Session-client boundary for the Telegram Bot API transport.

mod bot_api;
mod retry;
mod types;

pub use bot_api::{TelegramClientConfig, TelegramSessionClient};
pub use types::{
    RawUpdate, SelfInfo, SessionClient, SessionError, WireChat, WireMessage, WireUser,
};
