//! Glamour promo server.
//!
//! Issues at most one promo code per anonymous player and reports game
//! results through a linked messaging bot.
//!
//! # Architecture
//!
//! - [`PromoCoordinator`] serializes wins and losses per player and claims
//!   codes through a [`PlayerStore`].
//! - [`PlayerStore`] has an in-memory and a SQLite (diesel) backend.
//! - [`Notifier`] delivers messages on a background task. Telegram delivery
//!   needs a bot token; without one, messages are logged.
//! - [`LinkPoller`] turns `/start connect_<id>` bot messages into links.
//! - [`router`] exposes the REST API the game client talks to.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bot;
pub mod cli;
mod config;
mod coordinator;
mod error;
pub mod http;
mod locks;
pub mod messages;
mod notify;
mod server;
pub mod store;
mod telegram;
mod types;

pub use bot::{CONNECT_PREFIX, LinkError, LinkPoller, deep_link, parse_start_command};
pub use config::{ConfigError, ServerConfig, StorageBackend, TOKEN_ENV};
pub use coordinator::{PromoCoordinator, WinReceipt};
pub use error::ServerError;
pub use http::{AppState, router};
pub use locks::KeyedLocks;
pub use notify::{LogNotifier, Notifier, NotifyError, TelegramNotifier};
pub use server::{PromoServer, open_store};
pub use store::{
    MemoryPlayerStore, PlayerRecord, PlayerRepository, PlayerStore, PromoClaim,
    SqlitePlayerStore, StoreError,
};
pub use telegram::{Chat, ChatId, DEFAULT_API_BASE, Message, TelegramApi, Update};
pub use types::{ChannelId, PlayerId, PromoCode};
