//! Monetary leaderboard command layer.
//!
//! Wires the stores, the ranking pipeline and the renderer into the
//! commands a chat bot exposes: channel and global rankings, balance
//! queries and identity tracking.

pub mod commands;
pub mod config;
pub mod sender;

pub use commands::{RankService, Session, LOOKUP_FAILED_REPLY, RENDER_FAILED_REPLY};
pub use config::BotConfig;
pub use sender::{ConsoleSender, MessageSender, Outgoing};
