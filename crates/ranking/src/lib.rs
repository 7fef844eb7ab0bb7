//! Ranking computation for the monetary leaderboard.
//!
//! Joins ledger balances with identity and binding records into a sorted
//! ranking, prepares chart rows, and formats the text replies.

pub mod balance;
pub mod builder;
pub mod display;
pub mod render_data;

pub use builder::build_ranking;
pub use display::{effective_display_size, format_ranking_text, RankScope};
pub use render_data::to_render_data;
