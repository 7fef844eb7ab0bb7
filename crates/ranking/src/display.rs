//! Display-size handling, channel scoping and text output.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use rank_common::RankEntry;

/// Title of the per-channel leaderboard.
pub const CHANNEL_RANK_TITLE: &str = "本群个人货币排行榜";

/// Title of the cross-channel leaderboard.
pub const GLOBAL_RANK_TITLE: &str = "跨群个人货币排行榜";

const BEIJING_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Which identities a leaderboard covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankScope {
    /// Only owners whose identity was observed in this channel.
    Channel(String),
    /// All owners on the platform.
    Global,
}

impl RankScope {
    pub fn title(&self) -> &'static str {
        match self {
            RankScope::Channel(_) => CHANNEL_RANK_TITLE,
            RankScope::Global => GLOBAL_RANK_TITLE,
        }
    }

    /// Filter a ranking to this scope and keep the first `size` rows.
    pub fn apply(&self, entries: Vec<RankEntry>, size: usize) -> Vec<RankEntry> {
        match self {
            RankScope::Channel(channel_id) => entries
                .into_iter()
                .filter(|e| &e.channel_id == channel_id)
                .take(size)
                .collect(),
            RankScope::Global => entries.into_iter().take(size).collect(),
        }
    }
}

/// Resolve the number of rows to show.
///
/// Anything that is not a positive integer falls back to `default`.
pub fn effective_display_size(requested: Option<f64>, default: usize) -> usize {
    match requested {
        Some(size) if size.is_finite() && size.fract() == 0.0 && size > 0.0 => size as usize,
        Some(size) => {
            tracing::debug!(requested = size, default, "Invalid display size, using default");
            default
        }
        None => default,
    }
}

/// Plain-text leaderboard: a title line followed by numbered rows.
pub fn format_ranking_text(title: &str, entries: &[RankEntry]) -> String {
    let rows: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(index, rank)| {
            format!(
                "{}. {}({}) - {}",
                index + 1,
                rank.display_name,
                rank.external_user_id,
                rank.value
            )
        })
        .collect();

    format!("{}：\n{}", title, rows.join("\n"))
}

/// Current time in Beijing (UTC+8), formatted as `YYYY/M/D HH:MM:SS`.
pub fn beijing_timestamp(now: DateTime<Utc>) -> String {
    let beijing = FixedOffset::east_opt(BEIJING_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    now.with_timezone(&beijing)
        .format("%Y/%-m/%-d %H:%M:%S")
        .to_string()
}
