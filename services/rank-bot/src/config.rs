//! Service configuration loaded from YAML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rank_common::RankConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Root of the bot's data directory.
    pub data_dir: PathBuf,

    /// TrueType font used for image replies.
    pub font_path: Option<PathBuf>,

    /// Per-avatar download timeout in milliseconds.
    pub avatar_timeout_ms: u64,

    /// Where image replies are written.
    pub output_dir: PathBuf,

    /// Leaderboard options.
    pub rank: RankConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            font_path: None,
            avatar_timeout_ms: 5000,
            output_dir: PathBuf::from("output"),
            rank: RankConfig::default(),
        }
    }
}

impl BotConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse bot config YAML")?;
        config.rank.validate()?;
        Ok(config)
    }

    /// Load from `path`, or use defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bot config from {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid bot config in {:?}", path))
    }

    /// Directory holding `icons/` and `barBgImgs/`.
    pub fn asset_root(&self) -> PathBuf {
        self.data_dir.join("messageCounter")
    }

    pub fn avatar_timeout(&self) -> Duration {
        Duration::from_millis(self.avatar_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rank_common::RankStyle;

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_yaml("{}").unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.avatar_timeout(), Duration::from_secs(5));
        assert_eq!(config.asset_root(), PathBuf::from("data/messageCounter"));
    }

    #[test]
    fn test_nested_rank_options() {
        let config = BotConfig::from_yaml(
            "data_dir: /srv/bot\nrank:\n  style: list\n  display_as_image: true\n",
        )
        .unwrap();
        assert_eq!(config.rank.style, RankStyle::List);
        assert!(config.rank.display_as_image);
        assert_eq!(config.asset_root(), PathBuf::from("/srv/bot/messageCounter"));
    }

    #[test]
    fn test_invalid_rank_options_rejected() {
        assert!(BotConfig::from_yaml("rank:\n  bar_background_opacity: 2.0\n").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = BotConfig::load_or_default(Path::new("/nonexistent/rank-bot.yaml")).unwrap();
        assert_eq!(config, BotConfig::default());
    }
}
