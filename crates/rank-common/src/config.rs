//! Leaderboard configuration.
//!
//! All fields have defaults so an empty YAML/JSON document is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RankError, RankResult};

/// Options recognized by the ranking and rendering pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Number of rows shown when the caller gives no valid size.
    pub default_display_count: usize,

    /// Render the leaderboard as an image instead of text.
    pub display_as_image: bool,

    /// Image style used when `display_as_image` is set.
    pub style: RankStyle,

    /// When the page renderer considers a document ready for capture.
    pub render_readiness: RenderReadiness,

    /// Opacity of the custom bar background stretched over the whole track.
    /// Zero disables the full-track layer.
    pub bar_full_background_opacity: f32,

    /// Opacity of the custom bar background drawn over the bar itself.
    pub bar_background_opacity: f32,

    /// Pack user icons against the bar end instead of after the name.
    pub move_icon_to_bar_end: bool,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            default_display_count: 10,
            display_as_image: false,
            style: RankStyle::Bars,
            render_readiness: RenderReadiness::NetworkIdle0,
            bar_full_background_opacity: 0.0,
            bar_background_opacity: 0.6,
            move_icon_to_bar_end: true,
        }
    }
}

impl RankConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> RankResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> RankResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check value ranges.
    pub fn validate(&self) -> RankResult<()> {
        if self.default_display_count < 1 {
            return Err(invalid("default_display_count", "must be at least 1"));
        }
        check_opacity("bar_full_background_opacity", self.bar_full_background_opacity)?;
        check_opacity("bar_background_opacity", self.bar_background_opacity)?;
        Ok(())
    }
}

fn check_opacity(field: &str, value: f32) -> RankResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(field, &format!("{} is outside [0, 1]", value)));
    }
    Ok(())
}

fn invalid(field: &str, message: &str) -> RankError {
    RankError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Leaderboard image style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankStyle {
    /// Horizontal bar chart with avatars.
    #[default]
    Bars,
    /// Medal list card.
    List,
}

/// Readiness condition for headless page capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderReadiness {
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[default]
    #[serde(rename = "networkidle0")]
    NetworkIdle0,
    #[serde(rename = "networkidle2")]
    NetworkIdle2,
}

impl RenderReadiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderReadiness::Load => "load",
            RenderReadiness::DomContentLoaded => "domcontentloaded",
            RenderReadiness::NetworkIdle0 => "networkidle0",
            RenderReadiness::NetworkIdle2 => "networkidle2",
        }
    }
}
