//! Outgoing messages.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use rank_common::RankResult;
use tracing::info;

/// A reply to the invoking user.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Text(String),
    /// PNG bytes.
    Image(Vec<u8>),
}

/// Delivers replies to a chat target (channel or user).
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, target: &str, message: Outgoing) -> RankResult<()>;
}

/// Prints text to stdout and writes images into a directory.
pub struct ConsoleSender {
    output_dir: PathBuf,
}

impl ConsoleSender {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl MessageSender for ConsoleSender {
    async fn send(&self, target: &str, message: Outgoing) -> RankResult<()> {
        match message {
            Outgoing::Text(text) => {
                println!("{}", text);
            }
            Outgoing::Image(png) => {
                tokio::fs::create_dir_all(&self.output_dir).await?;
                let file_name = format!(
                    "{}-{}.png",
                    sanitize(target),
                    Utc::now().format("%Y%m%d%H%M%S%3f")
                );
                let path = self.output_dir.join(file_name);
                tokio::fs::write(&path, &png).await?;
                info!(path = %path.display(), bytes = png.len(), "Image reply written");
                println!("{}", path.display());
            }
        }
        Ok(())
    }
}

fn sanitize(target: &str) -> String {
    target
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
