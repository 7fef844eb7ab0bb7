//! Error types for monetary-rank.

use thiserror::Error;

/// Result type alias using RankError.
pub type RankResult<T> = Result<T, RankError>;

/// Primary error type for ranking and rendering operations.
///
/// Missing identity data and invalid display sizes are recovered where they
/// occur and never show up here.
#[derive(Debug, Error)]
pub enum RankError {
    // === Configuration Errors ===
    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    // === Asset Errors ===
    #[error("Failed to decode image: {0}")]
    AssetDecode(String),

    // === Network Errors ===
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Request timeout")]
    Timeout,

    // === Rendering Errors ===
    #[error("Rendering service unavailable: {0}")]
    RenderServiceUnavailable(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    // === Storage Errors ===
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RankError {
    /// Whether the error should abort the current render and fall back to
    /// plain text output.
    pub fn is_render_failure(&self) -> bool {
        matches!(
            self,
            RankError::RenderServiceUnavailable(_) | RankError::Encode(_)
        )
    }

    /// Short machine-readable code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            RankError::InvalidConfig { .. } => "INVALID_CONFIG",
            RankError::AssetDecode(_) => "ASSET_DECODE",
            RankError::RemoteFetch(_) => "REMOTE_FETCH",
            RankError::Timeout => "TIMEOUT",
            RankError::RenderServiceUnavailable(_) => "RENDER_UNAVAILABLE",
            RankError::Encode(_) => "ENCODE",
            RankError::Store(_) => "STORE",
            RankError::Internal(_) => "INTERNAL",
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for RankError {
    fn from(err: std::io::Error) -> Self {
        RankError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for RankError {
    fn from(err: serde_json::Error) -> Self {
        RankError::Internal(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for RankError {
    fn from(err: serde_yaml::Error) -> Self {
        RankError::InvalidConfig {
            field: "<document>".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<image::ImageError> for RankError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => RankError::Encode(e.to_string()),
            other => RankError::AssetDecode(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_failures_are_flagged() {
        assert!(RankError::RenderServiceUnavailable("no font".into()).is_render_failure());
        assert!(RankError::Encode("png".into()).is_render_failure());
        assert!(!RankError::AssetDecode("bad".into()).is_render_failure());
        assert!(!RankError::Timeout.is_render_failure());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(RankError::Timeout.code(), "TIMEOUT");
        assert_eq!(
            RankError::InvalidConfig {
                field: "style".into(),
                message: "x".into()
            }
            .code(),
            "INVALID_CONFIG"
        );
    }
}
