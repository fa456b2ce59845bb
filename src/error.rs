//! Error types for the geo-prompt pipeline

use thiserror::Error;

/// Failure of the structured-data generator.
///
/// Classification never fails; every error here comes from configuration,
/// the upstream model call, or the model's output.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Upstream model call failed: {message}")]
    UpstreamCall { message: String },

    #[error("Malformed model response: {message}")]
    MalformedResponse { message: String, content: String },
}

impl GenerationError {
    pub fn malformed(message: impl Into<String>, content: impl Into<String>) -> Self {
        GenerationError::MalformedResponse {
            message: message.into(),
            content: content.into(),
        }
    }

    /// Cleaned response text retained for diagnostics, if any
    pub fn content(&self) -> Option<&str> {
        match self {
            GenerationError::MalformedResponse { content, .. } => Some(content),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::UpstreamCall {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, GenerationError>;
