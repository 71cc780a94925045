//! Driving port for GPT summary generation.

use async_trait::async_trait;

/// Errors raised by summary source adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummarySourceError {
    /// The summary endpoint could not be reached or returned a server error.
    #[error("summary source unreachable: {message}")]
    Unreachable {
        /// Underlying failure description.
        message: String,
    },
    /// The summary endpoint responded with a payload we could not interpret.
    #[error("summary source returned a malformed payload: {message}")]
    Malformed {
        /// Underlying failure description.
        message: String,
    },
}

impl SummarySourceError {
    /// Create an unreachable error with the given message.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Create a malformed-payload error with the given message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Port for producing a short summary of one article.
#[async_trait]
pub trait SummarySource: Send + Sync {
    /// Summarise an article body under its headline.
    async fn summarize(&self, title: &str, content: &str) -> Result<String, SummarySourceError>;
}
