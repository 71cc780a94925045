//! Port abstraction for news article and GPT summary persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::news::{GptSummary, News, NewsId};

/// Persistence errors raised by news repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewsPersistenceError {
    /// Repository connection could not be established.
    #[error("news repository connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("news repository query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
}

impl NewsPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for news article reads and summary storage.
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Fetch an article by id.
    async fn find(&self, id: NewsId) -> Result<Option<News>, NewsPersistenceError>;

    /// Up to `limit` admin-authored articles published at or after `since`,
    /// newest first.
    async fn recent_admin_news(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<News>, NewsPersistenceError>;

    /// Fetch the stored GPT summary for an article, if any.
    async fn find_summary(&self, news: NewsId)
        -> Result<Option<GptSummary>, NewsPersistenceError>;

    /// Insert or replace the stored GPT summary for an article.
    async fn store_summary(&self, summary: &GptSummary) -> Result<(), NewsPersistenceError>;
}
