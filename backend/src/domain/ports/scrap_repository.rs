//! Port abstraction for scrap (bookmark) persistence.

use async_trait::async_trait;

use crate::domain::news::{News, NewsId};
use crate::domain::user::UserId;

/// Persistence errors raised by scrap repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapPersistenceError {
    /// Repository connection could not be established.
    #[error("scrap repository connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("scrap repository query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
}

impl ScrapPersistenceError {
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

/// Result of a scrap insert; the `(user_id, news_id)` UNIQUE constraint
/// decides duplicates inside the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapOutcome {
    /// The bookmark was stored.
    Applied,
    /// The user had already scrapped this article; nothing changed.
    Duplicate,
}

/// Port for scrap persistence.
#[async_trait]
pub trait ScrapRepository: Send + Sync {
    /// Bookmark an article for a user.
    async fn insert(&self, user: UserId, news: NewsId)
        -> Result<ScrapOutcome, ScrapPersistenceError>;

    /// Remove a bookmark. Returns false when it did not exist.
    async fn delete(&self, user: UserId, news: NewsId) -> Result<bool, ScrapPersistenceError>;

    /// Articles the user has scrapped, most recently scrapped first.
    async fn list_news_for_user(&self, user: UserId) -> Result<Vec<News>, ScrapPersistenceError>;
}
