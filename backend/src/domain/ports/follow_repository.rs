//! Port abstraction for follow-relationship persistence.

use async_trait::async_trait;

use crate::domain::user::UserId;

/// Persistence errors raised by follow repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FollowPersistenceError {
    /// Repository connection could not be established.
    #[error("follow repository connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("follow repository query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
}

impl FollowPersistenceError {
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

/// Result of a follow insert; the `(follower_id, following_id)` UNIQUE
/// constraint decides duplicates inside the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// The relationship was stored.
    Applied,
    /// The relationship already existed; nothing changed.
    Duplicate,
}

/// Port for one-directional follow relationships.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Record that `follower` follows `following`.
    async fn insert(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<FollowOutcome, FollowPersistenceError>;

    /// Remove the relationship. Returns false when it did not exist.
    async fn delete(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, FollowPersistenceError>;

    /// Whether `follower` currently follows `following`.
    async fn exists(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, FollowPersistenceError>;
}
