//! Port abstraction for bearer-token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::user::UserId;

/// Persistence errors raised by token repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenPersistenceError {
    /// Repository connection could not be established.
    #[error("token repository connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("token repository query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
}

impl TokenPersistenceError {
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

/// Port for bearer-token storage. Only token digests are persisted.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a token digest for a user with its expiry.
    async fn insert(
        &self,
        digest: &str,
        user: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), TokenPersistenceError>;

    /// Resolve a digest to its user when the token is still valid at `now`.
    async fn find_user(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, TokenPersistenceError>;

    /// Remove tokens that expired before `now`; returns the rows removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenPersistenceError>;
}
