//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::user::{NewUser, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
    /// The username is already taken by a live account.
    #[error("username is already taken")]
    DuplicateUsername,
    /// The email is already registered to a live account.
    #[error("email is already registered")]
    DuplicateEmail,
}

impl UserPersistenceError {
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

/// Port for user account persistence.
///
/// Soft-deleted rows are invisible through this port: lookups filter on the
/// deletion flag and [`UserRepository::soft_delete`] is the only way out.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record and return it with its assigned id.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a live user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a live user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a live user by username together with the stored password hash.
    async fn find_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, UserPersistenceError>;

    /// Flag a user as deleted; subsequent lookups no longer return the row.
    async fn soft_delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;
}
