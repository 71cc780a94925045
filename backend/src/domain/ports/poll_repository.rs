//! Port abstraction for poll persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::poll::{Poll, PollDraft, PollId, PollOptionId};
use crate::domain::user::UserId;

/// Persistence errors raised by poll repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollPersistenceError {
    /// Repository connection could not be established.
    #[error("poll repository connection failed: {message}")]
    Connection {
        /// Underlying failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("poll repository query failed: {message}")]
    Query {
        /// Underlying failure description.
        message: String,
    },
}

impl PollPersistenceError {
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

/// Result of an atomic vote insert.
///
/// The `(user_id, poll_id)` UNIQUE constraint decides the outcome inside the
/// database, so two racing submissions from the same user resolve to exactly
/// one `Applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote row was inserted and the option counter incremented.
    Applied,
    /// A vote for this (user, poll) pair already existed; nothing changed.
    Duplicate,
}

/// Port for poll aggregate persistence.
#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Insert a poll with its options in one transaction.
    async fn create(&self, author: UserId, draft: &PollDraft) -> Result<Poll, PollPersistenceError>;

    /// Fetch a poll aggregate by id.
    async fn find(&self, id: PollId) -> Result<Option<Poll>, PollPersistenceError>;

    /// Fetch the poll aggregate owning the given option.
    async fn find_by_option(
        &self,
        option: PollOptionId,
    ) -> Result<Option<Poll>, PollPersistenceError>;

    /// List polls whose expiry is after `now`, newest first.
    async fn list_open(&self, now: DateTime<Utc>) -> Result<Vec<Poll>, PollPersistenceError>;

    /// List up to `limit` open polls ordered by soonest expiry.
    async fn list_open_soonest(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Poll>, PollPersistenceError>;

    /// Replace a poll's title, expiry, and entire option set in one
    /// transaction. Votes on the old options are removed by cascade, so
    /// counts restart at zero.
    async fn replace(
        &self,
        id: PollId,
        title: &str,
        expired_at: DateTime<Utc>,
        options: &[String],
    ) -> Result<Poll, PollPersistenceError>;

    /// Delete a poll; options and votes cascade. Returns false when absent.
    async fn delete(&self, id: PollId) -> Result<bool, PollPersistenceError>;

    /// Atomically insert a vote and bump the option counter.
    async fn insert_vote(
        &self,
        user: UserId,
        poll: PollId,
        option: PollOptionId,
    ) -> Result<VoteOutcome, PollPersistenceError>;

    /// Whether the user already voted on the poll.
    async fn has_voted(&self, user: UserId, poll: PollId) -> Result<bool, PollPersistenceError>;
}
