//! Poll use-cases: CRUD, vote casting, and response assembly.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::error::Error;
use crate::domain::poll::{
    Poll, PollDraft, PollId, PollOptionId, PollResponse, PollSummaryResponse, PollUpdate,
};
use crate::domain::ports::{
    FollowPersistenceError, FollowRepository, PollPersistenceError, PollRepository, UserRepository,
    VoteOutcome,
};
use crate::domain::user::UserId;
use crate::domain::user_service::map_user_persistence_error;

/// Number of rows returned by the recent-polls listing.
const RECENT_LIMIT: i64 = 10;

/// Orchestrates poll reads and writes over the poll, user, and follow ports.
#[derive(Clone)]
pub struct PollService {
    polls: Arc<dyn PollRepository>,
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

fn map_poll_error(error: PollPersistenceError) -> Error {
    match error {
        PollPersistenceError::Connection { message } => Error::service_unavailable(message),
        PollPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_follow_error(error: FollowPersistenceError) -> Error {
    match error {
        FollowPersistenceError::Connection { message } => Error::service_unavailable(message),
        FollowPersistenceError::Query { message } => Error::internal(message),
    }
}

impl PollService {
    /// Create a service over the given ports.
    pub fn new(
        polls: Arc<dyn PollRepository>,
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
    ) -> Self {
        Self {
            polls,
            users,
            follows,
        }
    }

    async fn require_poll(&self, id: PollId) -> Result<Poll, Error> {
        self.polls
            .find(id)
            .await
            .map_err(map_poll_error)?
            .ok_or_else(|| Error::not_found("poll not found"))
    }

    async fn require_user(&self, id: UserId) -> Result<(), Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(())
    }

    /// Assemble the flattened response for one poll.
    ///
    /// `is_vote` and `followed` stay false for anonymous viewers.
    async fn to_response(&self, poll: &Poll, viewer: Option<UserId>) -> Result<PollResponse, Error> {
        let (voted, followed) = match viewer {
            Some(user) => {
                let voted = self
                    .polls
                    .has_voted(user, poll.id)
                    .await
                    .map_err(map_poll_error)?;
                let followed = self
                    .follows
                    .exists(user, poll.author.id)
                    .await
                    .map_err(map_follow_error)?;
                (voted, followed)
            }
            None => (false, false),
        };
        Ok(PollResponse::project(poll, voted, followed, Utc::now()))
    }

    /// All polls that are still open, newest first.
    pub async fn list_open(&self) -> Result<Vec<PollSummaryResponse>, Error> {
        let now = Utc::now();
        let polls = self.polls.list_open(now).await.map_err(map_poll_error)?;
        Ok(polls
            .iter()
            .map(|poll| PollSummaryResponse::project(poll, now))
            .collect())
    }

    /// The ten open polls closest to expiry.
    pub async fn recent_open(&self) -> Result<Vec<PollSummaryResponse>, Error> {
        let now = Utc::now();
        let polls = self
            .polls
            .list_open_soonest(now, RECENT_LIMIT)
            .await
            .map_err(map_poll_error)?;
        Ok(polls
            .iter()
            .map(|poll| PollSummaryResponse::project(poll, now))
            .collect())
    }

    /// Fetch one poll with viewer-derived flags.
    pub async fn get_poll(
        &self,
        id: PollId,
        viewer: Option<UserId>,
    ) -> Result<PollResponse, Error> {
        let poll = self.require_poll(id).await?;
        self.to_response(&poll, viewer).await
    }

    /// Create a poll owned by `author`.
    pub async fn create_poll(
        &self,
        draft: PollDraft,
        author: UserId,
    ) -> Result<PollResponse, Error> {
        self.require_user(author).await?;
        let poll = self
            .polls
            .create(author, &draft)
            .await
            .map_err(map_poll_error)?;
        self.to_response(&poll, Some(author)).await
    }

    /// Update a poll's title, expiry, and option set.
    ///
    /// Only the creator may update. An omitted expiry keeps the previous
    /// value. The old options are replaced wholesale; their votes vanish with
    /// them, so counts restart at zero.
    pub async fn update_poll(
        &self,
        id: PollId,
        update: PollUpdate,
        acting: UserId,
    ) -> Result<PollResponse, Error> {
        let poll = self.require_poll(id).await?;
        if poll.author.id != acting {
            return Err(Error::forbidden("only the poll creator may update it"));
        }

        let expired_at = update.expired_at.unwrap_or(poll.expired_at);
        let updated = self
            .polls
            .replace(id, &update.title, expired_at, &update.options)
            .await
            .map_err(map_poll_error)?;
        self.to_response(&updated, Some(acting)).await
    }

    /// Delete a poll together with its options and votes.
    pub async fn delete_poll(&self, id: PollId, acting: UserId) -> Result<(), Error> {
        let poll = self.require_poll(id).await?;
        if poll.author.id != acting {
            return Err(Error::forbidden("only the poll creator may delete it"));
        }
        self.polls.delete(id).await.map_err(map_poll_error)?;
        Ok(())
    }

    /// Cast a vote for `option` on behalf of `acting`.
    ///
    /// The duplicate guard is the storage-level UNIQUE constraint on
    /// `(user_id, poll_id)`, surfaced here as [`VoteOutcome::Duplicate`].
    pub async fn vote(&self, option: PollOptionId, acting: UserId) -> Result<(), Error> {
        self.require_user(acting).await?;
        let poll = self
            .polls
            .find_by_option(option)
            .await
            .map_err(map_poll_error)?
            .ok_or_else(|| Error::not_found("poll option not found"))?;

        if !poll.is_open(Utc::now()) {
            return Err(Error::invalid_request("poll is closed"));
        }

        match self
            .polls
            .insert_vote(acting, poll.id, option)
            .await
            .map_err(map_poll_error)?
        {
            VoteOutcome::Applied => Ok(()),
            VoteOutcome::Duplicate => Err(Error::duplicate_vote("already voted on this poll")),
        }
    }
}
