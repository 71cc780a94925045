//! Follow use-cases: one-directional subscriptions between users.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::ports::{
    FollowOutcome, FollowPersistenceError, FollowRepository, UserRepository,
};
use crate::domain::user::UserId;
use crate::domain::user_service::map_user_persistence_error;

fn map_follow_error(error: FollowPersistenceError) -> Error {
    match error {
        FollowPersistenceError::Connection { message } => Error::service_unavailable(message),
        FollowPersistenceError::Query { message } => Error::internal(message),
    }
}

/// Orchestrates follow relationships over the follow and user ports.
#[derive(Clone)]
pub struct FollowService {
    follows: Arc<dyn FollowRepository>,
    users: Arc<dyn UserRepository>,
}

impl FollowService {
    /// Create a service over the given ports.
    pub fn new(follows: Arc<dyn FollowRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { follows, users }
    }

    /// Record that `follower` follows `following`.
    pub async fn follow(&self, follower: UserId, following: UserId) -> Result<(), Error> {
        if follower == following {
            return Err(Error::invalid_request("cannot follow yourself"));
        }
        self.users
            .find_by_id(following)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        match self
            .follows
            .insert(follower, following)
            .await
            .map_err(map_follow_error)?
        {
            FollowOutcome::Applied => Ok(()),
            FollowOutcome::Duplicate => Err(Error::conflict("already following this user")),
        }
    }

    /// Remove a follow relationship.
    pub async fn unfollow(&self, follower: UserId, following: UserId) -> Result<(), Error> {
        let removed = self
            .follows
            .delete(follower, following)
            .await
            .map_err(map_follow_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("follow not found"))
        }
    }

    /// Whether `follower` currently follows `following`.
    pub async fn exists_follow(&self, follower: UserId, following: UserId) -> Result<bool, Error> {
        self.follows
            .exists(follower, following)
            .await
            .map_err(map_follow_error)
    }
}
