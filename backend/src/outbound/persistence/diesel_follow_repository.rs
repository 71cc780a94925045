//! PostgreSQL-backed `FollowRepository` implementation using Diesel.
//!
//! Duplicate relationships are decided by the `(follower_id, following_id)`
//! UNIQUE constraint via `ON CONFLICT DO NOTHING`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{FollowOutcome, FollowPersistenceError, FollowRepository};
use crate::domain::user::UserId;

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::NewFollowRow;
use super::pool::DbPool;
use super::schema::follows;

/// Diesel-backed implementation of the `FollowRepository` port.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> FollowPersistenceError {
    match failure {
        DbFailure::Connection(message) => FollowPersistenceError::connection(message),
        DbFailure::Query(message) => FollowPersistenceError::query(message),
    }
}

fn map_pool(error: super::pool::PoolError) -> FollowPersistenceError {
    map_failure(classify_pool_error(error))
}

fn map_diesel(error: diesel::result::Error) -> FollowPersistenceError {
    map_failure(classify_diesel_error(error))
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn insert(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<FollowOutcome, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let inserted = diesel::insert_into(follows::table)
            .values(&NewFollowRow {
                follower_id: follower.get(),
                following_id: following.get(),
            })
            .on_conflict((follows::follower_id, follows::following_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(if inserted == 0 {
            FollowOutcome::Duplicate
        } else {
            FollowOutcome::Applied
        })
    }

    async fn delete(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let removed = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(follower.get()))
                .filter(follows::following_id.eq(following.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;
        Ok(removed > 0)
    }

    async fn exists(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::select(diesel::dsl::exists(
            follows::table
                .filter(follows::follower_id.eq(follower.get()))
                .filter(follows::following_id.eq(following.get())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel)
    }
}
