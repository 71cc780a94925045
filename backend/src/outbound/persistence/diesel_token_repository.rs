//! PostgreSQL-backed `TokenRepository` implementation using Diesel.
//!
//! Lookups join the users table so tokens belonging to soft-deleted accounts
//! stop authenticating immediately.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TokenPersistenceError, TokenRepository};
use crate::domain::user::UserId;

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::NewTokenRow;
use super::pool::DbPool;
use super::schema::{auth_tokens, users};

/// Diesel-backed implementation of the `TokenRepository` port.
#[derive(Clone)]
pub struct DieselTokenRepository {
    pool: DbPool,
}

impl DieselTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> TokenPersistenceError {
    match failure {
        DbFailure::Connection(message) => TokenPersistenceError::connection(message),
        DbFailure::Query(message) => TokenPersistenceError::query(message),
    }
}

#[async_trait]
impl TokenRepository for DieselTokenRepository {
    async fn insert(
        &self,
        digest: &str,
        user: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), TokenPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;

        let row = NewTokenRow {
            token_digest: digest,
            user_id: user.get(),
            expires_at,
        };
        diesel::insert_into(auth_tokens::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(classify_diesel_error(err)))?;
        Ok(())
    }

    async fn find_user(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, TokenPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;

        let raw: Option<i64> = auth_tokens::table
            .inner_join(users::table)
            .filter(auth_tokens::token_digest.eq(digest))
            .filter(auth_tokens::expires_at.gt(now))
            .filter(users::is_deleted.eq(false))
            .select(auth_tokens::user_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(classify_diesel_error(err)))?;

        raw.map(|id| UserId::new(id).map_err(|_| TokenPersistenceError::query("corrupt user id")))
            .transpose()
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;

        let removed = diesel::delete(auth_tokens::table.filter(auth_tokens::expires_at.le(now)))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(classify_diesel_error(err)))?;
        Ok(removed as u64)
    }
}
