//! PostgreSQL-backed `ScrapRepository` implementation using Diesel.
//!
//! Duplicate bookmarks are decided by the `(user_id, news_id)` UNIQUE
//! constraint via `ON CONFLICT DO NOTHING`, mirroring the vote guard.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::news::{News, NewsId};
use crate::domain::ports::{ScrapOutcome, ScrapPersistenceError, ScrapRepository};
use crate::domain::user::UserId;

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::diesel_news_repository::rows_to_news;
use super::models::{AuthorRow, NewScrapRow, NewsRow};
use super::pool::DbPool;
use super::schema::{news, scraps, users};

/// Diesel-backed implementation of the `ScrapRepository` port.
#[derive(Clone)]
pub struct DieselScrapRepository {
    pool: DbPool,
}

impl DieselScrapRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> ScrapPersistenceError {
    match failure {
        DbFailure::Connection(message) => ScrapPersistenceError::connection(message),
        DbFailure::Query(message) => ScrapPersistenceError::query(message),
    }
}

fn map_pool(error: super::pool::PoolError) -> ScrapPersistenceError {
    map_failure(classify_pool_error(error))
}

fn map_diesel(error: diesel::result::Error) -> ScrapPersistenceError {
    map_failure(classify_diesel_error(error))
}

fn map_news_error(error: crate::domain::ports::NewsPersistenceError) -> ScrapPersistenceError {
    use crate::domain::ports::NewsPersistenceError;
    match error {
        NewsPersistenceError::Connection { message } => ScrapPersistenceError::connection(message),
        NewsPersistenceError::Query { message } => ScrapPersistenceError::query(message),
    }
}

#[async_trait]
impl ScrapRepository for DieselScrapRepository {
    async fn insert(
        &self,
        user: UserId,
        news_id: NewsId,
    ) -> Result<ScrapOutcome, ScrapPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let inserted = diesel::insert_into(scraps::table)
            .values(&NewScrapRow {
                user_id: user.get(),
                news_id: news_id.get(),
            })
            .on_conflict((scraps::user_id, scraps::news_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(if inserted == 0 {
            ScrapOutcome::Duplicate
        } else {
            ScrapOutcome::Applied
        })
    }

    async fn delete(&self, user: UserId, news_id: NewsId) -> Result<bool, ScrapPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let removed = diesel::delete(
            scraps::table
                .filter(scraps::user_id.eq(user.get()))
                .filter(scraps::news_id.eq(news_id.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;
        Ok(removed > 0)
    }

    async fn list_news_for_user(&self, user: UserId) -> Result<Vec<News>, ScrapPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(NewsRow, AuthorRow)> = scraps::table
            .inner_join(news::table.inner_join(users::table))
            .filter(scraps::user_id.eq(user.get()))
            .order(scraps::created_at.desc())
            .select((NewsRow::as_select(), AuthorRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter()
            .map(|(article, author)| rows_to_news(article, author).map_err(map_news_error))
            .collect()
    }
}
