//! PostgreSQL-backed `NewsRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::news::{GptSummary, News, NewsId};
use crate::domain::ports::{NewsPersistenceError, NewsRepository};
use crate::domain::user::{Role, UserId};

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{AuthorRow, GptNewsRow, NewGptNewsRow, NewsRow};
use super::pool::DbPool;
use super::schema::{gpt_news, news, users};

/// Diesel-backed implementation of the `NewsRepository` port.
#[derive(Clone)]
pub struct DieselNewsRepository {
    pool: DbPool,
}

impl DieselNewsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> NewsPersistenceError {
    match failure {
        DbFailure::Connection(message) => NewsPersistenceError::connection(message),
        DbFailure::Query(message) => NewsPersistenceError::query(message),
    }
}

fn map_pool(error: super::pool::PoolError) -> NewsPersistenceError {
    map_failure(classify_pool_error(error))
}

fn map_diesel(error: diesel::result::Error) -> NewsPersistenceError {
    map_failure(classify_diesel_error(error))
}

pub(crate) fn rows_to_news(row: NewsRow, author: AuthorRow) -> Result<News, NewsPersistenceError> {
    let corrupt = || NewsPersistenceError::query("corrupt news row");
    Ok(News {
        id: NewsId::new(row.id).map_err(|_| corrupt())?,
        title: row.title,
        content: row.content,
        image: row.image,
        category: row.category,
        author_id: UserId::new(author.id).map_err(|_| corrupt())?,
        author_nickname: author.nickname,
        created_at: row.created_at,
    })
}

fn row_to_summary(row: GptNewsRow) -> Result<GptSummary, NewsPersistenceError> {
    Ok(GptSummary {
        news_id: NewsId::new(row.news_id)
            .map_err(|_| NewsPersistenceError::query("corrupt summary row"))?,
        title: row.title,
        image: row.image,
        summary: row.summary,
    })
}

#[async_trait]
impl NewsRepository for DieselNewsRepository {
    async fn find(&self, id: NewsId) -> Result<Option<News>, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<(NewsRow, AuthorRow)> = news::table
            .inner_join(users::table)
            .filter(news::id.eq(id.get()))
            .select((NewsRow::as_select(), AuthorRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(|(article, author)| rows_to_news(article, author))
            .transpose()
    }

    async fn recent_admin_news(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<News>, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(NewsRow, AuthorRow)> = news::table
            .inner_join(users::table)
            .filter(users::role.eq(Role::Admin.as_str()))
            .filter(news::created_at.ge(since))
            .order(news::created_at.desc())
            .limit(limit)
            .select((NewsRow::as_select(), AuthorRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        rows.into_iter()
            .map(|(article, author)| rows_to_news(article, author))
            .collect()
    }

    async fn find_summary(
        &self,
        news: NewsId,
    ) -> Result<Option<GptSummary>, NewsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<GptNewsRow> = gpt_news::table
            .filter(gpt_news::news_id.eq(news.get()))
            .select(GptNewsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_summary).transpose()
    }

    async fn store_summary(&self, summary: &GptSummary) -> Result<(), NewsPersistenceError> {
        use diesel::upsert::excluded;

        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = NewGptNewsRow {
            news_id: summary.news_id.get(),
            title: &summary.title,
            image: summary.image.as_deref(),
            summary: &summary.summary,
        };
        diesel::insert_into(gpt_news::table)
            .values(&row)
            .on_conflict(gpt_news::news_id)
            .do_update()
            .set((
                gpt_news::title.eq(excluded(gpt_news::title)),
                gpt_news::image.eq(excluded(gpt_news::image)),
                gpt_news::summary.eq(excluded(gpt_news::summary)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.
    use super::*;
    use chrono::Utc;

    #[test]
    fn news_rows_convert_to_domain() {
        let article = rows_to_news(
            NewsRow {
                id: 4,
                title: "Headline".to_owned(),
                content: "Body".to_owned(),
                image: None,
                category: "world".to_owned(),
                user_id: 1,
                created_at: Utc::now(),
            },
            AuthorRow {
                id: 1,
                nickname: "desk".to_owned(),
                image: None,
            },
        )
        .expect("conversion succeeds");
        assert_eq!(article.id.get(), 4);
        assert_eq!(article.author_nickname, "desk");
    }

    #[test]
    fn corrupt_news_id_is_a_query_error() {
        let err = rows_to_news(
            NewsRow {
                id: -1,
                title: String::new(),
                content: String::new(),
                image: None,
                category: String::new(),
                user_id: 1,
                created_at: Utc::now(),
            },
            AuthorRow {
                id: 1,
                nickname: String::new(),
                image: None,
            },
        )
        .expect_err("corrupt id must fail");
        assert!(matches!(err, NewsPersistenceError::Query { .. }));
    }
}
