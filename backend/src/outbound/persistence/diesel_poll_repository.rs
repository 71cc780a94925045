//! PostgreSQL-backed `PollRepository` implementation using Diesel.
//!
//! Poll creation and option replacement run in transactions so the aggregate
//! is never observable half-written. The duplicate-vote guard is the
//! `(user_id, poll_id)` UNIQUE constraint: the vote insert uses
//! `ON CONFLICT DO NOTHING` and reports a duplicate when zero rows land,
//! which keeps the check-then-increment sequence atomic under concurrency.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::poll::{Poll, PollAuthor, PollDraft, PollId, PollOption, PollOptionId};
use crate::domain::ports::{PollPersistenceError, PollRepository, VoteOutcome};
use crate::domain::user::UserId;

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{AuthorRow, NewPollOptionRow, NewPollRow, NewPollVoteRow, PollOptionRow, PollRow};
use super::pool::DbPool;
use super::schema::{poll_options, poll_votes, polls, users};

/// Diesel-backed implementation of the `PollRepository` port.
#[derive(Clone)]
pub struct DieselPollRepository {
    pool: DbPool,
}

impl DieselPollRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> PollPersistenceError {
    match failure {
        DbFailure::Connection(message) => PollPersistenceError::connection(message),
        DbFailure::Query(message) => PollPersistenceError::query(message),
    }
}

fn map_pool(error: super::pool::PoolError) -> PollPersistenceError {
    map_failure(classify_pool_error(error))
}

fn map_diesel(error: diesel::result::Error) -> PollPersistenceError {
    map_failure(classify_diesel_error(error))
}

type AggregateRows = (PollRow, AuthorRow, Vec<PollOptionRow>);

fn rows_to_poll(rows: AggregateRows) -> Result<Poll, PollPersistenceError> {
    let (poll, author, options) = rows;
    let corrupt = || PollPersistenceError::query("corrupt poll aggregate");
    Ok(Poll {
        id: PollId::new(poll.id).map_err(|_| corrupt())?,
        title: poll.title,
        created_at: poll.created_at,
        expired_at: poll.expired_at,
        author: PollAuthor {
            id: UserId::new(author.id).map_err(|_| corrupt())?,
            nickname: author.nickname,
            image: author.image,
        },
        options: options
            .into_iter()
            .map(|option| {
                Ok(PollOption {
                    id: PollOptionId::new(option.id).map_err(|_| corrupt())?,
                    content: option.content,
                    vote_count: option.vote_count,
                })
            })
            .collect::<Result<Vec<_>, PollPersistenceError>>()?,
    })
}

/// Fetch one poll with its author and ordered options.
async fn load_aggregate_rows<C>(
    conn: &mut C,
    poll: i64,
) -> Result<Option<AggregateRows>, diesel::result::Error>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let head: Option<(PollRow, AuthorRow)> = polls::table
        .inner_join(users::table)
        .filter(polls::id.eq(poll))
        .select((PollRow::as_select(), AuthorRow::as_select()))
        .first(conn)
        .await
        .optional()?;

    let Some((poll_row, author)) = head else {
        return Ok(None);
    };

    let options = poll_options::table
        .filter(poll_options::poll_id.eq(poll_row.id))
        .order(poll_options::id.asc())
        .select(PollOptionRow::as_select())
        .load(conn)
        .await?;
    Ok(Some((poll_row, author, options)))
}

/// Attach options to a batch of (poll, author) rows in one query.
async fn attach_options<C>(
    conn: &mut C,
    heads: Vec<(PollRow, AuthorRow)>,
) -> Result<Vec<AggregateRows>, diesel::result::Error>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let ids: Vec<i64> = heads.iter().map(|(poll, _)| poll.id).collect();
    let all_options: Vec<PollOptionRow> = poll_options::table
        .filter(poll_options::poll_id.eq_any(&ids))
        .order((poll_options::poll_id.asc(), poll_options::id.asc()))
        .select(PollOptionRow::as_select())
        .load(conn)
        .await?;

    let mut grouped: HashMap<i64, Vec<PollOptionRow>> = HashMap::new();
    for option in all_options {
        grouped.entry(option.poll_id).or_default().push(option);
    }

    Ok(heads
        .into_iter()
        .map(|(poll, author)| {
            let options = grouped.remove(&poll.id).unwrap_or_default();
            (poll, author, options)
        })
        .collect())
}

#[async_trait]
impl PollRepository for DieselPollRepository {
    async fn create(&self, author: UserId, draft: &PollDraft) -> Result<Poll, PollPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows = conn
            .transaction(|conn| {
                async move {
                    let poll: PollRow = diesel::insert_into(polls::table)
                        .values(&NewPollRow {
                            title: &draft.title,
                            user_id: author.get(),
                            expired_at: draft.expired_at,
                        })
                        .returning(PollRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let option_rows: Vec<NewPollOptionRow<'_>> = draft
                        .options
                        .iter()
                        .map(|content| NewPollOptionRow {
                            poll_id: poll.id,
                            content,
                        })
                        .collect();
                    diesel::insert_into(poll_options::table)
                        .values(&option_rows)
                        .execute(conn)
                        .await?;

                    load_aggregate_rows(conn, poll.id)
                        .await?
                        .ok_or(diesel::result::Error::NotFound)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel)?;
        rows_to_poll(rows)
    }

    async fn find(&self, id: PollId) -> Result<Option<Poll>, PollPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows = load_aggregate_rows(&mut conn, id.get())
            .await
            .map_err(map_diesel)?;
        rows.map(rows_to_poll).transpose()
    }

    async fn find_by_option(
        &self,
        option: PollOptionId,
    ) -> Result<Option<Poll>, PollPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let owner: Option<i64> = poll_options::table
            .filter(poll_options::id.eq(option.get()))
            .select(poll_options::poll_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        let Some(poll_id) = owner else {
            return Ok(None);
        };
        let rows = load_aggregate_rows(&mut conn, poll_id)
            .await
            .map_err(map_diesel)?;
        rows.map(rows_to_poll).transpose()
    }

    async fn list_open(&self, now: DateTime<Utc>) -> Result<Vec<Poll>, PollPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let heads: Vec<(PollRow, AuthorRow)> = polls::table
            .inner_join(users::table)
            .filter(polls::expired_at.gt(now))
            .order(polls::created_at.desc())
            .select((PollRow::as_select(), AuthorRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows = attach_options(&mut conn, heads).await.map_err(map_diesel)?;
        rows.into_iter().map(rows_to_poll).collect()
    }

    async fn list_open_soonest(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Poll>, PollPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let heads: Vec<(PollRow, AuthorRow)> = polls::table
            .inner_join(users::table)
            .filter(polls::expired_at.gt(now))
            .order(polls::expired_at.asc())
            .limit(limit)
            .select((PollRow::as_select(), AuthorRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows = attach_options(&mut conn, heads).await.map_err(map_diesel)?;
        rows.into_iter().map(rows_to_poll).collect()
    }

    async fn replace(
        &self,
        id: PollId,
        title: &str,
        expired_at: DateTime<Utc>,
        options: &[String],
    ) -> Result<Poll, PollPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let poll_id = id.get();

        let rows = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(polls::table.filter(polls::id.eq(poll_id)))
                        .set((polls::title.eq(title), polls::expired_at.eq(expired_at)))
                        .execute(conn)
                        .await?;
                    if updated == 0 {
                        return Err(diesel::result::Error::NotFound);
                    }

                    // Votes cascade away with the deleted options, so counts
                    // restart at zero for the replacement set.
                    diesel::delete(
                        poll_options::table.filter(poll_options::poll_id.eq(poll_id)),
                    )
                    .execute(conn)
                    .await?;

                    let option_rows: Vec<NewPollOptionRow<'_>> = options
                        .iter()
                        .map(|content| NewPollOptionRow {
                            poll_id,
                            content,
                        })
                        .collect();
                    diesel::insert_into(poll_options::table)
                        .values(&option_rows)
                        .execute(conn)
                        .await?;

                    load_aggregate_rows(conn, poll_id)
                        .await?
                        .ok_or(diesel::result::Error::NotFound)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel)?;
        rows_to_poll(rows)
    }

    async fn delete(&self, id: PollId) -> Result<bool, PollPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let removed = diesel::delete(polls::table.filter(polls::id.eq(id.get())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(removed > 0)
    }

    async fn insert_vote(
        &self,
        user: UserId,
        poll: PollId,
        option: PollOptionId,
    ) -> Result<VoteOutcome, PollPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        conn.transaction(|conn| {
            async move {
                let inserted = diesel::insert_into(poll_votes::table)
                    .values(&NewPollVoteRow {
                        user_id: user.get(),
                        poll_id: poll.get(),
                        poll_option_id: option.get(),
                    })
                    .on_conflict((poll_votes::user_id, poll_votes::poll_id))
                    .do_nothing()
                    .execute(conn)
                    .await?;

                if inserted == 0 {
                    return Ok(VoteOutcome::Duplicate);
                }

                diesel::update(poll_options::table.filter(poll_options::id.eq(option.get())))
                    .set(poll_options::vote_count.eq(poll_options::vote_count + 1))
                    .execute(conn)
                    .await?;
                Ok(VoteOutcome::Applied)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn has_voted(&self, user: UserId, poll: PollId) -> Result<bool, PollPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::select(diesel::dsl::exists(
            poll_votes::table
                .filter(poll_votes::user_id.eq(user.get()))
                .filter(poll_votes::poll_id.eq(poll.get())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for aggregate conversion.
    use super::*;
    use chrono::Utc;

    fn aggregate() -> AggregateRows {
        (
            PollRow {
                id: 1,
                title: "Best headline?".to_owned(),
                user_id: 2,
                created_at: Utc::now(),
                expired_at: Utc::now(),
            },
            AuthorRow {
                id: 2,
                nickname: "editor".to_owned(),
                image: None,
            },
            vec![
                PollOptionRow {
                    id: 11,
                    poll_id: 1,
                    content: "A".to_owned(),
                    vote_count: 3,
                },
                PollOptionRow {
                    id: 12,
                    poll_id: 1,
                    content: "B".to_owned(),
                    vote_count: 0,
                },
            ],
        )
    }

    #[test]
    fn aggregate_converts_to_domain_poll() {
        let poll = rows_to_poll(aggregate()).expect("conversion succeeds");
        assert_eq!(poll.id.get(), 1);
        assert_eq!(poll.author.nickname, "editor");
        assert_eq!(poll.options.len(), 2);
        assert_eq!(poll.total_votes(), 3);
    }

    #[test]
    fn corrupt_ids_surface_as_query_errors() {
        let (mut poll, author, options) = aggregate();
        poll.id = 0;
        let err = rows_to_poll((poll, author, options)).expect_err("corrupt id must fail");
        assert!(matches!(err, PollPersistenceError::Query { .. }));
    }
}
