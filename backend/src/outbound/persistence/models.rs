//! Diesel row structs used by the persistence adapters.
//!
//! These are internal implementation details of the outbound layer; domain
//! types never depend on them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{
    auth_tokens, follows, gpt_news, news, poll_options, poll_votes, polls, scraps, users,
};

/// Queryable row for user accounts.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub nickname: String,
    pub image: Option<String>,
    pub role: String,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable row for user accounts.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    pub nickname: &'a str,
    pub image: Option<&'a str>,
    pub role: &'a str,
    pub provider: Option<&'a str>,
    pub provider_id: Option<&'a str>,
}

/// Author projection joined onto polls and news rows.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuthorRow {
    pub id: i64,
    pub nickname: String,
    pub image: Option<String>,
}

/// Insertable row for bearer token digests.
#[derive(Debug, Insertable)]
#[diesel(table_name = auth_tokens)]
pub(crate) struct NewTokenRow<'a> {
    pub token_digest: &'a str,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Queryable row for polls.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = polls)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PollRow {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

/// Insertable row for polls.
#[derive(Debug, Insertable)]
#[diesel(table_name = polls)]
pub(crate) struct NewPollRow<'a> {
    pub title: &'a str,
    pub user_id: i64,
    pub expired_at: DateTime<Utc>,
}

/// Queryable row for poll options.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = poll_options)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PollOptionRow {
    pub id: i64,
    pub poll_id: i64,
    pub content: String,
    pub vote_count: i32,
}

/// Insertable row for poll options.
#[derive(Debug, Insertable)]
#[diesel(table_name = poll_options)]
pub(crate) struct NewPollOptionRow<'a> {
    pub poll_id: i64,
    pub content: &'a str,
}

/// Insertable row for poll votes.
#[derive(Debug, Insertable)]
#[diesel(table_name = poll_votes)]
pub(crate) struct NewPollVoteRow {
    pub user_id: i64,
    pub poll_id: i64,
    pub poll_option_id: i64,
}

/// Queryable row for news articles.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = news)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NewsRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub category: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Queryable row for stored GPT summaries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = gpt_news)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GptNewsRow {
    pub news_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub summary: String,
}

/// Insertable row for stored GPT summaries.
#[derive(Debug, Insertable)]
#[diesel(table_name = gpt_news)]
pub(crate) struct NewGptNewsRow<'a> {
    pub news_id: i64,
    pub title: &'a str,
    pub image: Option<&'a str>,
    pub summary: &'a str,
}

/// Insertable row for scraps.
#[derive(Debug, Insertable)]
#[diesel(table_name = scraps)]
pub(crate) struct NewScrapRow {
    pub user_id: i64,
    pub news_id: i64,
}

/// Insertable row for follow relationships.
#[derive(Debug, Insertable)]
#[diesel(table_name = follows)]
pub(crate) struct NewFollowRow {
    pub follower_id: i64,
    pub following_id: i64,
}
