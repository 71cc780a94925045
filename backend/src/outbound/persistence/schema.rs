//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// User accounts, including soft-deleted rows.
    users (id) {
        /// Primary key.
        id -> Int8,
        /// Unique login name; social accounts use `{provider}_{provider_id}`.
        username -> Varchar,
        /// Password hash, or the social-login sentinel.
        password -> Varchar,
        /// Unique contact address.
        email -> Varchar,
        /// Display name.
        nickname -> Varchar,
        /// Profile image URL.
        image -> Nullable<Varchar>,
        /// Access level: `USER` or `ADMIN`.
        role -> Varchar,
        /// OAuth provider for social accounts.
        provider -> Nullable<Varchar>,
        /// Provider-issued subject identifier.
        provider_id -> Nullable<Varchar>,
        /// Soft-delete flag; live lookups filter on this.
        is_deleted -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bearer token digests with their expiry.
    auth_tokens (id) {
        /// Primary key.
        id -> Int8,
        /// SHA-256 hex digest of the opaque token; unique.
        token_digest -> Varchar,
        /// Token owner.
        user_id -> Int8,
        /// Instant after which the token stops authenticating.
        expires_at -> Timestamptz,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Polls.
    polls (id) {
        /// Primary key.
        id -> Int8,
        /// Question shown to voters.
        title -> Varchar,
        /// Poll creator.
        user_id -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Instant after which votes are rejected.
        expired_at -> Timestamptz,
    }
}

diesel::table! {
    /// Poll options; replaced wholesale on poll update.
    poll_options (id) {
        /// Primary key.
        id -> Int8,
        /// Owning poll.
        poll_id -> Int8,
        /// Option text.
        content -> Varchar,
        /// Non-negative vote counter.
        vote_count -> Int4,
    }
}

diesel::table! {
    /// Cast votes; unique per (user, poll).
    poll_votes (id) {
        /// Primary key.
        id -> Int8,
        /// Voting user.
        user_id -> Int8,
        /// Poll voted on; part of the uniqueness guard.
        poll_id -> Int8,
        /// Chosen option.
        poll_option_id -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Published news articles.
    news (id) {
        /// Primary key.
        id -> Int8,
        /// Headline.
        title -> Varchar,
        /// Article body.
        content -> Text,
        /// Lead image URL.
        image -> Nullable<Varchar>,
        /// Category label.
        category -> Varchar,
        /// Authoring user.
        user_id -> Int8,
        /// Publication timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Stored GPT summaries, one per article.
    gpt_news (id) {
        /// Primary key.
        id -> Int8,
        /// Summarised article; unique.
        news_id -> Int8,
        /// Summary headline.
        title -> Varchar,
        /// Summary image URL.
        image -> Nullable<Varchar>,
        /// Summary body text.
        summary -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User bookmarks of articles; unique per (user, news).
    scraps (id) {
        /// Primary key.
        id -> Int8,
        /// Bookmarking user.
        user_id -> Int8,
        /// Bookmarked article.
        news_id -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One-directional follow relationships; unique per pair.
    follows (id) {
        /// Primary key.
        id -> Int8,
        /// Subscribing user.
        follower_id -> Int8,
        /// Subscribed-to user.
        following_id -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(polls -> users (user_id));
diesel::joinable!(poll_options -> polls (poll_id));
diesel::joinable!(poll_votes -> polls (poll_id));
diesel::joinable!(poll_votes -> poll_options (poll_option_id));
diesel::joinable!(news -> users (user_id));
diesel::joinable!(gpt_news -> news (news_id));
diesel::joinable!(scraps -> news (news_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    polls,
    poll_options,
    poll_votes,
    news,
    gpt_news,
    scraps,
    follows,
);
