//! Poll aggregate: polls, their options, and response projections.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::time::{format_d_day, format_relative_time};
use crate::domain::user::UserId;

/// Minimum number of options a poll must carry after creation or update.
pub const POLL_OPTIONS_MIN: usize = 2;
/// Maximum accepted length for poll titles and option texts.
pub const POLL_TEXT_MAX: usize = 255;

/// Validation errors raised by poll value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollValidationError {
    /// Identifier was zero or negative.
    #[error("poll id must be a positive integer")]
    InvalidId,
    /// Title was missing or blank once trimmed.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeded the storage limit.
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Fewer than the minimum number of options were supplied.
    #[error("poll must have at least {min} options")]
    TooFewOptions {
        /// Minimum required option count.
        min: usize,
    },
    /// An option text was missing or blank once trimmed.
    #[error("option text must not be empty")]
    EmptyOption,
    /// An option text exceeded the storage limit.
    #[error("option text must be at most {max} characters")]
    OptionTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The supplied expiry is not in the future.
    #[error("expiry must be in the future")]
    ExpiryInPast,
}

/// Stable numeric poll identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PollId(i64);

impl PollId {
    /// Validate and construct a [`PollId`].
    pub fn new(raw: i64) -> Result<Self, PollValidationError> {
        if raw <= 0 {
            return Err(PollValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Access the raw identifier for persistence.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable numeric poll option identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PollOptionId(i64);

impl PollOptionId {
    /// Validate and construct a [`PollOptionId`].
    pub fn new(raw: i64) -> Result<Self, PollValidationError> {
        if raw <= 0 {
            return Err(PollValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Access the raw identifier for persistence.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PollOptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selectable option of a poll.
///
/// `vote_count` is mutated only by vote casting (+1) or reset when the
/// option set is replaced on poll update; it is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOption {
    /// Stable option identifier.
    pub id: PollOptionId,
    /// Option text shown to voters.
    pub content: String,
    /// Number of votes cast for this option.
    pub vote_count: i32,
}

/// Author projection carried by each poll aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollAuthor {
    /// Author's user id.
    pub id: UserId,
    /// Author's display name.
    pub nickname: String,
    /// Author's profile image, if set.
    pub image: Option<String>,
}

/// A poll with its author and ordered options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    /// Stable poll identifier.
    pub id: PollId,
    /// Question shown to voters.
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Instant after which votes are rejected.
    pub expired_at: DateTime<Utc>,
    /// Poll creator.
    pub author: PollAuthor,
    /// Ordered options; at least [`POLL_OPTIONS_MIN`] after creation/update.
    pub options: Vec<PollOption>,
}

impl Poll {
    /// Whether the poll still accepts votes at `now`.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.expired_at > now
    }

    /// Sum of all option vote counts.
    pub fn total_votes(&self) -> i64 {
        self.options.iter().map(|option| i64::from(option.vote_count)).sum()
    }
}

fn validate_title(title: &str) -> Result<String, PollValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(PollValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > POLL_TEXT_MAX {
        return Err(PollValidationError::TitleTooLong { max: POLL_TEXT_MAX });
    }
    Ok(trimmed.to_owned())
}

fn validate_options(options: Vec<String>) -> Result<Vec<String>, PollValidationError> {
    if options.len() < POLL_OPTIONS_MIN {
        return Err(PollValidationError::TooFewOptions {
            min: POLL_OPTIONS_MIN,
        });
    }
    options
        .into_iter()
        .map(|option| {
            let trimmed = option.trim();
            if trimmed.is_empty() {
                return Err(PollValidationError::EmptyOption);
            }
            if trimmed.chars().count() > POLL_TEXT_MAX {
                return Err(PollValidationError::OptionTooLong { max: POLL_TEXT_MAX });
            }
            Ok(trimmed.to_owned())
        })
        .collect()
}

/// Validated input for creating a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    /// Question shown to voters.
    pub title: String,
    /// Instant after which votes are rejected; strictly in the future.
    pub expired_at: DateTime<Utc>,
    /// Option texts, at least [`POLL_OPTIONS_MIN`] of them.
    pub options: Vec<String>,
}

impl PollDraft {
    /// Validate raw create-poll inputs.
    pub fn try_new(
        title: &str,
        expired_at: DateTime<Utc>,
        options: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, PollValidationError> {
        let title = validate_title(title)?;
        let options = validate_options(options)?;
        if expired_at <= now {
            return Err(PollValidationError::ExpiryInPast);
        }
        Ok(Self {
            title,
            expired_at,
            options,
        })
    }
}

/// Validated input for updating a poll.
///
/// `expired_at` is optional: `None` keeps the poll's previous expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollUpdate {
    /// Replacement question text.
    pub title: String,
    /// Replacement expiry, or `None` to keep the existing one.
    pub expired_at: Option<DateTime<Utc>>,
    /// Replacement option texts; the previous set is discarded wholesale.
    pub options: Vec<String>,
}

impl PollUpdate {
    /// Validate raw update-poll inputs.
    pub fn try_new(
        title: &str,
        expired_at: Option<DateTime<Utc>>,
        options: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, PollValidationError> {
        let title = validate_title(title)?;
        let options = validate_options(options)?;
        if let Some(expiry) = expired_at {
            if expiry <= now {
                return Err(PollValidationError::ExpiryInPast);
            }
        }
        Ok(Self {
            title,
            expired_at,
            options,
        })
    }
}

/// Flattened option projection inside [`PollResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionResponse {
    /// Option identifier to vote with.
    pub id: PollOptionId,
    /// Option text.
    pub content: String,
    /// Current vote count.
    pub count: i32,
}

/// Flattened poll projection returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    /// Poll identifier.
    pub id: PollId,
    /// Question text.
    pub title: String,
    /// Relative creation time, e.g. `3 hours ago`.
    pub created_at: String,
    /// Countdown to expiry, e.g. `D-3`.
    pub expired_at: String,
    /// Author's user id.
    pub user_id: UserId,
    /// Author's display name.
    pub nickname: String,
    /// Author's profile image, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Whether the requesting user already voted; false for anonymous callers.
    pub is_vote: bool,
    /// Whether the requesting user follows the author; false for anonymous callers.
    pub followed: bool,
    /// Option projections in display order.
    pub poll_options: Vec<PollOptionResponse>,
}

impl PollResponse {
    /// Project a poll aggregate into its response shape.
    pub fn project(poll: &Poll, voted: bool, followed: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: poll.id,
            title: poll.title.clone(),
            created_at: format_relative_time(poll.created_at, now),
            expired_at: format_d_day(poll.expired_at, now),
            user_id: poll.author.id,
            nickname: poll.author.nickname.clone(),
            image: poll.author.image.clone(),
            is_vote: voted,
            followed,
            poll_options: poll
                .options
                .iter()
                .map(|option| PollOptionResponse {
                    id: option.id,
                    content: option.content.clone(),
                    count: option.vote_count,
                })
                .collect(),
        }
    }
}

/// Compact poll projection returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollSummaryResponse {
    /// Poll identifier.
    pub id: PollId,
    /// Question text.
    pub title: String,
    /// Relative creation time.
    pub created_at: String,
    /// Countdown to expiry.
    pub expired_at: String,
    /// Author's display name.
    pub nickname: String,
}

impl PollSummaryResponse {
    /// Project a poll aggregate into its list-row shape.
    pub fn project(poll: &Poll, now: DateTime<Utc>) -> Self {
        Self {
            id: poll.id,
            title: poll.title.clone(),
            created_at: format_relative_time(poll.created_at, now),
            expired_at: format_d_day(poll.expired_at, now),
            nickname: poll.author.nickname.clone(),
        }
    }
}
