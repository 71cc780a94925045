//! News article model, GPT summaries, and scrap projections.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::time::format_relative_time;
use crate::domain::user::UserId;

/// Placeholder shown when an article has no stored GPT summary.
pub const SUMMARY_FALLBACK: &str = "No summary is available yet.";

/// Validation errors raised by news value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewsValidationError {
    /// Identifier was zero or negative.
    #[error("news id must be a positive integer")]
    InvalidId,
}

/// Stable numeric news article identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct NewsId(i64);

impl NewsId {
    /// Validate and construct a [`NewsId`].
    pub fn new(raw: i64) -> Result<Self, NewsValidationError> {
        if raw <= 0 {
            return Err(NewsValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Access the raw identifier for persistence.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NewsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A published news article with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct News {
    /// Stable article identifier.
    pub id: NewsId,
    /// Headline.
    pub title: String,
    /// Article body.
    pub content: String,
    /// Lead image URL, if one was attached.
    pub image: Option<String>,
    /// Category label, e.g. `politics`.
    pub category: String,
    /// Authoring user's id.
    pub author_id: UserId,
    /// Authoring user's display name.
    pub author_nickname: String,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
}

/// A stored GPT summary attached to one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GptSummary {
    /// Article the summary belongs to.
    pub news_id: NewsId,
    /// Summary headline (may be rewritten by the model).
    pub title: String,
    /// Summary image URL, if one was generated or carried over.
    pub image: Option<String>,
    /// Summary body text.
    pub summary: String,
}

/// Flattened summary row returned by the main-summary endpoint.
///
/// Articles without a stored summary fall back to their own title/image and
/// [`SUMMARY_FALLBACK`] as the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GptNewsSummaryResponse {
    /// Article identifier.
    pub id: NewsId,
    /// Image URL to display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Headline to display.
    pub title: String,
    /// Summary text or the fallback placeholder.
    pub summary: String,
}

impl GptNewsSummaryResponse {
    /// Combine an article with its optional stored summary.
    pub fn project(news: &News, summary: Option<&GptSummary>) -> Self {
        match summary {
            Some(stored) => Self {
                id: news.id,
                image: stored.image.clone(),
                title: stored.title.clone(),
                summary: stored.summary.clone(),
            },
            None => Self {
                id: news.id,
                image: news.image.clone(),
                title: news.title.clone(),
                summary: SUMMARY_FALLBACK.to_owned(),
            },
        }
    }
}

/// Flattened scrap row returned by the scrap-list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapResponse {
    /// Scrapped article identifier.
    pub news_id: NewsId,
    /// Article image URL, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Article category label.
    pub category_name: String,
    /// Article headline.
    pub title: String,
    /// Article author's display name.
    pub nickname: String,
    /// Relative publication time, e.g. `2 days ago`.
    pub created_at: String,
}

impl ScrapResponse {
    /// Project a scrapped article into its list-row shape.
    pub fn project(news: &News, now: DateTime<Utc>) -> Self {
        Self {
            news_id: news.id,
            image: news.image.clone(),
            category_name: news.category.clone(),
            title: news.title.clone(),
            nickname: news.author_nickname.clone(),
            created_at: format_relative_time(news.created_at, now),
        }
    }
}
