//! News use-cases: GPT summaries with fallback, scraps, and summary refresh.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::warn;

use crate::domain::error::Error;
use crate::domain::news::{GptNewsSummaryResponse, GptSummary, NewsId, ScrapResponse};
use crate::domain::ports::{
    NewsPersistenceError, NewsRepository, ScrapOutcome, ScrapPersistenceError, ScrapRepository,
    SummarySource,
};
use crate::domain::user::UserId;

/// Only articles published within this many days feed the main summary list.
const SUMMARY_WINDOW_DAYS: i64 = 3;
/// Number of articles on the main summary list.
const SUMMARY_LIMIT: i64 = 10;

fn map_news_error(error: NewsPersistenceError) -> Error {
    match error {
        NewsPersistenceError::Connection { message } => Error::service_unavailable(message),
        NewsPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_scrap_error(error: ScrapPersistenceError) -> Error {
    match error {
        ScrapPersistenceError::Connection { message } => Error::service_unavailable(message),
        ScrapPersistenceError::Query { message } => Error::internal(message),
    }
}

/// Orchestrates article reads, scraps, and summary generation.
#[derive(Clone)]
pub struct NewsService {
    news: Arc<dyn NewsRepository>,
    scraps: Arc<dyn ScrapRepository>,
    summaries: Arc<dyn SummarySource>,
}

impl NewsService {
    /// Create a service over the given ports.
    pub fn new(
        news: Arc<dyn NewsRepository>,
        scraps: Arc<dyn ScrapRepository>,
        summaries: Arc<dyn SummarySource>,
    ) -> Self {
        Self {
            news,
            scraps,
            summaries,
        }
    }

    /// GPT summaries of the most recent admin-authored articles.
    ///
    /// Articles without a stored summary fall back to their own title/image
    /// and a fixed placeholder text.
    pub async fn main_summaries(&self) -> Result<Vec<GptNewsSummaryResponse>, Error> {
        let since = Utc::now() - Duration::days(SUMMARY_WINDOW_DAYS);
        let articles = self
            .news
            .recent_admin_news(since, SUMMARY_LIMIT)
            .await
            .map_err(map_news_error)?;

        let mut responses = Vec::with_capacity(articles.len());
        for article in &articles {
            let summary = self
                .news
                .find_summary(article.id)
                .await
                .map_err(map_news_error)?;
            responses.push(GptNewsSummaryResponse::project(article, summary.as_ref()));
        }
        Ok(responses)
    }

    /// Articles the user has scrapped, projected for the list view.
    pub async fn scrap_list(&self, user: UserId) -> Result<Vec<ScrapResponse>, Error> {
        let now = Utc::now();
        let articles = self
            .scraps
            .list_news_for_user(user)
            .await
            .map_err(map_scrap_error)?;
        Ok(articles
            .iter()
            .map(|article| ScrapResponse::project(article, now))
            .collect())
    }

    /// Bookmark an article for the user.
    pub async fn scrap(&self, user: UserId, news: NewsId) -> Result<(), Error> {
        self.news
            .find(news)
            .await
            .map_err(map_news_error)?
            .ok_or_else(|| Error::not_found("news not found"))?;

        match self
            .scraps
            .insert(user, news)
            .await
            .map_err(map_scrap_error)?
        {
            ScrapOutcome::Applied => Ok(()),
            ScrapOutcome::Duplicate => Err(Error::conflict("already scrapped this article")),
        }
    }

    /// Remove a bookmark.
    pub async fn unscrap(&self, user: UserId, news: NewsId) -> Result<(), Error> {
        let removed = self
            .scraps
            .delete(user, news)
            .await
            .map_err(map_scrap_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("scrap not found"))
        }
    }

    /// Generate and store summaries for recent admin articles that lack one.
    ///
    /// Source failures are logged and skipped so one bad article never blocks
    /// the rest of the batch. Returns the number of summaries stored.
    pub async fn refresh_summaries(&self) -> Result<usize, Error> {
        let since = Utc::now() - Duration::days(SUMMARY_WINDOW_DAYS);
        let articles = self
            .news
            .recent_admin_news(since, SUMMARY_LIMIT)
            .await
            .map_err(map_news_error)?;

        let mut stored = 0;
        for article in &articles {
            if self
                .news
                .find_summary(article.id)
                .await
                .map_err(map_news_error)?
                .is_some()
            {
                continue;
            }

            let summary = match self.summaries.summarize(&article.title, &article.content).await {
                Ok(text) => text,
                Err(error) => {
                    warn!(news = %article.id, %error, "summary generation failed, skipping");
                    continue;
                }
            };

            self.news
                .store_summary(&GptSummary {
                    news_id: article.id,
                    title: article.title.clone(),
                    image: article.image.clone(),
                    summary,
                })
                .await
                .map_err(map_news_error)?;
            stored += 1;
        }
        Ok(stored)
    }
}
