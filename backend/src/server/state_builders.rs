//! Builders wiring persistence adapters into the HTTP state.

use std::sync::Arc;

use crate::domain::ports::{OAuthGateway, SummarySource};
use crate::domain::{FollowService, NewsService, PollService, UserService};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DbPool, DieselFollowRepository, DieselNewsRepository, DieselPollRepository,
    DieselScrapRepository, DieselTokenRepository, DieselUserRepository,
};
use crate::outbound::security::ShaPasswordHasher;

/// Construct the HTTP state from the database pool and outbound gateways.
pub(crate) fn build_http_state(
    pool: &DbPool,
    oauth: Arc<dyn OAuthGateway>,
    summary: Arc<dyn SummarySource>,
) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let tokens = Arc::new(DieselTokenRepository::new(pool.clone()));
    let polls = Arc::new(DieselPollRepository::new(pool.clone()));
    let follows = Arc::new(DieselFollowRepository::new(pool.clone()));
    let news = Arc::new(DieselNewsRepository::new(pool.clone()));
    let scraps = Arc::new(DieselScrapRepository::new(pool.clone()));

    let user_service = Arc::new(UserService::new(
        users.clone(),
        tokens,
        Arc::new(ShaPasswordHasher),
    ));
    let poll_service = Arc::new(PollService::new(polls, users.clone(), follows.clone()));
    let follow_service = Arc::new(FollowService::new(follows, users));
    let news_service = Arc::new(NewsService::new(news, scraps, summary));

    HttpState::new(
        user_service,
        poll_service,
        follow_service,
        news_service,
        oauth,
    )
}
