//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend on
//! domain services and ports only, never on concrete adapters. Services are
//! constructed once at startup and cloned per worker.

use std::sync::Arc;

use crate::domain::ports::OAuthGateway;
use crate::domain::{FollowService, NewsService, PollService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account use-cases: join, login, tokens, profiles, OAuth provisioning.
    pub users: Arc<UserService>,
    /// Poll use-cases: CRUD, voting, response assembly.
    pub polls: Arc<PollService>,
    /// Follow use-cases.
    pub follows: Arc<FollowService>,
    /// News, scrap, and summary use-cases.
    pub news: Arc<NewsService>,
    /// OAuth code exchange and consent URL construction.
    pub oauth: Arc<dyn OAuthGateway>,
}

impl HttpState {
    /// Bundle the services for handler injection.
    pub fn new(
        users: Arc<UserService>,
        polls: Arc<PollService>,
        follows: Arc<FollowService>,
        news: Arc<NewsService>,
        oauth: Arc<dyn OAuthGateway>,
    ) -> Self {
        Self {
            users,
            polls,
            follows,
            news,
            oauth,
        }
    }
}
