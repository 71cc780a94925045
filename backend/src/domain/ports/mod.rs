//! Ports (traits) the domain exposes to adapters.
//!
//! Repositories are driven ports implemented by the persistence layer;
//! the OAuth gateway and summary source are driven ports implemented by
//! outbound HTTP adapters. Services depend on these traits only, so every
//! service test can substitute an in-memory stub.

mod follow_repository;
mod news_repository;
mod oauth_gateway;
mod password_hasher;
mod poll_repository;
mod scrap_repository;
mod summary_source;
mod token_repository;
mod user_repository;

pub use follow_repository::{FollowOutcome, FollowPersistenceError, FollowRepository};
pub use news_repository::{NewsPersistenceError, NewsRepository};
pub use oauth_gateway::{OAuthGateway, OAuthGatewayError};
pub use password_hasher::PasswordHasher;
pub use poll_repository::{PollPersistenceError, PollRepository, VoteOutcome};
pub use scrap_repository::{ScrapOutcome, ScrapPersistenceError, ScrapRepository};
pub use summary_source::{SummarySource, SummarySourceError};
pub use token_repository::{TokenPersistenceError, TokenRepository};
pub use user_repository::{UserPersistenceError, UserRepository};
