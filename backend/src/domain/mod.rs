//! Domain layer: entities, validation, ports, and use-case services.
//!
//! Types here are transport and storage agnostic. Inbound adapters translate
//! HTTP payloads into the validated inputs defined in this module; outbound
//! adapters implement the port traits under [`ports`].

pub mod auth;
pub mod error;
pub mod follow_service;
pub mod news;
pub mod news_service;
pub mod oauth;
pub mod poll;
pub mod poll_service;
pub mod ports;
pub mod time;
pub mod user;
pub mod user_service;

pub use self::auth::{AccessToken, IssuedToken, LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::follow_service::FollowService;
pub use self::news::{GptNewsSummaryResponse, GptSummary, News, NewsId, ScrapResponse};
pub use self::news_service::NewsService;
pub use self::oauth::{Provider, SocialProfile};
pub use self::poll::{
    Poll, PollDraft, PollId, PollOption, PollOptionId, PollOptionResponse, PollResponse,
    PollSummaryResponse, PollUpdate,
};
pub use self::poll_service::PollService;
pub use self::user::{NewUser, Role, User, UserId, UserProfile};
pub use self::user_service::UserService;

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
