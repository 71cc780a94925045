//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification for the REST API. The
//! document is served by Swagger UI in debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "News portal backend API",
        description = "Articles, GPT summaries, polls, scraps, follows, and social login."
    ),
    paths(
        crate::inbound::http::polls::list_polls,
        crate::inbound::http::polls::recent_polls,
        crate::inbound::http::polls::get_poll,
        crate::inbound::http::polls::create_poll,
        crate::inbound::http::polls::update_poll,
        crate::inbound::http::polls::delete_poll,
        crate::inbound::http::polls::vote,
        crate::inbound::http::users::join,
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::delete_account,
        crate::inbound::http::follows::follow,
        crate::inbound::http::follows::unfollow,
        crate::inbound::http::news::main_summaries,
        crate::inbound::http::news::refresh_summaries,
        crate::inbound::http::news::list_scraps,
        crate::inbound::http::news::scrap,
        crate::inbound::http::news::unscrap,
        crate::inbound::http::oauth::oauth_login,
        crate::inbound::http::oauth::oauth_callback,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::IssuedToken,
        crate::domain::UserProfile,
        crate::domain::PollResponse,
        crate::domain::PollOptionResponse,
        crate::domain::PollSummaryResponse,
        crate::domain::GptNewsSummaryResponse,
        crate::domain::ScrapResponse,
        crate::inbound::http::polls::CreatePollRequest,
        crate::inbound::http::polls::UpdatePollRequest,
        crate::inbound::http::polls::VoteRequest,
        crate::inbound::http::users::JoinRequest,
        crate::inbound::http::users::LoginRequest,
    )),
    tags(
        (name = "polls", description = "Poll CRUD and voting"),
        (name = "users", description = "Accounts and authentication"),
        (name = "follows", description = "Follow relationships"),
        (name = "news", description = "Articles, summaries, and scraps"),
        (name = "oauth", description = "Social login"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
