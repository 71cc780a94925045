//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
    SessionMiddleware,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::follows::{follow, unfollow};
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::news::{list_scraps, main_summaries, refresh_summaries, scrap, unscrap};
use crate::inbound::http::oauth::{oauth_callback, oauth_login};
use crate::inbound::http::polls::{
    create_poll, delete_poll, get_poll, list_polls, recent_polls, update_poll, vote,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{current_user, delete_account, join, login};
use crate::middleware::Trace;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    // The session cookie carries only the OAuth state nonce, so the
    // middleware wraps the /oauth2 scope alone.
    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::minutes(10)),
        )
        .build();

    let api = web::scope("/api/v1")
        .service(join)
        .service(login)
        .service(current_user)
        .service(delete_account)
        .service(follow)
        .service(unfollow)
        .service(list_polls)
        .service(recent_polls)
        .service(create_poll)
        .service(update_poll)
        .service(delete_poll)
        .service(vote)
        .service(get_poll)
        .service(main_summaries)
        .service(refresh_summaries)
        .service(list_scraps)
        .service(scrap)
        .service(unscrap);

    let oauth = web::scope("/oauth2")
        .wrap(session)
        .service(oauth_login)
        .service(oauth_callback);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(oauth)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool,
        oauth,
        summary,
    } = config;

    let http_state = web::Data::new(build_http_state(&db_pool, oauth, summary));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
