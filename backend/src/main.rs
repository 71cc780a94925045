//! Backend entry-point: configuration, migrations, and server bootstrap.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use reqwest::Url;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::domain::ports::{OAuthGateway, SummarySource};
use backend::inbound::http::health::HealthState;
use backend::outbound::oauth::{OAuthHttpGateway, ProviderCredentials};
use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::outbound::summary::GptSummarySource;
use backend::server::{create_server, ServerConfig};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SUMMARY_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o-mini";

fn io_error(message: impl Into<String>) -> std::io::Error {
    std::io::Error::other(message.into())
}

/// Apply pending migrations over a blocking connection before serving.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| io_error(format!("failed to connect for migrations: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| io_error(format!("failed to run migrations: {err}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied database migrations");
    }
    Ok(())
}

fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(io_error(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn provider_credentials(prefix: &str, redirect_base: &str, provider: &str) -> ProviderCredentials {
    let client_id = env::var(format!("{prefix}_CLIENT_ID")).unwrap_or_else(|_| {
        warn!(provider, "client id not configured; social login will fail");
        String::new()
    });
    let client_secret = env::var(format!("{prefix}_CLIENT_SECRET")).unwrap_or_default();
    ProviderCredentials {
        client_id,
        client_secret,
        redirect_uri: format!("{redirect_base}/oauth2/{provider}/callback"),
    }
}

fn build_oauth_gateway() -> std::io::Result<Arc<dyn OAuthGateway>> {
    let redirect_base =
        env::var("OAUTH_REDIRECT_BASE").unwrap_or_else(|_| "http://localhost:8080".into());
    let gateway = OAuthHttpGateway::new(
        provider_credentials("GOOGLE", &redirect_base, "google"),
        provider_credentials("KAKAO", &redirect_base, "kakao"),
        provider_credentials("NAVER", &redirect_base, "naver"),
    )
    .map_err(|err| io_error(format!("failed to build oauth client: {err}")))?;
    Ok(Arc::new(gateway))
}

fn build_summary_source() -> std::io::Result<Arc<dyn SummarySource>> {
    let endpoint = env::var("SUMMARY_API_URL").unwrap_or_else(|_| DEFAULT_SUMMARY_ENDPOINT.into());
    let endpoint = Url::parse(&endpoint)
        .map_err(|err| io_error(format!("invalid SUMMARY_API_URL: {err}")))?;
    let api_key = env::var("SUMMARY_API_KEY").unwrap_or_else(|_| {
        warn!("summary api key not configured; summary refresh will fail");
        String::new()
    });
    let model = env::var("SUMMARY_MODEL").unwrap_or_else(|_| DEFAULT_SUMMARY_MODEL.into());
    let source = GptSummarySource::new(endpoint, api_key, model)
        .map_err(|err| io_error(format!("failed to build summary client: {err}")))?;
    Ok(Arc::new(source))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url =
        env::var("DATABASE_URL").map_err(|_| io_error("DATABASE_URL must be set"))?;
    run_migrations(&database_url)?;

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into())
        .parse()
        .map_err(|err| io_error(format!("invalid BIND_ADDR: {err}")))?;

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let key = load_session_key()?;

    let db_pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|err| io_error(format!("failed to build database pool: {err}")))?;

    let config = ServerConfig::new(
        key,
        cookie_secure,
        SameSite::Lax,
        bind_addr,
        db_pool,
        build_oauth_gateway()?,
        build_summary_source()?,
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "server started");
    server.await
}
