//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};

use crate::domain::ports::{OAuthGateway, SummarySource};
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) oauth: Arc<dyn OAuthGateway>,
    pub(crate) summary: Arc<dyn SummarySource>,
}

impl ServerConfig {
    /// Construct a server configuration.
    ///
    /// `key` signs the session cookie that carries the OAuth state nonce;
    /// `db_pool` feeds every persistence adapter.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
        oauth: Arc<dyn OAuthGateway>,
        summary: Arc<dyn SummarySource>,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
            oauth,
            summary,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
