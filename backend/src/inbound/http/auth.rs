//! Bearer-token extractors used by HTTP handlers.
//!
//! The `Authorization: Bearer` header is resolved against the token store on
//! every request, keeping the API stateless from the caller's point of view.
//! [`MaybeUser`] admits anonymous callers for read-only endpoints;
//! [`AuthUser`] rejects them with `401`.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the raw bearer token from the request, if one was presented.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?;
    let value = header.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}

fn state_from(req: &HttpRequest) -> Result<HttpState, Error> {
    req.app_data::<web::Data<HttpState>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| Error::internal("http state is not configured"))
}

/// Caller identity for endpoints that admit anonymous access.
///
/// A missing, malformed, or expired token resolves to `None` rather than an
/// error so read-only endpoints stay reachable without credentials.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<UserId>);

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = state_from(req);
        Box::pin(async move {
            let Some(token) = token else {
                return Ok(MaybeUser(None));
            };
            let state = state?;
            let user = state.users.resolve_token(&token).await?;
            Ok(MaybeUser(user))
        })
    }
}

/// Caller identity for endpoints that require authentication.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = state_from(req);
        Box::pin(async move {
            let token = token.ok_or_else(|| Error::unauthorized("login required"))?;
            let state = state?;
            let user = state
                .users
                .resolve_token(&token)
                .await?
                .ok_or_else(|| Error::unauthorized("invalid or expired token"))?;
            Ok(AuthUser(user))
        })
    }
}
