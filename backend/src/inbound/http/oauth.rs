//! OAuth2 login and callback handlers.
//!
//! ```text
//! GET /oauth2/{provider}/login
//! GET /oauth2/{provider}/callback?code=...&state=...
//! ```
//!
//! The login redirect stores a random `state` nonce in the session cookie;
//! the callback consumes it, exchanges the code through the gateway port,
//! provisions or reuses the local account, and answers with a bearer token.

use actix_session::Session;
use actix_web::http::header::LOCATION;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::ports::OAuthGatewayError;
use crate::domain::{Error, IssuedToken, Provider};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

fn parse_provider(raw: &str) -> ApiResult<Provider> {
    Provider::parse(raw)
        .ok_or_else(|| Error::invalid_request(format!("unsupported social login: {raw}")))
}

fn state_key(provider: Provider) -> String {
    format!("oauth_state_{provider}")
}

fn map_gateway_error(error: OAuthGatewayError) -> Error {
    match error {
        OAuthGatewayError::Unreachable { .. } => Error::service_unavailable(error.to_string()),
        OAuthGatewayError::CodeRejected { .. } => Error::unauthorized(error.to_string()),
        OAuthGatewayError::Malformed { .. } => Error::internal(error.to_string()),
    }
}

/// Query parameters on the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange.
    pub code: String,
    /// CSRF nonce echoed by the provider.
    pub state: String,
}

/// Redirect the caller to the provider's consent page.
#[utoipa::path(
    get,
    path = "/oauth2/{provider}/login",
    params(("provider" = String, Path, description = "google, kakao, or naver")),
    responses(
        (status = 302, description = "Redirect to the provider consent page"),
        (status = 400, description = "Unsupported provider", body = Error)
    ),
    tags = ["oauth"],
    operation_id = "oauthLogin",
    security([])
)]
#[get("/{provider}/login")]
pub async fn oauth_login(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    session: Session,
) -> ApiResult<HttpResponse> {
    let provider = parse_provider(&path)?;
    let nonce = Uuid::new_v4().simple().to_string();
    session
        .insert(state_key(provider), nonce.clone())
        .map_err(|err| Error::internal(format!("failed to persist oauth state: {err}")))?;

    let url = state.oauth.consent_url(provider, &nonce);
    Ok(HttpResponse::Found()
        .insert_header((LOCATION, url))
        .finish())
}

/// Handle the provider callback and answer with a bearer token.
#[utoipa::path(
    get,
    path = "/oauth2/{provider}/callback",
    params(
        ("provider" = String, Path, description = "google, kakao, or naver"),
        ("code" = String, Query, description = "Authorization code"),
        ("state" = String, Query, description = "CSRF nonce from the login redirect")
    ),
    responses(
        (status = 200, description = "Token issued", body = IssuedToken),
        (status = 400, description = "Unsupported provider", body = Error),
        (status = 401, description = "State mismatch or rejected code", body = Error),
        (status = 503, description = "Provider unreachable", body = Error)
    ),
    tags = ["oauth"],
    operation_id = "oauthCallback",
    security([])
)]
#[get("/{provider}/callback")]
pub async fn oauth_callback(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<CallbackQuery>,
    session: Session,
) -> ApiResult<web::Json<IssuedToken>> {
    let provider = parse_provider(&path)?;

    let key = state_key(provider);
    let stored: Option<String> = session
        .get(&key)
        .map_err(|err| Error::internal(format!("failed to read oauth state: {err}")))?;
    session.remove(&key);
    if stored.as_deref() != Some(query.state.as_str()) {
        return Err(Error::unauthorized("oauth state mismatch"));
    }

    let profile = state
        .oauth
        .fetch_profile(provider, &query.code)
        .await
        .map_err(map_gateway_error)?;
    let user = state.users.find_or_create_social(&profile).await?;
    let token = state.users.issue_token(user.id).await?;
    Ok(web::Json(token))
}

#[cfg(test)]
mod tests {
    //! Handler tests over the in-memory backend and cookie sessions.
    use super::*;
    use crate::domain::ports::UserRepository;
    use crate::inbound::http::test_utils::{test_backend, test_session_middleware, TestBackend};
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use serde_json::Value;

    fn app(
        backend: &TestBackend,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(backend.state.clone()))
            .service(
                web::scope("/oauth2")
                    .wrap(test_session_middleware())
                    .service(oauth_login)
                    .service(oauth_callback),
            )
    }

    /// Drive the full redirect flow and return (session cookie, state nonce).
    async fn start_login(
        app: &impl actix_web::dev::Service<
            actix_web::dev::ServiceRequest,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    ) -> (actix_web::cookie::Cookie<'static>, String) {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::get()
                .uri("/oauth2/google/login")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        let location = res
            .headers()
            .get(LOCATION)
            .expect("redirect location")
            .to_str()
            .expect("ascii location")
            .to_owned();
        let nonce = location
            .split("state=")
            .nth(1)
            .expect("state parameter")
            .split('&')
            .next()
            .expect("state value")
            .to_owned();
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();
        (cookie, nonce)
    }

    #[actix_web::test]
    async fn login_redirects_to_the_consent_page() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;
        let (_, nonce) = start_login(&app).await;
        assert!(!nonce.is_empty());
    }

    #[actix_web::test]
    async fn unsupported_provider_is_a_bad_request() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/oauth2/myspace/login")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn callback_with_matching_state_issues_a_token() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;
        let (cookie, nonce) = start_login(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!(
                    "/oauth2/google/callback?code=good-code&state={nonce}"
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert!(body.get("token").and_then(Value::as_str).is_some());

        // The account was provisioned with the derived social username.
        let user = backend
            .users
            .find_by_username("google_108341")
            .await
            .expect("lookup succeeds")
            .expect("user provisioned");
        assert!(user.nickname.starts_with("Social_User_"));
    }

    #[actix_web::test]
    async fn repeat_callback_reuses_the_same_account() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;

        let (cookie, nonce) = start_login(&app).await;
        let first = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!(
                    "/oauth2/google/callback?code=good-code&state={nonce}"
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::OK);
        let provisioned = backend
            .users
            .find_by_username("google_108341")
            .await
            .expect("lookup succeeds")
            .expect("user provisioned");

        let (cookie, nonce) = start_login(&app).await;
        let second = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!(
                    "/oauth2/google/callback?code=good-code&state={nonce}"
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::OK);
        let reused = backend
            .users
            .find_by_username("google_108341")
            .await
            .expect("lookup succeeds")
            .expect("user still present");
        assert_eq!(reused.id, provisioned.id);
    }

    #[actix_web::test]
    async fn callback_with_wrong_state_is_unauthorised() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;
        let (cookie, _) = start_login(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/oauth2/google/callback?code=good-code&state=forged")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn callback_with_rejected_code_is_unauthorised() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;
        let (cookie, nonce) = start_login(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!(
                    "/oauth2/google/callback?code=bad-code&state={nonce}"
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
