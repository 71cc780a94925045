//! User account API handlers.
//!
//! ```text
//! POST   /api/v1/users/join
//! POST   /api/v1/users/login
//! GET    /api/v1/users/me
//! DELETE /api/v1/users/me
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, IssuedToken, LoginCredentials, LoginValidationError, UserProfile};
use crate::inbound::http::auth::AuthUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Desired login name; also the initial nickname.
    pub username: String,
    /// Raw password; hashed before storage.
    pub password: String,
    /// Contact address.
    pub email: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Raw password.
    pub password: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Register a password account.
#[utoipa::path(
    post,
    path = "/api/v1/users/join",
    request_body = JoinRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "join",
    security([])
)]
#[post("/users/join")]
pub async fn join(
    state: web::Data<HttpState>,
    payload: web::Json<JoinRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&payload.username, &payload.password)
        .map_err(map_login_validation_error)?;
    let profile = state.users.join(&credentials, &payload.email).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// Authenticate and receive a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = IssuedToken),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<IssuedToken>> {
    let credentials = LoginCredentials::try_from_parts(&payload.username, &payload.password)
        .map_err(map_login_validation_error)?;
    Ok(web::Json(state.users.login(&credentials).await?))
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Caller profile", body = UserProfile),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account deleted", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    user: AuthUser,
) -> ApiResult<web::Json<UserProfile>> {
    Ok(web::Json(state.users.profile(user.0).await?))
}

/// Soft-delete the caller's account.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteAccount"
)]
#[delete("/users/me")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    user: AuthUser,
) -> ApiResult<HttpResponse> {
    state.users.delete_account(user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Handler tests over the in-memory backend.
    use super::*;
    use crate::inbound::http::test_utils::{test_backend, TestBackend};
    use actix_web::http::header::AUTHORIZATION;
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
                web::scope("/api/v1")
                    .service(join)
                    .service(login)
                    .service(current_user)
                    .service(delete_account),
            )
    }

    #[actix_web::test]
    async fn join_login_me_round_trip() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;

        let join_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/join")
                .set_json(&JoinRequest {
                    username: "alice".to_owned(),
                    password: "s3cret".to_owned(),
                    email: "alice@example.com".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(join_res.status(), StatusCode::CREATED);

        let login_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/login")
                .set_json(&LoginRequest {
                    username: "alice".to_owned(),
                    password: "s3cret".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(login_res).await;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .expect("token in payload")
            .to_owned();
        assert!(body.get("expiresAt").is_some());

        let me_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/users/me")
                .insert_header((AUTHORIZATION, format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(me_res.status(), StatusCode::OK);
        let me: Value = actix_test::read_body_json(me_res).await;
        assert_eq!(me.get("nickname"), Some(&Value::from("alice")));
        assert_eq!(me.get("role"), Some(&Value::from("USER")));
    }

    #[actix_web::test]
    async fn join_rejects_blank_username_with_details() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/join")
                .set_json(&JoinRequest {
                    username: "   ".to_owned(),
                    password: "pw".to_owned(),
                    email: "a@b.c".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("details").and_then(|d| d.get("code")),
            Some(&Value::from("empty_username"))
        );
    }

    #[actix_web::test]
    async fn duplicate_join_is_a_conflict() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;
        let request = || JoinRequest {
            username: "alice".to_owned(),
            password: "pw".to_owned(),
            email: "alice@example.com".to_owned(),
        };

        let first = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/join")
                .set_json(&request())
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/join")
                .set_json(&request())
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn login_with_wrong_password_is_unauthorised() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/join")
                .set_json(&JoinRequest {
                    username: "alice".to_owned(),
                    password: "pw".to_owned(),
                    email: "alice@example.com".to_owned(),
                })
                .to_request(),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/login")
                .set_json(&LoginRequest {
                    username: "alice".to_owned(),
                    password: "wrong".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn me_without_token_is_unauthorised() {
        let backend = test_backend();
        let app = actix_test::init_service(app(&backend)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/users/me").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
