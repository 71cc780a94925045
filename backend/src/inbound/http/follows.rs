//! Follow API handlers.
//!
//! ```text
//! POST   /api/v1/users/{id}/follow
//! DELETE /api/v1/users/{id}/follow
//! ```

use actix_web::{delete, post, web, HttpResponse};

use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::auth::AuthUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

fn parse_user_id(raw: i64) -> ApiResult<UserId> {
    UserId::new(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

/// Follow another user.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/follow",
    params(("id" = i64, Path, description = "User to follow")),
    responses(
        (status = 204, description = "Now following"),
        (status = 400, description = "Self-follow", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 409, description = "Already following", body = Error)
    ),
    tags = ["follows"],
    operation_id = "follow"
)]
#[post("/users/{id}/follow")]
pub async fn follow(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    user: AuthUser,
) -> ApiResult<HttpResponse> {
    let following = parse_user_id(path.into_inner())?;
    state.follows.follow(user.0, following).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Stop following another user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/follow",
    params(("id" = i64, Path, description = "User to unfollow")),
    responses(
        (status = 204, description = "No longer following"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Relationship not found", body = Error)
    ),
    tags = ["follows"],
    operation_id = "unfollow"
)]
#[delete("/users/{id}/follow")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    user: AuthUser,
) -> ApiResult<HttpResponse> {
    let following = parse_user_id(path.into_inner())?;
    state.follows.unfollow(user.0, following).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Handler tests over the in-memory backend.
    use super::*;
    use crate::domain::user::Role;
    use crate::inbound::http::test_utils::{issue_token_for, test_backend, TestBackend};
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};

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
            .service(web::scope("/api/v1").service(follow).service(unfollow))
    }

    async fn send(
        app: &impl actix_web::dev::Service<
            actix_web::dev::ServiceRequest,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        method: actix_web::http::Method,
        uri: &str,
        token: &str,
    ) -> actix_web::dev::ServiceResponse {
        let request = actix_test::TestRequest::default()
            .method(method)
            .uri(uri)
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        actix_test::call_service(app, request).await
    }

    #[actix_web::test]
    async fn follow_then_unfollow_round_trips() {
        let backend = test_backend();
        backend.users.seed(1, "reader", Role::User);
        backend.users.seed(2, "editor", Role::User);
        let token = issue_token_for(&backend.state, 1).await;
        let app = actix_test::init_service(app(&backend)).await;

        let res = send(
            &app,
            actix_web::http::Method::POST,
            "/api/v1/users/2/follow",
            &token,
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let duplicate = send(
            &app,
            actix_web::http::Method::POST,
            "/api/v1/users/2/follow",
            &token,
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let undo = send(
            &app,
            actix_web::http::Method::DELETE,
            "/api/v1/users/2/follow",
            &token,
        )
        .await;
        assert_eq!(undo.status(), StatusCode::NO_CONTENT);

        let missing = send(
            &app,
            actix_web::http::Method::DELETE,
            "/api/v1/users/2/follow",
            &token,
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn self_follow_is_a_bad_request() {
        let backend = test_backend();
        backend.users.seed(1, "reader", Role::User);
        let token = issue_token_for(&backend.state, 1).await;
        let app = actix_test::init_service(app(&backend)).await;

        let res = send(
            &app,
            actix_web::http::Method::POST,
            "/api/v1/users/1/follow",
            &token,
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
