//! News, summary, and scrap API handlers.
//!
//! ```text
//! GET    /api/v1/news/gpt/main-summary
//! POST   /api/v1/news/gpt/refresh
//! GET    /api/v1/news/scraps
//! POST   /api/v1/news/{id}/scrap
//! DELETE /api/v1/news/{id}/scrap
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use serde_json::json;

use crate::domain::news::NewsId;
use crate::domain::user::Role;
use crate::domain::{Error, GptNewsSummaryResponse, ScrapResponse};
use crate::inbound::http::auth::AuthUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

fn parse_news_id(raw: i64) -> ApiResult<NewsId> {
    NewsId::new(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

/// GPT summaries of recent admin-authored articles, with fallback text.
#[utoipa::path(
    get,
    path = "/api/v1/news/gpt/main-summary",
    responses(
        (status = 200, description = "Summary rows", body = [GptNewsSummaryResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["news"],
    operation_id = "mainSummaries",
    security([])
)]
#[get("/news/gpt/main-summary")]
pub async fn main_summaries(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<GptNewsSummaryResponse>>> {
    Ok(web::Json(state.news.main_summaries().await?))
}

/// Generate missing summaries for recent admin articles. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/news/gpt/refresh",
    responses(
        (status = 200, description = "Number of summaries stored"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["news"],
    operation_id = "refreshSummaries"
)]
#[post("/news/gpt/refresh")]
pub async fn refresh_summaries(
    state: web::Data<HttpState>,
    user: AuthUser,
) -> ApiResult<HttpResponse> {
    let profile = state.users.profile(user.0).await?;
    if profile.role != Role::Admin {
        return Err(Error::forbidden("admin role required"));
    }
    let stored = state.news.refresh_summaries().await?;
    Ok(HttpResponse::Ok().json(json!({ "stored": stored })))
}

/// The caller's scrapped articles.
#[utoipa::path(
    get,
    path = "/api/v1/news/scraps",
    responses(
        (status = 200, description = "Scrap rows", body = [ScrapResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["news"],
    operation_id = "listScraps"
)]
#[get("/news/scraps")]
pub async fn list_scraps(
    state: web::Data<HttpState>,
    user: AuthUser,
) -> ApiResult<web::Json<Vec<ScrapResponse>>> {
    Ok(web::Json(state.news.scrap_list(user.0).await?))
}

/// Bookmark an article.
#[utoipa::path(
    post,
    path = "/api/v1/news/{id}/scrap",
    params(("id" = i64, Path, description = "Article id")),
    responses(
        (status = 204, description = "Scrapped"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Article not found", body = Error),
        (status = 409, description = "Already scrapped", body = Error)
    ),
    tags = ["news"],
    operation_id = "scrap"
)]
#[post("/news/{id}/scrap")]
pub async fn scrap(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    user: AuthUser,
) -> ApiResult<HttpResponse> {
    let id = parse_news_id(path.into_inner())?;
    state.news.scrap(user.0, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a bookmark.
#[utoipa::path(
    delete,
    path = "/api/v1/news/{id}/scrap",
    params(("id" = i64, Path, description = "Article id")),
    responses(
        (status = 204, description = "Scrap removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Scrap not found", body = Error)
    ),
    tags = ["news"],
    operation_id = "unscrap"
)]
#[delete("/news/{id}/scrap")]
pub async fn unscrap(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    user: AuthUser,
) -> ApiResult<HttpResponse> {
    let id = parse_news_id(path.into_inner())?;
    state.news.unscrap(user.0, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Handler tests over the in-memory backend.
    use super::*;
    use crate::domain::news::SUMMARY_FALLBACK;
    use crate::inbound::http::test_utils::{issue_token_for, test_backend, TestBackend};
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
                    .service(main_summaries)
                    .service(refresh_summaries)
                    .service(list_scraps)
                    .service(scrap)
                    .service(unscrap),
            )
    }

    #[actix_web::test]
    async fn main_summaries_fall_back_without_stored_summary() {
        let backend = test_backend();
        let desk = backend.users.seed(1, "desk", Role::Admin);
        backend.news.seed_article(1, "Bare headline", &desk);
        let app = actix_test::init_service(app(&backend)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/news/gpt/main-summary")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let rows = body.as_array().expect("array body");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("summary"), Some(&Value::from(SUMMARY_FALLBACK)));
    }

    #[actix_web::test]
    async fn refresh_requires_admin_role() {
        let backend = test_backend();
        backend.users.seed(1, "reader", Role::User);
        let token = issue_token_for(&backend.state, 1).await;
        let app = actix_test::init_service(app(&backend)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/news/gpt/refresh")
                .insert_header((AUTHORIZATION, format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn refresh_stores_missing_summaries_for_admins() {
        let backend = test_backend();
        let desk = backend.users.seed(1, "desk", Role::Admin);
        backend.news.seed_article(1, "Fresh", &desk);
        let token = issue_token_for(&backend.state, 1).await;
        let app = actix_test::init_service(app(&backend)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/news/gpt/refresh")
                .insert_header((AUTHORIZATION, format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("stored"), Some(&Value::from(1)));

        let summaries = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/news/gpt/main-summary")
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(summaries).await;
        let rows = body.as_array().expect("array body");
        assert_eq!(rows[0].get("summary"), Some(&Value::from("Summary of Fresh")));
    }

    #[actix_web::test]
    async fn scrap_flow_round_trips() {
        let backend = test_backend();
        let desk = backend.users.seed(1, "desk", Role::Admin);
        backend.users.seed(2, "reader", Role::User);
        backend.news.seed_article(1, "Headline", &desk);
        let token = issue_token_for(&backend.state, 2).await;
        let app = actix_test::init_service(app(&backend)).await;
        let authed = |req: actix_test::TestRequest| {
            req.insert_header((AUTHORIZATION, format!("Bearer {token}")))
        };

        let res = actix_test::call_service(
            &app,
            authed(actix_test::TestRequest::post().uri("/api/v1/news/1/scrap")).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let duplicate = actix_test::call_service(
            &app,
            authed(actix_test::TestRequest::post().uri("/api/v1/news/1/scrap")).to_request(),
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let removed = actix_test::call_service(
            &app,
            authed(actix_test::TestRequest::delete().uri("/api/v1/news/1/scrap")).to_request(),
        )
        .await;
        assert_eq!(removed.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn scrapping_missing_article_is_not_found() {
        let backend = test_backend();
        backend.users.seed(2, "reader", Role::User);
        let token = issue_token_for(&backend.state, 2).await;
        let app = actix_test::init_service(app(&backend)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/news/9/scrap")
                .insert_header((AUTHORIZATION, format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
