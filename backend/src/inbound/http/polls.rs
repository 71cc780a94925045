//! Poll API handlers.
//!
//! ```text
//! GET    /api/v1/polls
//! GET    /api/v1/polls/recent
//! GET    /api/v1/polls/{id}
//! POST   /api/v1/polls
//! PUT    /api/v1/polls/{id}
//! DELETE /api/v1/polls/{id}
//! POST   /api/v1/polls/vote
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::poll::{PollDraft, PollId, PollOptionId, PollUpdate};
use crate::domain::{Error, PollResponse, PollSummaryResponse};
use crate::inbound::http::auth::{AuthUser, MaybeUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Create-poll request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    /// Question shown to voters.
    pub title: String,
    /// Instant after which votes are rejected; must be in the future.
    pub expired_at: DateTime<Utc>,
    /// Option texts; at least two.
    pub options: Vec<String>,
}

/// Update-poll request body. An omitted expiry keeps the previous value.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePollRequest {
    /// Replacement question text.
    pub title: String,
    /// Replacement expiry; omit to keep the existing one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
    /// Replacement option texts; at least two.
    pub options: Vec<String>,
}

/// Vote request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// Option to vote for.
    pub option_id: i64,
}

fn parse_poll_id(raw: i64) -> ApiResult<PollId> {
    PollId::new(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

/// List open polls.
#[utoipa::path(
    get,
    path = "/api/v1/polls",
    responses(
        (status = 200, description = "Open polls", body = [PollSummaryResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["polls"],
    operation_id = "listPolls",
    security([])
)]
#[get("/polls")]
pub async fn list_polls(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<PollSummaryResponse>>> {
    Ok(web::Json(state.polls.list_open().await?))
}

/// List the ten open polls closest to expiry.
#[utoipa::path(
    get,
    path = "/api/v1/polls/recent",
    responses(
        (status = 200, description = "Soonest-expiring open polls", body = [PollSummaryResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["polls"],
    operation_id = "recentPolls",
    security([])
)]
#[get("/polls/recent")]
pub async fn recent_polls(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<PollSummaryResponse>>> {
    Ok(web::Json(state.polls.recent_open().await?))
}

/// Fetch one poll. Anonymous callers get `isVote`/`followed` as false.
#[utoipa::path(
    get,
    path = "/api/v1/polls/{id}",
    params(("id" = i64, Path, description = "Poll id")),
    responses(
        (status = 200, description = "Poll detail", body = PollResponse),
        (status = 404, description = "Poll not found", body = Error)
    ),
    tags = ["polls"],
    operation_id = "getPoll",
    security([])
)]
#[get("/polls/{id}")]
pub async fn get_poll(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    viewer: MaybeUser,
) -> ApiResult<web::Json<PollResponse>> {
    let id = parse_poll_id(path.into_inner())?;
    Ok(web::Json(state.polls.get_poll(id, viewer.0).await?))
}

/// Create a poll owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/polls",
    request_body = CreatePollRequest,
    responses(
        (status = 201, description = "Poll created", body = PollResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["polls"],
    operation_id = "createPoll"
)]
#[post("/polls")]
pub async fn create_poll(
    state: web::Data<HttpState>,
    user: AuthUser,
    payload: web::Json<CreatePollRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let draft = PollDraft::try_new(
        &payload.title,
        payload.expired_at,
        payload.options,
        Utc::now(),
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    let response = state.polls.create_poll(draft, user.0).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Update a poll; creator only. Replaces the entire option set.
#[utoipa::path(
    put,
    path = "/api/v1/polls/{id}",
    params(("id" = i64, Path, description = "Poll id")),
    request_body = UpdatePollRequest,
    responses(
        (status = 200, description = "Poll updated", body = PollResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not the creator", body = Error),
        (status = 404, description = "Poll not found", body = Error)
    ),
    tags = ["polls"],
    operation_id = "updatePoll"
)]
#[put("/polls/{id}")]
pub async fn update_poll(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    user: AuthUser,
    payload: web::Json<UpdatePollRequest>,
) -> ApiResult<web::Json<PollResponse>> {
    let id = parse_poll_id(path.into_inner())?;
    let payload = payload.into_inner();
    let update = PollUpdate::try_new(
        &payload.title,
        payload.expired_at,
        payload.options,
        Utc::now(),
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    Ok(web::Json(state.polls.update_poll(id, update, user.0).await?))
}

/// Delete a poll; creator only. Options and votes go with it.
#[utoipa::path(
    delete,
    path = "/api/v1/polls/{id}",
    params(("id" = i64, Path, description = "Poll id")),
    responses(
        (status = 204, description = "Poll deleted"),
        (status = 403, description = "Not the creator", body = Error),
        (status = 404, description = "Poll not found", body = Error)
    ),
    tags = ["polls"],
    operation_id = "deletePoll"
)]
#[delete("/polls/{id}")]
pub async fn delete_poll(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    user: AuthUser,
) -> ApiResult<HttpResponse> {
    let id = parse_poll_id(path.into_inner())?;
    state.polls.delete_poll(id, user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Cast a vote. One vote per user per poll.
#[utoipa::path(
    post,
    path = "/api/v1/polls/vote",
    request_body = VoteRequest,
    responses(
        (status = 204, description = "Vote recorded"),
        (status = 400, description = "Poll is closed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Option not found", body = Error),
        (status = 409, description = "Already voted", body = Error)
    ),
    tags = ["polls"],
    operation_id = "vote"
)]
#[post("/polls/vote")]
pub async fn vote(
    state: web::Data<HttpState>,
    user: AuthUser,
    payload: web::Json<VoteRequest>,
) -> ApiResult<HttpResponse> {
    let option = PollOptionId::new(payload.option_id)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    state.polls.vote(option, user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}
