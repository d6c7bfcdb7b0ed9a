// HTTP request handlers
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use votes_shared::types::{CounterAudit, Rating, TargetSelector, TargetView, VotedTargetView};

use crate::errors::ApiError;
use crate::server::identity::Caller;
use crate::server::state::AppState;

/// Body of `POST /vote`.
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub rating: Rating,
    #[serde(default)]
    pub text: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Cast or replace the caller's vote on the target named in the query string.
pub async fn cast_vote(
    State(state): State<AppState>,
    Caller(voter_id): Caller,
    query: Result<Query<TargetSelector>, QueryRejection>,
    body: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VotedTargetView>), ApiError> {
    let Query(selector) = query?;
    let Json(request) = body?;

    let voted = state
        .service
        .cast_vote(voter_id, &selector, request.rating, request.text)
        .await?;
    Ok((StatusCode::CREATED, Json(voted)))
}

/// The target's counters together with the caller's own vote.
pub async fn get_vote(
    State(state): State<AppState>,
    Caller(voter_id): Caller,
    query: Result<Query<TargetSelector>, QueryRejection>,
) -> Result<Json<TargetView>, ApiError> {
    let Query(selector) = query?;
    let view = state.service.target_view(voter_id, &selector).await?;
    Ok(Json(view))
}

/// Withdraw the caller's vote.
pub async fn retract_vote(
    State(state): State<AppState>,
    Caller(voter_id): Caller,
    query: Result<Query<TargetSelector>, QueryRejection>,
) -> Result<Json<TargetView>, ApiError> {
    let Query(selector) = query?;
    let view = state.service.retract_vote(voter_id, &selector).await?;
    Ok(Json(view))
}

/// Compare stored counters with the ledger.
pub async fn audit_vote(
    State(state): State<AppState>,
    _caller: Caller,
    query: Result<Query<TargetSelector>, QueryRejection>,
) -> Result<Json<CounterAudit>, ApiError> {
    let Query(selector) = query?;
    let audit = state.service.audit_target(&selector).await?;
    Ok(Json(audit))
}
