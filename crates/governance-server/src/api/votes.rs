//! Votes API handlers

use crate::error::ApiResult;
use crate::extract::{CurrentUser, ValidatedJson};
use crate::models::NewVote;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use stackwave_contract::{CastVoteRequest, ValidationError, Vote};
use std::sync::Arc;
use tracing::info;

/// Parse the `:proposalId` path segment.
pub fn parse_proposal_id(raw: &str) -> Result<i32, ValidationError> {
    raw.parse::<i32>()
        .map_err(|_| ValidationError::for_field("proposalId", "Invalid proposalId"))
}

/// GET /api/proposals/:proposalId/votes
pub async fn list_votes(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Vec<Vote>>> {
    let proposal_id = parse_proposal_id(&raw_id)?;
    let votes = state
        .storage
        .get_votes_by_proposal(proposal_id)
        .await?
        .into_iter()
        .map(Vote::from)
        .collect();
    Ok(Json(votes))
}

/// POST /api/proposals/:proposalId/votes
///
/// The proposal is not looked up; a vote on an unknown id is stored as-is.
pub async fn cast_vote(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CastVoteRequest>,
) -> ApiResult<(StatusCode, Json<Vote>)> {
    let proposal_id = parse_proposal_id(&raw_id)?;
    let row = state
        .storage
        .cast_vote(NewVote {
            proposal_id,
            voter_id: user.user_id,
            support: req.support,
            weight: req.weight,
        })
        .await?;

    info!(
        "User {} voted {} on proposal {} with weight {}",
        user.user_id,
        if row.support { "for" } else { "against" },
        proposal_id,
        row.weight
    );

    Ok((StatusCode::CREATED, Json(row.into())))
}
