//! Proposals API handlers

use crate::error::ApiResult;
use crate::extract::{CurrentUser, ValidatedJson};
use crate::models::NewProposal;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use stackwave_contract::{CreateProposalRequest, Proposal, ProposalStatus};
use std::sync::Arc;
use tracing::info;

/// GET /api/proposals - all proposals, oldest first
pub async fn list_proposals(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Proposal>>> {
    let proposals = state
        .storage
        .get_proposals()
        .await?
        .into_iter()
        .map(Proposal::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(proposals))
}

/// POST /api/proposals
pub async fn create_proposal(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateProposalRequest>,
) -> ApiResult<(StatusCode, Json<Proposal>)> {
    let row = state
        .storage
        .create_proposal(NewProposal {
            title: req.title,
            description: req.description,
            creator_id: user.user_id,
            status: ProposalStatus::Active,
        })
        .await?;

    info!("User {} created proposal {}: {}", user.user_id, row.id, row.title);

    Ok((StatusCode::CREATED, Json(Proposal::try_from(row)?)))
}
