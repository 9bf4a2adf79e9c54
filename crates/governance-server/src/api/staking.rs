//! Staking API handlers

use crate::error::ApiResult;
use crate::extract::{CurrentUser, ValidatedJson};
use crate::models::NewStake;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use stackwave_contract::{format_decimal, sum_decimal_strings, Stake, StakeRequest, StakingStatus};
use std::sync::Arc;
use tracing::info;

/// GET /api/staking/me - the caller's stakes and their exact total
pub async fn my_staking(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<StakingStatus>> {
    let rows = state.storage.get_stakes_by_user(user.user_id).await?;
    let total = sum_decimal_strings(rows.iter().map(|s| s.amount.as_str()))?;
    Ok(Json(StakingStatus {
        total_staked: format_decimal(total),
        stakes: rows.into_iter().map(Stake::from).collect(),
    }))
}

/// POST /api/staking
pub async fn stake(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<StakeRequest>,
) -> ApiResult<(StatusCode, Json<Stake>)> {
    let row = state
        .storage
        .create_stake(NewStake {
            user_id: user.user_id,
            amount: req.amount,
        })
        .await?;
    info!("User {} staked {}", user.user_id, row.amount);
    Ok((StatusCode::CREATED, Json(row.into())))
}
