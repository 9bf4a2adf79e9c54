//! Wallet authentication handlers
//!
//! Sign-in is mocked: `verify` trusts the submitted wallet address and never
//! checks the signature.

use crate::error::ApiResult;
use crate::extract::{CurrentUser, SessionToken, ValidatedJson};
use crate::models::NewUser;
use crate::state::AppState;
use axum::{extract::State, http::header, response::IntoResponse, Json};
use stackwave_contract::{LogoutResponse, NonceResponse, User, VerifyRequest, VerifyResponse};
use std::sync::Arc;
use tracing::{debug, info};

pub fn generate_nonce() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// GET /api/auth/nonce
pub async fn nonce() -> Json<NonceResponse> {
    Json(NonceResponse {
        nonce: generate_nonce(),
    })
}

/// POST /api/auth/verify - sign in (or register) a wallet and start a session
pub async fn verify(
    State(state): State<Arc<AppState>>,
    SessionToken(previous): SessionToken,
    ValidatedJson(req): ValidatedJson<VerifyRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(previous) = previous {
        if state.sessions.destroy(&previous).await {
            debug!("Replaced existing session");
        }
    }

    let user = match state
        .storage
        .get_user_by_wallet_address(&req.wallet_address)
        .await?
    {
        Some(user) => user,
        None => {
            let user = state
                .storage
                .create_user(NewUser {
                    wallet_address: req.wallet_address.clone(),
                    nonce: generate_nonce(),
                })
                .await?;
            info!("Registered wallet {} as user {}", user.wallet_address, user.id);
            user
        }
    };

    let token = state.sessions.create(user.id).await;
    info!("User {} signed in", user.id);

    Ok((
        [(header::SET_COOKIE, state.session_cookie(&token))],
        Json(VerifyResponse { user: user.into() }),
    ))
}

/// GET /api/auth/me - the signed-in user, or `null`
pub async fn me(
    State(state): State<Arc<AppState>>,
    SessionToken(token): SessionToken,
) -> ApiResult<Json<Option<User>>> {
    let Some(token) = token else {
        return Ok(Json(None));
    };
    let Some(user_id) = state.sessions.user_id(&token).await else {
        return Ok(Json(None));
    };
    let user = state.storage.get_user(user_id).await?;
    Ok(Json(user.map(User::from)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    state.sessions.destroy(&user.token).await;
    info!("User {} signed out", user.user_id);
    Ok((
        [(header::SET_COOKIE, state.clear_cookie())],
        Json(LogoutResponse { success: true }),
    ))
}
