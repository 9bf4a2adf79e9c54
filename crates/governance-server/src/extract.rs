//! Request extractors: session cookie, authenticated user, validated body.
//!
//! Handlers list `CurrentUser` before `ValidatedJson`, so the session gate
//! always runs before input validation.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use stackwave_contract::{
    CastVoteRequest, CreateProposalRequest, Operation, StakeRequest, ValidationError,
    VerifyRequest,
};
use std::convert::Infallible;
use std::sync::Arc;

/// Find a cookie value in a `Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Session token carried by the request, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct SessionToken(pub Option<String>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| cookie_value(value, &state.config.cookie_name))
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        Ok(SessionToken(token))
    }
}

/// The authenticated user. Rejects with 401 when there is no live session.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i32,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let SessionToken(token) = match SessionToken::from_request_parts(parts, state).await {
            Ok(token) => token,
            Err(never) => match never {},
        };
        let token = token.ok_or(ApiError::Unauthorized)?;
        let user_id = state
            .sessions
            .user_id(&token)
            .await
            .ok_or(ApiError::Unauthorized)?;
        Ok(CurrentUser { user_id, token })
    }
}

/// Request bodies bound to the operation whose input rule validates them.
pub trait ContractInput: DeserializeOwned {
    const OPERATION: Operation;
}

impl ContractInput for VerifyRequest {
    const OPERATION: Operation = Operation::AuthVerify;
}

impl ContractInput for CreateProposalRequest {
    const OPERATION: Operation = Operation::ProposalsCreate;
}

impl ContractInput for CastVoteRequest {
    const OPERATION: Operation = Operation::VotesCast;
}

impl ContractInput for StakeRequest {
    const OPERATION: Operation = Operation::StakingStake;
}

/// JSON body checked against its operation's input rule before decoding.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: ContractInput,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|_| ValidationError::new("Invalid JSON body"))?;
        T::OPERATION.route().validate_input(&body)?;
        let value = serde_json::from_value(body)
            .map_err(|e| ValidationError::new(format!("Invalid request body: {}", e)))?;
        Ok(ValidatedJson(value))
    }
}
