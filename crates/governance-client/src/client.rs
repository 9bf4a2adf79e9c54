//! Data hooks over the governance API
//!
//! Every call is driven by the route contract: the path comes from the
//! operation's `RouteDef`, request bodies are checked against its input rule
//! before sending, and success bodies are checked against the response rule
//! declared for the returned status before decoding.

use crate::cache::QueryCache;
use crate::error::{failure_message, ClientError};
use crate::wallet::{mock_signature, mock_wallet_address};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use stackwave_contract::{
    build_url, validate_response, AnalyticsResponse, CastVoteRequest, CreateProposalRequest,
    LogoutResponse, Method, NonceResponse, Operation, Proposal, Stake, StakeRequest,
    StakingStatus, User, VerifyRequest, VerifyResponse, Vote, VoteTally,
};
use tracing::{debug, info};

/// What a read resolves to when the server answers non-success.
#[derive(Debug, Clone, Copy)]
enum OnFailure {
    Error,
    /// Any non-success becomes `null`.
    Null,
    /// Only this status becomes `null`; anything else is an error.
    NullOn(StatusCode),
}

#[derive(Debug)]
pub struct GovernanceClient {
    base_url: String,
    http: reqwest::Client,
    cache: QueryCache,
}

impl GovernanceClient {
    /// Client with its own cookie jar, so the session cookie set by
    /// `login` rides along on every later call.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            cache: QueryCache::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn path(operation: Operation) -> &'static str {
        operation.route().path
    }

    fn votes_path(proposal_id: i32) -> String {
        build_url(
            Self::path(Operation::VotesListByProposal),
            &[("proposalId", proposal_id)],
        )
    }

    // ========================================================================
    // TRANSPORT
    // ========================================================================

    async fn request(
        &self,
        operation: Operation,
        path: &str,
        body: Option<&Value>,
        on_failure: OnFailure,
    ) -> Result<Value, ClientError> {
        let def = operation.route();
        if let Some(body) = body {
            def.validate_input(body)?;
        }

        let url = format!("{}{}", self.base_url, path);
        let mut req = match def.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            debug!("{} {} -> {}", def.method.as_str(), path, status);
            return match on_failure {
                OnFailure::Null => Ok(Value::Null),
                OnFailure::NullOn(expected) if status == expected => Ok(Value::Null),
                _ => Err(ClientError::Failed {
                    operation,
                    status: status.as_u16(),
                    message: failure_message(operation),
                }),
            };
        }

        let value: Value = resp.json().await?;
        let rule = def
            .response_rule(status.as_u16())
            .ok_or(ClientError::UndeclaredStatus {
                operation,
                status: status.as_u16(),
            })?;
        validate_response(rule, &value)
            .map_err(|source| ClientError::InvalidResponse { operation, source })?;
        Ok(value)
    }

    /// Cached read keyed by `path`.
    async fn query<T: DeserializeOwned>(
        &self,
        operation: Operation,
        path: &str,
        on_failure: OnFailure,
    ) -> Result<T, ClientError> {
        let value = self
            .cache
            .get_or_fetch(path, || self.request(operation, path, None, on_failure))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn mutate<B, T>(&self, operation: Operation, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let value = self
            .request(operation, path, Some(&body), OnFailure::Error)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    // ========================================================================
    // AUTH
    // ========================================================================

    /// Fresh nonce; never cached.
    pub async fn nonce(&self) -> Result<String, ClientError> {
        let value = self
            .request(
                Operation::AuthNonce,
                Self::path(Operation::AuthNonce),
                None,
                OnFailure::Error,
            )
            .await?;
        let resp: NonceResponse = serde_json::from_value(value)?;
        Ok(resp.nonce)
    }

    pub async fn login(&self, wallet_address: &str, signature: &str) -> Result<User, ClientError> {
        let resp: VerifyResponse = self
            .mutate(
                Operation::AuthVerify,
                Self::path(Operation::AuthVerify),
                &VerifyRequest {
                    wallet_address: wallet_address.to_string(),
                    signature: signature.to_string(),
                },
            )
            .await?;
        self.cache.invalidate(Self::path(Operation::AuthMe));
        self.cache.invalidate(Self::path(Operation::StakingMe));
        info!("Signed in as {}", resp.user.wallet_address);
        Ok(resp.user)
    }

    /// Sign in with a random mock address and signature.
    pub async fn login_with_mock_wallet(&self) -> Result<User, ClientError> {
        self.login(&mock_wallet_address(), &mock_signature()).await
    }

    /// The signed-in user; `None` when signed out or on any failure status.
    pub async fn me(&self) -> Result<Option<User>, ClientError> {
        self.query(
            Operation::AuthMe,
            Self::path(Operation::AuthMe),
            OnFailure::Null,
        )
        .await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let _: LogoutResponse = self
            .mutate(
                Operation::AuthLogout,
                Self::path(Operation::AuthLogout),
                &serde_json::json!({}),
            )
            .await?;
        self.cache.invalidate_all();
        self.cache.set(Self::path(Operation::AuthMe), Value::Null);
        info!("Signed out");
        Ok(())
    }

    // ========================================================================
    // PROPOSALS & VOTES
    // ========================================================================

    pub async fn proposals(&self) -> Result<Vec<Proposal>, ClientError> {
        self.query(
            Operation::ProposalsList,
            Self::path(Operation::ProposalsList),
            OnFailure::Error,
        )
        .await
    }

    pub async fn create_proposal(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Proposal, ClientError> {
        let proposal: Proposal = self
            .mutate(
                Operation::ProposalsCreate,
                Self::path(Operation::ProposalsCreate),
                &CreateProposalRequest {
                    title: title.to_string(),
                    description: description.to_string(),
                },
            )
            .await?;
        self.cache.invalidate(Self::path(Operation::ProposalsList));
        Ok(proposal)
    }

    pub async fn votes(&self, proposal_id: i32) -> Result<Vec<Vote>, ClientError> {
        self.query(
            Operation::VotesListByProposal,
            &Self::votes_path(proposal_id),
            OnFailure::Error,
        )
        .await
    }

    pub async fn cast_vote(
        &self,
        proposal_id: i32,
        support: bool,
        weight: &str,
    ) -> Result<Vote, ClientError> {
        let path = build_url(
            Self::path(Operation::VotesCast),
            &[("proposalId", proposal_id)],
        );
        let vote: Vote = self
            .mutate(
                Operation::VotesCast,
                &path,
                &CastVoteRequest {
                    support,
                    weight: weight.to_string(),
                },
            )
            .await?;
        self.cache.invalidate(&Self::votes_path(proposal_id));
        self.cache.invalidate(Self::path(Operation::ProposalsList));
        Ok(vote)
    }

    /// For/against totals over the (cached) vote list.
    pub async fn vote_tally(&self, proposal_id: i32) -> Result<VoteTally, ClientError> {
        let votes = self.votes(proposal_id).await?;
        Ok(VoteTally::from_votes(&votes)?)
    }

    // ========================================================================
    // STAKING & ANALYTICS
    // ========================================================================

    /// Caller's staking status; `None` when not signed in.
    pub async fn staking(&self) -> Result<Option<StakingStatus>, ClientError> {
        self.query(
            Operation::StakingMe,
            Self::path(Operation::StakingMe),
            OnFailure::NullOn(StatusCode::UNAUTHORIZED),
        )
        .await
    }

    pub async fn stake(&self, amount: &str) -> Result<Stake, ClientError> {
        let stake: Stake = self
            .mutate(
                Operation::StakingStake,
                Self::path(Operation::StakingStake),
                &StakeRequest {
                    amount: amount.to_string(),
                },
            )
            .await?;
        self.cache.invalidate(Self::path(Operation::StakingMe));
        Ok(stake)
    }

    pub async fn analytics(&self) -> Result<AnalyticsResponse, ClientError> {
        self.query(
            Operation::AnalyticsGet,
            Self::path(Operation::AnalyticsGet),
            OnFailure::Error,
        )
        .await
    }
}
