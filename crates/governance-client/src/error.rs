use stackwave_contract::{DecimalError, Operation, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-success status. The server's error body is not read.
    #[error("{message}")]
    Failed {
        operation: Operation,
        status: u16,
        message: &'static str,
    },
    /// Request body rejected locally, before anything was sent.
    #[error("{0}")]
    InvalidInput(#[from] ValidationError),
    #[error("{operation} returned a body that does not match the contract: {source}")]
    InvalidResponse {
        operation: Operation,
        source: ValidationError,
    },
    #[error("{operation} returned undeclared status {status}")]
    UndeclaredStatus { operation: Operation, status: u16 },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Arithmetic(#[from] DecimalError),
}

impl ClientError {
    /// HTTP status for `Failed`, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Failed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Generic message reported when `operation` comes back non-success.
pub fn failure_message(operation: Operation) -> &'static str {
    match operation {
        Operation::AuthNonce => "Failed to fetch nonce",
        Operation::AuthVerify => "Failed to authenticate wallet",
        Operation::AuthMe => "Failed to fetch user",
        Operation::AuthLogout => "Logout failed",
        Operation::ProposalsList => "Failed to fetch proposals",
        Operation::ProposalsCreate => "Failed to create proposal",
        Operation::VotesListByProposal => "Failed to fetch votes",
        Operation::VotesCast => "Failed to cast vote",
        Operation::StakingMe => "Failed to fetch staking data",
        Operation::StakingStake => "Failed to stake tokens",
        Operation::AnalyticsGet => "Failed to fetch analytics",
    }
}
