//! Persisted row types and their mapping onto the API DTOs.

use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use stackwave_contract::{Proposal, ProposalStatus, Stake, User, Vote};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub wallet_address: String,
    pub nonce: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ProposalRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub creator_id: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct VoteRow {
    pub id: i32,
    pub proposal_id: i32,
    pub voter_id: i32,
    pub support: bool,
    /// `NUMERIC` column read back as text.
    pub weight: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StakeRow {
    pub id: i32,
    pub user_id: i32,
    /// `NUMERIC` column read back as text.
    pub amount: String,
    pub staked_at: DateTime<Utc>,
}

// ============================================================================
// INSERTS
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewUser {
    pub wallet_address: String,
    pub nonce: String,
}

#[derive(Debug, Clone)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub creator_id: i32,
    pub status: ProposalStatus,
}

#[derive(Debug, Clone)]
pub struct NewVote {
    pub proposal_id: i32,
    pub voter_id: i32,
    pub support: bool,
    pub weight: String,
}

#[derive(Debug, Clone)]
pub struct NewStake {
    pub user_id: i32,
    pub amount: String,
}

// ============================================================================
// ROW -> DTO
// ============================================================================

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            wallet_address: row.wallet_address,
            nonce: row.nonce,
        }
    }
}

impl TryFrom<ProposalRow> for Proposal {
    type Error = StorageError;

    fn try_from(row: ProposalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            creator_id: row.creator_id,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

impl From<VoteRow> for Vote {
    fn from(row: VoteRow) -> Self {
        Self {
            id: row.id,
            proposal_id: row.proposal_id,
            voter_id: row.voter_id,
            support: row.support,
            weight: row.weight,
        }
    }
}

impl From<StakeRow> for Stake {
    fn from(row: StakeRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            staked_at: row.staked_at,
        }
    }
}
