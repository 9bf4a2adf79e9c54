//! Storage repository
//!
//! One method per read or write. Each is a single-table query or a single-row
//! insert; there is no update, no delete, no cross-table transaction and no
//! caching. Absence is `None` / an empty `Vec`, never an error.
//!
//! Two backends implement the trait:
//! - `PgStorage` (see `db`): PostgreSQL through a `sqlx` pool
//! - `MemoryStorage`: process-local tables for development and tests

use crate::models::{
    NewProposal, NewStake, NewUser, NewVote, ProposalRow, StakeRow, UserRow, VoteRow,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use stackwave_contract::schema::UnknownStatus;
use stackwave_contract::{canonical_decimal, DecimalError};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("wallet address already registered: {0}")]
    DuplicateWallet(String),
    #[error("corrupt row: {0}")]
    CorruptRow(#[from] UnknownStatus),
    #[error("invalid numeric value: {0}")]
    InvalidDecimal(#[from] DecimalError),
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: i32) -> Result<Option<UserRow>, StorageError>;

    async fn get_user_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<UserRow>, StorageError>;

    async fn create_user(&self, user: NewUser) -> Result<UserRow, StorageError>;

    /// All proposals in insertion order.
    async fn get_proposals(&self) -> Result<Vec<ProposalRow>, StorageError>;

    async fn get_proposal(&self, id: i32) -> Result<Option<ProposalRow>, StorageError>;

    async fn create_proposal(&self, proposal: NewProposal) -> Result<ProposalRow, StorageError>;

    async fn get_votes_by_proposal(&self, proposal_id: i32) -> Result<Vec<VoteRow>, StorageError>;

    async fn cast_vote(&self, vote: NewVote) -> Result<VoteRow, StorageError>;

    /// A user's stakes in insertion order.
    async fn get_stakes_by_user(&self, user_id: i32) -> Result<Vec<StakeRow>, StorageError>;

    async fn create_stake(&self, stake: NewStake) -> Result<StakeRow, StorageError>;
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRow>,
    proposals: Vec<ProposalRow>,
    votes: Vec<VoteRow>,
    stakes: Vec<StakeRow>,
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len).map(|n| n + 1).unwrap_or(i32::MAX)
}

/// In-process tables with serial ids. Enforces the same unique wallet
/// address constraint as the relational schema and stores decimals in the
/// text form a `NUMERIC` column returns.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user(&self, id: i32) -> Result<Option<UserRow>, StorageError> {
        Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<UserRow>, StorageError> {
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .find(|u| u.wallet_address == wallet_address)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRow, StorageError> {
        let mut tables = self.tables.write();
        if tables
            .users
            .iter()
            .any(|u| u.wallet_address == user.wallet_address)
        {
            return Err(StorageError::DuplicateWallet(user.wallet_address));
        }
        let row = UserRow {
            id: next_id(tables.users.len()),
            wallet_address: user.wallet_address,
            nonce: user.nonce,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn get_proposals(&self) -> Result<Vec<ProposalRow>, StorageError> {
        Ok(self.tables.read().proposals.clone())
    }

    async fn get_proposal(&self, id: i32) -> Result<Option<ProposalRow>, StorageError> {
        Ok(self
            .tables
            .read()
            .proposals
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn create_proposal(&self, proposal: NewProposal) -> Result<ProposalRow, StorageError> {
        let mut tables = self.tables.write();
        let row = ProposalRow {
            id: next_id(tables.proposals.len()),
            title: proposal.title,
            description: proposal.description,
            creator_id: proposal.creator_id,
            status: proposal.status.as_str().to_string(),
            created_at: Utc::now(),
        };
        tables.proposals.push(row.clone());
        Ok(row)
    }

    async fn get_votes_by_proposal(&self, proposal_id: i32) -> Result<Vec<VoteRow>, StorageError> {
        Ok(self
            .tables
            .read()
            .votes
            .iter()
            .filter(|v| v.proposal_id == proposal_id)
            .cloned()
            .collect())
    }

    async fn cast_vote(&self, vote: NewVote) -> Result<VoteRow, StorageError> {
        let weight = canonical_decimal(&vote.weight)?;
        let mut tables = self.tables.write();
        let row = VoteRow {
            id: next_id(tables.votes.len()),
            proposal_id: vote.proposal_id,
            voter_id: vote.voter_id,
            support: vote.support,
            weight,
        };
        tables.votes.push(row.clone());
        Ok(row)
    }

    async fn get_stakes_by_user(&self, user_id: i32) -> Result<Vec<StakeRow>, StorageError> {
        Ok(self
            .tables
            .read()
            .stakes
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_stake(&self, stake: NewStake) -> Result<StakeRow, StorageError> {
        let amount = canonical_decimal(&stake.amount)?;
        let mut tables = self.tables.write();
        let row = StakeRow {
            id: next_id(tables.stakes.len()),
            user_id: stake.user_id,
            amount,
            staked_at: Utc::now(),
        };
        tables.stakes.push(row.clone());
        Ok(row)
    }
}
