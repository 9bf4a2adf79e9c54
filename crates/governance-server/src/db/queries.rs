//! SQL for every storage operation

use super::DbPool;
use crate::models::*;
use crate::storage::StorageError;

// ============================================================================
// USERS
// ============================================================================

pub async fn get_user(pool: &DbPool, id: i32) -> Result<Option<UserRow>, StorageError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, wallet_address, nonce FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn get_user_by_wallet_address(
    pool: &DbPool,
    wallet_address: &str,
) -> Result<Option<UserRow>, StorageError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, wallet_address, nonce FROM users WHERE wallet_address = $1",
    )
    .bind(wallet_address)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create_user(pool: &DbPool, user: &NewUser) -> Result<UserRow, StorageError> {
    sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (wallet_address, nonce) VALUES ($1, $2)
         RETURNING id, wallet_address, nonce",
    )
    .bind(&user.wallet_address)
    .bind(&user.nonce)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            StorageError::DuplicateWallet(user.wallet_address.clone())
        }
        other => StorageError::Database(other),
    })
}

// ============================================================================
// PROPOSALS
// ============================================================================

const PROPOSAL_COLUMNS: &str = "id, title, description, creator_id, status, created_at";

pub async fn get_proposals(pool: &DbPool) -> Result<Vec<ProposalRow>, StorageError> {
    let rows = sqlx::query_as::<_, ProposalRow>(&format!(
        "SELECT {PROPOSAL_COLUMNS} FROM proposals ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_proposal(pool: &DbPool, id: i32) -> Result<Option<ProposalRow>, StorageError> {
    let row = sqlx::query_as::<_, ProposalRow>(&format!(
        "SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create_proposal(
    pool: &DbPool,
    proposal: &NewProposal,
) -> Result<ProposalRow, StorageError> {
    let row = sqlx::query_as::<_, ProposalRow>(&format!(
        "INSERT INTO proposals (title, description, creator_id, status)
         VALUES ($1, $2, $3, $4)
         RETURNING {PROPOSAL_COLUMNS}"
    ))
    .bind(&proposal.title)
    .bind(&proposal.description)
    .bind(proposal.creator_id)
    .bind(proposal.status.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

// ============================================================================
// VOTES
// ============================================================================

const VOTE_COLUMNS: &str = "id, proposal_id, voter_id, support, weight::text AS weight";

pub async fn get_votes_by_proposal(
    pool: &DbPool,
    proposal_id: i32,
) -> Result<Vec<VoteRow>, StorageError> {
    let rows = sqlx::query_as::<_, VoteRow>(&format!(
        "SELECT {VOTE_COLUMNS} FROM votes WHERE proposal_id = $1 ORDER BY id"
    ))
    .bind(proposal_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn cast_vote(pool: &DbPool, vote: &NewVote) -> Result<VoteRow, StorageError> {
    let row = sqlx::query_as::<_, VoteRow>(&format!(
        "INSERT INTO votes (proposal_id, voter_id, support, weight)
         VALUES ($1, $2, $3, $4::numeric)
         RETURNING {VOTE_COLUMNS}"
    ))
    .bind(vote.proposal_id)
    .bind(vote.voter_id)
    .bind(vote.support)
    .bind(&vote.weight)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

// ============================================================================
// STAKES
// ============================================================================

const STAKE_COLUMNS: &str = "id, user_id, amount::text AS amount, staked_at";

pub async fn get_stakes_by_user(pool: &DbPool, user_id: i32) -> Result<Vec<StakeRow>, StorageError> {
    let rows = sqlx::query_as::<_, StakeRow>(&format!(
        "SELECT {STAKE_COLUMNS} FROM stakes WHERE user_id = $1 ORDER BY id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create_stake(pool: &DbPool, stake: &NewStake) -> Result<StakeRow, StorageError> {
    let row = sqlx::query_as::<_, StakeRow>(&format!(
        "INSERT INTO stakes (user_id, amount)
         VALUES ($1, $2::numeric)
         RETURNING {STAKE_COLUMNS}"
    ))
    .bind(stake.user_id)
    .bind(&stake.amount)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
