//! PostgreSQL backend

pub mod queries;

use crate::models::*;
use crate::storage::{Storage, StorageError};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub type DbPool = sqlx::PgPool;

/// DDL for all four tables; every statement is `IF NOT EXISTS`.
pub const SCHEMA: &str = include_str!("../../sql/schema.sql");

pub async fn connect(database_url: &str, max_connections: u32) -> Result<DbPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    info!("Connected to PostgreSQL (max {} connections)", max_connections);
    Ok(pool)
}

pub async fn init_schema(pool: &DbPool) -> Result<(), StorageError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("Database schema initialized");
    Ok(())
}

pub struct PgStorage {
    pool: DbPool,
}

impl PgStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user(&self, id: i32) -> Result<Option<UserRow>, StorageError> {
        queries::get_user(&self.pool, id).await
    }

    async fn get_user_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<UserRow>, StorageError> {
        queries::get_user_by_wallet_address(&self.pool, wallet_address).await
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRow, StorageError> {
        queries::create_user(&self.pool, &user).await
    }

    async fn get_proposals(&self) -> Result<Vec<ProposalRow>, StorageError> {
        queries::get_proposals(&self.pool).await
    }

    async fn get_proposal(&self, id: i32) -> Result<Option<ProposalRow>, StorageError> {
        queries::get_proposal(&self.pool, id).await
    }

    async fn create_proposal(&self, proposal: NewProposal) -> Result<ProposalRow, StorageError> {
        queries::create_proposal(&self.pool, &proposal).await
    }

    async fn get_votes_by_proposal(&self, proposal_id: i32) -> Result<Vec<VoteRow>, StorageError> {
        queries::get_votes_by_proposal(&self.pool, proposal_id).await
    }

    async fn cast_vote(&self, vote: NewVote) -> Result<VoteRow, StorageError> {
        queries::cast_vote(&self.pool, &vote).await
    }

    async fn get_stakes_by_user(&self, user_id: i32) -> Result<Vec<StakeRow>, StorageError> {
        queries::get_stakes_by_user(&self.pool, user_id).await
    }

    async fn create_stake(&self, stake: NewStake) -> Result<StakeRow, StorageError> {
        queries::create_stake(&self.pool, &stake).await
    }
}
