//! Demo data
//!
//! An empty store gets two proposals from a fixed creator so the dashboard
//! has something to show.

use crate::models::{NewProposal, NewUser};
use crate::storage::{Storage, StorageError};
use stackwave_contract::ProposalStatus;
use std::sync::Arc;
use tracing::{error, info};

pub const SEED_CREATOR: &str = "0xDummyCreator1234567890abcdef1234567890";
pub const SEED_CREATOR_NONCE: &str = "dummy";

pub const SEED_PROPOSALS: [(&str, &str); 2] = [
    (
        "SIP-01: Increase Staking APY for Q4",
        "This proposal aims to increase the base staking APY from 10% to 15% to attract more liquidity ahead of the V2 launch.",
    ),
    (
        "SIP-02: Fund StackWave Hackathon",
        "Allocate 500,000 SWAVE from the ecosystem treasury to fund the upcoming global AI Web3 Hackathon.",
    ),
];

/// Insert the demo proposals if no proposal exists. Returns how many were
/// created.
pub async fn seed_database(storage: &dyn Storage) -> Result<usize, StorageError> {
    if !storage.get_proposals().await?.is_empty() {
        return Ok(0);
    }

    let creator = match storage.get_user_by_wallet_address(SEED_CREATOR).await? {
        Some(user) => user,
        None => {
            storage
                .create_user(NewUser {
                    wallet_address: SEED_CREATOR.to_string(),
                    nonce: SEED_CREATOR_NONCE.to_string(),
                })
                .await?
        }
    };

    for (title, description) in SEED_PROPOSALS {
        storage
            .create_proposal(NewProposal {
                title: title.to_string(),
                description: description.to_string(),
                creator_id: creator.id,
                status: ProposalStatus::Active,
            })
            .await?;
    }
    Ok(SEED_PROPOSALS.len())
}

/// Run `seed_database` in the background. Failures are logged only.
pub fn spawn_seed(storage: Arc<dyn Storage>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match seed_database(storage.as_ref()).await {
            Ok(0) => {}
            Ok(n) => info!("Seeded {} demo proposals", n),
            Err(e) => error!("Failed to seed database: {}", e),
        }
    })
}
