//! Typed client for the StackWave governance API.
//!
//! Reads are cached per URL and invalidated by the mutations that change
//! them. Requests and responses are checked against `stackwave-contract`.

pub mod cache;
pub mod client;
pub mod error;
pub mod wallet;

pub use cache::QueryCache;
pub use client::GovernanceClient;
pub use error::{failure_message, ClientError};
pub use wallet::{mock_signature, mock_wallet_address};
