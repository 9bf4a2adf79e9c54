//! Wallet analytics handler
//!
//! There is no analytics engine yet; every caller gets the same placeholder
//! profile.

use axum::Json;
use stackwave_contract::AnalyticsResponse;

pub const PLACEHOLDER_RISK_SCORE: f64 = 24.5;
pub const PLACEHOLDER_WALLET_CLUSTER: &str = "DeFi Power User";
pub const PLACEHOLDER_GOVERNANCE_ENGAGEMENT: f64 = 87.0;
pub const PLACEHOLDER_TOKEN_VELOCITY: f64 = 1.2;

pub fn placeholder_analytics() -> AnalyticsResponse {
    AnalyticsResponse {
        risk_score: PLACEHOLDER_RISK_SCORE,
        wallet_cluster: PLACEHOLDER_WALLET_CLUSTER.to_string(),
        governance_engagement: PLACEHOLDER_GOVERNANCE_ENGAGEMENT,
        token_velocity: PLACEHOLDER_TOKEN_VELOCITY,
    }
}

/// GET /api/analytics
pub async fn get_analytics() -> Json<AnalyticsResponse> {
    Json(placeholder_analytics())
}
