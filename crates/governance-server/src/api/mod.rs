//! HTTP API
//!
//! Every contract operation is mounted at the method and path its `RouteDef`
//! declares.

pub mod analytics;
pub mod auth;
pub mod proposals;
pub mod staking;
pub mod votes;

use crate::state::AppState;
use axum::{
    handler::Handler,
    routing::{get, on, MethodFilter},
    Json, Router,
};
use serde_json::{json, Value};
use stackwave_contract::{Method, Operation};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

type AppRouter = Router<Arc<AppState>>;

fn method_filter(method: Method) -> MethodFilter {
    match method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
    }
}

/// Mount `handler` for `operation`. Operations sharing a path are merged
/// into one method router.
fn bind<H, T>(router: AppRouter, operation: Operation, handler: H) -> AppRouter
where
    H: Handler<T, Arc<AppState>>,
    T: 'static,
{
    let def = operation.route();
    router.route(def.path, on(method_filter(def.method), handler))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let mut api: AppRouter = Router::new();
    api = bind(api, Operation::AuthNonce, auth::nonce);
    api = bind(api, Operation::AuthVerify, auth::verify);
    api = bind(api, Operation::AuthMe, auth::me);
    api = bind(api, Operation::AuthLogout, auth::logout);
    api = bind(api, Operation::ProposalsList, proposals::list_proposals);
    api = bind(api, Operation::ProposalsCreate, proposals::create_proposal);
    api = bind(api, Operation::VotesListByProposal, votes::list_votes);
    api = bind(api, Operation::VotesCast, votes::cast_vote);
    api = bind(api, Operation::StakingMe, staking::my_staking);
    api = bind(api, Operation::StakingStake, staking::stake);
    api = bind(api, Operation::AnalyticsGet, analytics::get_analytics);

    api.route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
