//! End-to-end tests against the real router on an ephemeral port.

use reqwest::{header, StatusCode};
use serde_json::{json, Value};
use stackwave_contract::{validate_response, Operation, VoteTally, Vote, ROUTES};
use stackwave_server::{serve, AppState, ServerConfig};
use std::sync::Arc;
use tokio::net::TcpListener;

struct TestServer {
    base: String,
    http: reqwest::Client,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = ServerConfig {
            seed_on_start: false,
            ..ServerConfig::default()
        };
        let state = Arc::new(AppState::in_memory(config));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state));
        Self {
            base: format!("http://{}", addr),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut req = self.http.get(self.url(path));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.send().await.unwrap()
    }

    async fn post(&self, path: &str, cookie: Option<&str>, body: Value) -> reqwest::Response {
        let mut req = self.http.post(self.url(path)).json(&body);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.send().await.unwrap()
    }

    /// Sign in and return the `name=value` cookie pair.
    async fn login(&self, address: &str) -> (String, Value) {
        let resp = self
            .post(
                "/api/auth/verify",
                None,
                json!({ "walletAddress": address, "signature": "0xmock_signature_1" }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let pair = set_cookie.split(';').next().unwrap().to_string();
        let body: Value = resp.json().await.unwrap();
        (pair, body["user"].clone())
    }
}

fn assert_matches_contract(op: Operation, status: StatusCode, body: &Value) {
    let rule = op
        .route()
        .response_rule(status.as_u16())
        .unwrap_or_else(|| panic!("{} does not declare {}", op, status));
    validate_response(rule, body).unwrap_or_else(|e| panic!("{} body rejected: {}", op, e));
}

// ============================================================================
// AUTH
// ============================================================================

#[tokio::test]
async fn test_health() {
    let server = TestServer::spawn().await;
    let resp = server.get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_nonce() {
    let server = TestServer::spawn().await;
    let resp = server.get("/api/auth/nonce", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_matches_contract(Operation::AuthNonce, StatusCode::OK, &body);
}

#[tokio::test]
async fn test_verify_same_address_same_user() {
    let server = TestServer::spawn().await;
    let (_, first) = server.login("0xaaaa").await;
    let (_, second) = server.login("0xaaaa").await;
    let (_, other) = server.login("0xbbbb").await;
    assert_eq!(first["id"], second["id"]);
    assert_ne!(first["id"], other["id"]);
    assert_eq!(first["walletAddress"], "0xaaaa");
}

#[tokio::test]
async fn test_verify_sets_session_cookie() {
    let server = TestServer::spawn().await;
    let resp = server
        .post(
            "/api/auth/verify",
            None,
            json!({ "walletAddress": "0xaaaa", "signature": "sig" }),
        )
        .await;
    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("stackwave.sid="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=86400"));

    let body: Value = resp.json().await.unwrap();
    assert_matches_contract(Operation::AuthVerify, StatusCode::OK, &body);
}

#[tokio::test]
async fn test_verify_requires_wallet_address() {
    let server = TestServer::spawn().await;
    let resp = server
        .post("/api/auth/verify", None, json!({ "signature": "sig" }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "walletAddress is required");
    assert_eq!(body["field"], "walletAddress");
}

#[tokio::test]
async fn test_me_follows_session() {
    let server = TestServer::spawn().await;

    let body: Value = server.get("/api/auth/me", None).await.json().await.unwrap();
    assert!(body.is_null());

    let (cookie, user) = server.login("0xaaaa").await;
    let resp = server.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_matches_contract(Operation::AuthMe, StatusCode::OK, &body);
    assert_eq!(body, user);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = TestServer::spawn().await;
    let (cookie, _) = server.login("0xaaaa").await;

    let resp = server.post("/api/auth/logout", Some(&cookie), json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cleared.contains("Max-Age=0"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));

    let me: Value = server.get("/api/auth/me", Some(&cookie)).await.json().await.unwrap();
    assert!(me.is_null());

    let resp = server.get("/api/staking/me", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = server.post("/api/auth/logout", Some(&cookie), json!({})).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_second_login_replaces_session() {
    let server = TestServer::spawn().await;
    let (old_cookie, _) = server.login("0xaaaa").await;

    let resp = server
        .http
        .post(server.url("/api/auth/verify"))
        .header(header::COOKIE, &old_cookie)
        .json(&json!({ "walletAddress": "0xbbbb", "signature": "sig" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let me: Value = server.get("/api/auth/me", Some(&old_cookie)).await.json().await.unwrap();
    assert!(me.is_null());
}

// ============================================================================
// SESSION GATE
// ============================================================================

#[tokio::test]
async fn test_protected_routes_reject_anonymous() {
    let server = TestServer::spawn().await;
    for def in ROUTES.iter().filter(|d| d.requires_session) {
        let path = stackwave_contract::build_url(def.path, &[("proposalId", 1)]);
        let req = match def.method {
            stackwave_contract::Method::Get => server.http.get(server.url(&path)),
            stackwave_contract::Method::Post => server.http.post(server.url(&path)).json(&json!({})),
        };
        let resp = req
            .header(header::COOKIE, "stackwave.sid=not-a-session")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", def.name);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "message": "Unauthorized" }), "{}", def.name);
    }
}

#[tokio::test]
async fn test_create_proposal_without_session() {
    let server = TestServer::spawn().await;
    let resp = server
        .post(
            "/api/proposals",
            None,
            json!({ "title": "Increase APY", "description": "A detailed enough description" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let list: Value = server.get("/api/proposals", None).await.json().await.unwrap();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_session_checked_before_validation() {
    let server = TestServer::spawn().await;
    let resp = server
        .post("/api/proposals", None, json!({ "title": "x" }))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// PROPOSALS
// ============================================================================

#[tokio::test]
async fn test_create_and_list_proposal() {
    let server = TestServer::spawn().await;
    let (cookie, user) = server.login("0xaaaa").await;

    let resp = server
        .post(
            "/api/proposals",
            Some(&cookie),
            json!({
                "title": "Increase APY",
                "description": "Raise the base staking APY to attract liquidity"
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_matches_contract(Operation::ProposalsCreate, StatusCode::CREATED, &created);
    assert_eq!(created["status"], "active");
    assert_eq!(created["creatorId"], user["id"]);

    let resp = server.get("/api/proposals", None).await;
    let list: Value = resp.json().await.unwrap();
    assert_matches_contract(Operation::ProposalsList, StatusCode::OK, &list);
    assert_eq!(list, json!([created]));
}

#[tokio::test]
async fn test_invalid_proposal_rejected_without_insert() {
    let server = TestServer::spawn().await;
    let (cookie, _) = server.login("0xaaaa").await;

    let cases = [
        (
            json!({ "title": "SIP", "description": "A detailed enough description" }),
            "Title must be at least 5 characters",
            "title",
        ),
        (
            json!({ "title": "Increase APY", "description": "too short" }),
            "Description must be detailed enough",
            "description",
        ),
        (
            json!({ "description": "A detailed enough description" }),
            "title is required",
            "title",
        ),
        (
            json!({ "title": 42, "description": "A detailed enough description" }),
            "Expected string, received number",
            "title",
        ),
    ];
    for (body, message, field) in cases {
        let resp = server.post("/api/proposals", Some(&cookie), body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["message"], message);
        assert_eq!(err["field"], field);
    }

    let list: Value = server.get("/api/proposals", None).await.json().await.unwrap();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_malformed_json_body() {
    let server = TestServer::spawn().await;
    let (cookie, _) = server.login("0xaaaa").await;
    let resp = server
        .http
        .post(server.url("/api/proposals"))
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "Invalid JSON body");
}

// ============================================================================
// VOTES
// ============================================================================

#[tokio::test]
async fn test_vote_totals_match_rows() {
    let server = TestServer::spawn().await;
    let (alice, _) = server.login("0xaaaa").await;
    let (bob, _) = server.login("0xbbbb").await;

    for (cookie, support, weight) in [
        (&alice, true, "100"),
        (&bob, false, "40.5"),
        (&alice, true, "0.25"),
    ] {
        let resp = server
            .post(
                "/api/proposals/1/votes",
                Some(cookie),
                json!({ "support": support, "weight": weight }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let vote: Value = resp.json().await.unwrap();
        assert_matches_contract(Operation::VotesCast, StatusCode::CREATED, &vote);
    }

    let resp = server.get("/api/proposals/1/votes", None).await;
    let body: Value = resp.json().await.unwrap();
    assert_matches_contract(Operation::VotesListByProposal, StatusCode::OK, &body);
    let votes: Vec<Vote> = serde_json::from_value(body).unwrap();
    assert_eq!(votes.len(), 3);

    let tally = VoteTally::from_votes(&votes).unwrap();
    assert_eq!(stackwave_contract::format_decimal(tally.votes_for), "100.25");
    assert_eq!(stackwave_contract::format_decimal(tally.votes_against), "40.5");

    let other: Value = server.get("/api/proposals/2/votes", None).await.json().await.unwrap();
    assert_eq!(other, json!([]));
}

#[tokio::test]
async fn test_invalid_proposal_id() {
    let server = TestServer::spawn().await;
    let resp = server.get("/api/proposals/abc/votes", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err, json!({ "message": "Invalid proposalId", "field": "proposalId" }));
}

#[tokio::test]
async fn test_invalid_vote_rejected() {
    let server = TestServer::spawn().await;
    let (cookie, _) = server.login("0xaaaa").await;

    for (body, field) in [
        (json!({ "support": "yes", "weight": "1" }), "support"),
        (json!({ "support": true, "weight": "-1" }), "weight"),
        (json!({ "support": true, "weight": "lots" }), "weight"),
        (json!({ "support": true }), "weight"),
    ] {
        let resp = server.post("/api/proposals/1/votes", Some(&cookie), body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["field"], field);
    }

    let votes: Value = server.get("/api/proposals/1/votes", None).await.json().await.unwrap();
    assert_eq!(votes, json!([]));
}

// ============================================================================
// STAKING & ANALYTICS
// ============================================================================

#[tokio::test]
async fn test_staking_totals() {
    let server = TestServer::spawn().await;
    let (cookie, user) = server.login("0xaaaa").await;

    let status: Value = server.get("/api/staking/me", Some(&cookie)).await.json().await.unwrap();
    assert_eq!(status, json!({ "totalStaked": "0", "stakes": [] }));

    for amount in ["100", "250"] {
        let resp = server
            .post("/api/staking", Some(&cookie), json!({ "amount": amount }))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let stake: Value = resp.json().await.unwrap();
        assert_matches_contract(Operation::StakingStake, StatusCode::CREATED, &stake);
        assert_eq!(stake["userId"], user["id"]);
    }

    let resp = server.get("/api/staking/me", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let status: Value = resp.json().await.unwrap();
    assert_matches_contract(Operation::StakingMe, StatusCode::OK, &status);
    assert_eq!(status["totalStaked"], "350");
    assert_eq!(status["stakes"][0]["amount"], "100");
    assert_eq!(status["stakes"][1]["amount"], "250");

    let (other, _) = server.login("0xbbbb").await;
    let status: Value = server.get("/api/staking/me", Some(&other)).await.json().await.unwrap();
    assert_eq!(status["totalStaked"], "0");
}

#[tokio::test]
async fn test_stake_must_be_positive() {
    let server = TestServer::spawn().await;
    let (cookie, _) = server.login("0xaaaa").await;
    for amount in ["0", "-5", "ten"] {
        let resp = server
            .post("/api/staking", Some(&cookie), json!({ "amount": amount }))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["message"], "Amount must be a positive number");
    }
    let status: Value = server.get("/api/staking/me", Some(&cookie)).await.json().await.unwrap();
    assert_eq!(status["stakes"], json!([]));
}

#[tokio::test]
async fn test_stake_amount_out_of_range_rejected() {
    let server = TestServer::spawn().await;
    let (cookie, _) = server.login("0xaaaa").await;
    for amount in ["79228162514264337593543950335", "0.1234567890123456789012345678"] {
        let resp = server
            .post("/api/staking", Some(&cookie), json!({ "amount": amount }))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["field"], "amount");
    }

    let resp = server.get("/api/staking/me", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let status: Value = resp.json().await.unwrap();
    assert_eq!(status["totalStaked"], "0");
}

#[tokio::test]
async fn test_largest_stakes_total_exactly() {
    let server = TestServer::spawn().await;
    let (cookie, _) = server.login("0xaaaa").await;
    for amount in ["999999999999999.99999999", "999999999999999.99999999", "8"] {
        let resp = server
            .post("/api/staking", Some(&cookie), json!({ "amount": amount }))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = server.get("/api/staking/me", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let status: Value = resp.json().await.unwrap();
    assert_matches_contract(Operation::StakingMe, StatusCode::OK, &status);
    assert_eq!(status["totalStaked"], "2000000000000007.99999998");
}

#[tokio::test]
async fn test_analytics_placeholder() {
    let server = TestServer::spawn().await;
    let resp = server.get("/api/analytics", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_matches_contract(Operation::AnalyticsGet, StatusCode::OK, &body);
    assert_eq!(body["walletCluster"], "DeFi Power User");
    assert_eq!(body["riskScore"], 24.5);
}
