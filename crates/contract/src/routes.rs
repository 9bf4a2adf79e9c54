//! Route contract: one entry per API operation.
//!
//! The server registers its handlers from this table and the client builds
//! its requests from it, so method, path and validation rules never drift
//! between the two.

use crate::rules::{
    validate_input, Entity, FieldRule, ResponseRule, ValidationError, ANALYTICS_RESPONSE,
    CAST_VOTE_INPUT, CREATE_PROPOSAL_INPUT, ERROR_RESPONSE, LOGOUT_RESPONSE, NONCE_RESPONSE,
    STAKE_INPUT, STAKING_STATUS_RESPONSE, VERIFY_INPUT, VERIFY_RESPONSE,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    AuthNonce,
    AuthVerify,
    AuthMe,
    AuthLogout,
    ProposalsList,
    ProposalsCreate,
    VotesListByProposal,
    VotesCast,
    StakingMe,
    StakingStake,
    AnalyticsGet,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::AuthNonce,
        Operation::AuthVerify,
        Operation::AuthMe,
        Operation::AuthLogout,
        Operation::ProposalsList,
        Operation::ProposalsCreate,
        Operation::VotesListByProposal,
        Operation::VotesCast,
        Operation::StakingMe,
        Operation::StakingStake,
        Operation::AnalyticsGet,
    ];

    pub fn route(self) -> &'static RouteDef {
        route(self)
    }

    pub fn name(self) -> &'static str {
        self.route().name
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResponseSpec {
    pub status: u16,
    pub rule: ResponseRule,
}

const fn respond(status: u16, rule: ResponseRule) -> ResponseSpec {
    ResponseSpec { status, rule }
}

const BAD_REQUEST: ResponseSpec = respond(
    400,
    ResponseRule::Object {
        fields: ERROR_RESPONSE,
    },
);

const UNAUTHORIZED: ResponseSpec = respond(
    401,
    ResponseRule::Object {
        fields: ERROR_RESPONSE,
    },
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDef {
    pub operation: Operation,
    /// Logical name, e.g. `votes.cast`.
    pub name: &'static str,
    pub method: Method,
    /// Path with `:param` placeholders.
    pub path: &'static str,
    pub requires_session: bool,
    pub input: Option<&'static [FieldRule]>,
    pub responses: &'static [ResponseSpec],
}

impl RouteDef {
    pub fn response_rule(&self, status: u16) -> Option<&'static ResponseRule> {
        self.responses
            .iter()
            .find(|spec| spec.status == status)
            .map(|spec| &spec.rule)
    }

    pub fn success_status(&self) -> u16 {
        self.responses
            .iter()
            .map(|spec| spec.status)
            .find(|status| (200..300).contains(status))
            .unwrap_or(200)
    }

    /// Validate a request body; routes without an input rule accept anything.
    pub fn validate_input(&self, body: &Value) -> Result<(), ValidationError> {
        match self.input {
            Some(fields) => validate_input(fields, body),
            None => Ok(()),
        }
    }

    /// Names of the `:param` placeholders in the path.
    pub fn path_params(&self) -> Vec<&'static str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix(':'))
            .collect()
    }
}

pub static ROUTES: [RouteDef; 11] = [
    RouteDef {
        operation: Operation::AuthNonce,
        name: "auth.nonce",
        method: Method::Get,
        path: "/api/auth/nonce",
        requires_session: false,
        input: None,
        responses: &[respond(
            200,
            ResponseRule::Object {
                fields: NONCE_RESPONSE,
            },
        )],
    },
    RouteDef {
        operation: Operation::AuthVerify,
        name: "auth.verify",
        method: Method::Post,
        path: "/api/auth/verify",
        requires_session: false,
        input: Some(VERIFY_INPUT),
        responses: &[
            respond(
                200,
                ResponseRule::Object {
                    fields: VERIFY_RESPONSE,
                },
            ),
            BAD_REQUEST,
            UNAUTHORIZED,
        ],
    },
    RouteDef {
        operation: Operation::AuthMe,
        name: "auth.me",
        method: Method::Get,
        path: "/api/auth/me",
        requires_session: false,
        input: None,
        responses: &[respond(
            200,
            ResponseRule::Nullable {
                entity: Entity::User,
            },
        )],
    },
    RouteDef {
        operation: Operation::AuthLogout,
        name: "auth.logout",
        method: Method::Post,
        path: "/api/auth/logout",
        requires_session: true,
        input: None,
        responses: &[
            respond(
                200,
                ResponseRule::Object {
                    fields: LOGOUT_RESPONSE,
                },
            ),
            UNAUTHORIZED,
        ],
    },
    RouteDef {
        operation: Operation::ProposalsList,
        name: "proposals.list",
        method: Method::Get,
        path: "/api/proposals",
        requires_session: false,
        input: None,
        responses: &[respond(
            200,
            ResponseRule::List {
                entity: Entity::Proposal,
            },
        )],
    },
    RouteDef {
        operation: Operation::ProposalsCreate,
        name: "proposals.create",
        method: Method::Post,
        path: "/api/proposals",
        requires_session: true,
        input: Some(CREATE_PROPOSAL_INPUT),
        responses: &[
            respond(
                201,
                ResponseRule::Row {
                    entity: Entity::Proposal,
                },
            ),
            BAD_REQUEST,
            UNAUTHORIZED,
        ],
    },
    RouteDef {
        operation: Operation::VotesListByProposal,
        name: "votes.listByProposal",
        method: Method::Get,
        path: "/api/proposals/:proposalId/votes",
        requires_session: false,
        input: None,
        responses: &[
            respond(
                200,
                ResponseRule::List {
                    entity: Entity::Vote,
                },
            ),
            BAD_REQUEST,
        ],
    },
    RouteDef {
        operation: Operation::VotesCast,
        name: "votes.cast",
        method: Method::Post,
        path: "/api/proposals/:proposalId/votes",
        requires_session: true,
        input: Some(CAST_VOTE_INPUT),
        responses: &[
            respond(
                201,
                ResponseRule::Row {
                    entity: Entity::Vote,
                },
            ),
            BAD_REQUEST,
            UNAUTHORIZED,
        ],
    },
    RouteDef {
        operation: Operation::StakingMe,
        name: "staking.me",
        method: Method::Get,
        path: "/api/staking/me",
        requires_session: true,
        input: None,
        responses: &[
            respond(
                200,
                ResponseRule::Object {
                    fields: STAKING_STATUS_RESPONSE,
                },
            ),
            UNAUTHORIZED,
        ],
    },
    RouteDef {
        operation: Operation::StakingStake,
        name: "staking.stake",
        method: Method::Post,
        path: "/api/staking",
        requires_session: true,
        input: Some(STAKE_INPUT),
        responses: &[
            respond(
                201,
                ResponseRule::Row {
                    entity: Entity::Stake,
                },
            ),
            BAD_REQUEST,
            UNAUTHORIZED,
        ],
    },
    RouteDef {
        operation: Operation::AnalyticsGet,
        name: "analytics.get",
        method: Method::Get,
        path: "/api/analytics",
        requires_session: false,
        input: None,
        responses: &[
            respond(
                200,
                ResponseRule::Object {
                    fields: ANALYTICS_RESPONSE,
                },
            ),
            // Declared for parity with the dashboard contract; never produced.
            UNAUTHORIZED,
        ],
    },
];

pub fn route(operation: Operation) -> &'static RouteDef {
    &ROUTES[operation as usize]
}

/// Substitute `:name` placeholders with literal values. Params without a
/// matching placeholder are ignored; placeholders without a param are kept.
pub fn build_url<V: fmt::Display>(path: &str, params: &[(&str, V)]) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| segment.to_string()),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The whole contract as a JSON document, including entity field lists.
pub fn contract_document() -> serde_json::Result<Value> {
    let mut entities = serde_json::Map::new();
    for entity in Entity::ALL {
        let name = serde_json::to_value(entity)?;
        let key = name.as_str().unwrap_or_default().to_string();
        entities.insert(key, serde_json::to_value(entity.fields())?);
    }
    Ok(serde_json::json!({
        "routes": serde_json::to_value(&ROUTES)?,
        "entities": Value::Object(entities),
    }))
}
