//! Data-described validation rules.
//!
//! Rules are plain static data (and serializable), so the server and the
//! client interpret exactly the same definitions. Validation walks a
//! `serde_json::Value` and reports the first failing field in declaration
//! order; unknown fields are ignored.

use crate::decimal::{parse_decimal, within_bounds, MAX_INTEGER_DIGITS, MAX_SCALE};
use crate::schema::ProposalStatus;
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// First validation failure found in a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

/// Persisted entity whose field list doubles as its response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Entity {
    User,
    Proposal,
    Vote,
    Stake,
}

impl Entity {
    pub const ALL: [Entity; 4] = [Entity::User, Entity::Proposal, Entity::Vote, Entity::Stake];

    pub fn fields(&self) -> &'static [FieldRule] {
        match self {
            Entity::User => USER_FIELDS,
            Entity::Proposal => PROPOSAL_FIELDS,
            Entity::Vote => VOTE_FIELDS,
            Entity::Stake => STAKE_FIELDS,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    #[serde(rename_all = "camelCase")]
    String {
        min_len: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<&'static str>,
    },
    Boolean,
    Integer,
    Number,
    /// Exact decimal carried as a string. `positive` demands `> 0`,
    /// otherwise `>= 0`. `bounded` caps integer digits and scale.
    Decimal {
        positive: bool,
        bounded: bool,
        message: &'static str,
    },
    Timestamp,
    OneOf {
        values: &'static [&'static str],
    },
    Row {
        entity: Entity,
    },
    List {
        entity: Entity,
    },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Shape expected for one response status.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResponseRule {
    Object { fields: &'static [FieldRule] },
    Row { entity: Entity },
    List { entity: Entity },
    Nullable { entity: Entity },
}

const TEXT: FieldKind = FieldKind::String {
    min_len: 0,
    message: None,
};

const WEIGHT: FieldKind = FieldKind::Decimal {
    positive: false,
    bounded: true,
    message: "Weight must be a non-negative decimal",
};

const STORED_AMOUNT: FieldKind = FieldKind::Decimal {
    positive: false,
    bounded: true,
    message: "Amount must be a non-negative decimal",
};

pub static USER_FIELDS: &[FieldRule] = &[
    FieldRule::required("id", FieldKind::Integer),
    FieldRule::required("walletAddress", TEXT),
    FieldRule::required("nonce", TEXT),
];

pub static PROPOSAL_FIELDS: &[FieldRule] = &[
    FieldRule::required("id", FieldKind::Integer),
    FieldRule::required("title", TEXT),
    FieldRule::required("description", TEXT),
    FieldRule::required("creatorId", FieldKind::Integer),
    FieldRule::required(
        "status",
        FieldKind::OneOf {
            values: &ProposalStatus::ALL,
        },
    ),
    FieldRule::required("createdAt", FieldKind::Timestamp),
];

pub static VOTE_FIELDS: &[FieldRule] = &[
    FieldRule::required("id", FieldKind::Integer),
    FieldRule::required("proposalId", FieldKind::Integer),
    FieldRule::required("voterId", FieldKind::Integer),
    FieldRule::required("support", FieldKind::Boolean),
    FieldRule::required("weight", WEIGHT),
];

pub static STAKE_FIELDS: &[FieldRule] = &[
    FieldRule::required("id", FieldKind::Integer),
    FieldRule::required("userId", FieldKind::Integer),
    FieldRule::required("amount", STORED_AMOUNT),
    FieldRule::required("stakedAt", FieldKind::Timestamp),
];

// ============================================================================
// INPUT RULES
// ============================================================================

pub static VERIFY_INPUT: &[FieldRule] = &[
    FieldRule::required(
        "walletAddress",
        FieldKind::String {
            min_len: 1,
            message: Some("walletAddress is required"),
        },
    ),
    FieldRule::required("signature", TEXT),
];

pub static CREATE_PROPOSAL_INPUT: &[FieldRule] = &[
    FieldRule::required(
        "title",
        FieldKind::String {
            min_len: 5,
            message: Some("Title must be at least 5 characters"),
        },
    ),
    FieldRule::required(
        "description",
        FieldKind::String {
            min_len: 20,
            message: Some("Description must be detailed enough"),
        },
    ),
];

pub static CAST_VOTE_INPUT: &[FieldRule] = &[
    FieldRule::required("support", FieldKind::Boolean),
    FieldRule::required("weight", WEIGHT),
];

pub static STAKE_INPUT: &[FieldRule] = &[FieldRule::required(
    "amount",
    FieldKind::Decimal {
        positive: true,
        bounded: true,
        message: "Amount must be a positive number",
    },
)];

// ============================================================================
// RESPONSE RULES
// ============================================================================

pub static NONCE_RESPONSE: &[FieldRule] = &[FieldRule::required("nonce", TEXT)];

pub static VERIFY_RESPONSE: &[FieldRule] = &[FieldRule::required(
    "user",
    FieldKind::Row {
        entity: Entity::User,
    },
)];

pub static LOGOUT_RESPONSE: &[FieldRule] = &[FieldRule::required("success", FieldKind::Boolean)];

pub static STAKING_STATUS_RESPONSE: &[FieldRule] = &[
    FieldRule::required(
        "totalStaked",
        FieldKind::Decimal {
            positive: false,
            bounded: false,
            message: "totalStaked must be a non-negative decimal",
        },
    ),
    FieldRule::required(
        "stakes",
        FieldKind::List {
            entity: Entity::Stake,
        },
    ),
];

pub static ANALYTICS_RESPONSE: &[FieldRule] = &[
    FieldRule::required("riskScore", FieldKind::Number),
    FieldRule::required("walletCluster", TEXT),
    FieldRule::required("governanceEngagement", FieldKind::Number),
    FieldRule::required("tokenVelocity", FieldKind::Number),
];

pub static ERROR_RESPONSE: &[FieldRule] = &[
    FieldRule::required("message", TEXT),
    FieldRule::optional("field", TEXT),
];

// ============================================================================
// INTERPRETER
// ============================================================================

/// Validate a request body against an input rule.
pub fn validate_input(fields: &[FieldRule], value: &Value) -> Result<(), ValidationError> {
    check_object(fields, value, None)
}

/// Validate a response body against the rule declared for its status.
pub fn validate_response(rule: &ResponseRule, value: &Value) -> Result<(), ValidationError> {
    match rule {
        ResponseRule::Object { fields } => check_object(fields, value, None),
        ResponseRule::Row { entity } => check_object(entity.fields(), value, None),
        ResponseRule::List { entity } => check_list(*entity, value, None),
        ResponseRule::Nullable { entity } => {
            if value.is_null() {
                Ok(())
            } else {
                check_object(entity.fields(), value, None)
            }
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: Option<&str>, expected: &str, value: &Value) -> ValidationError {
    let message = format!("Expected {}, received {}", expected, json_type(value));
    match path {
        Some(path) => ValidationError::for_field(path, message),
        None => ValidationError::new(message),
    }
}

fn join_path(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, name),
        None => name.to_string(),
    }
}

fn check_object(
    fields: &[FieldRule],
    value: &Value,
    path: Option<&str>,
) -> Result<(), ValidationError> {
    let object = value
        .as_object()
        .ok_or_else(|| mismatch(path, "object", value))?;

    for rule in fields {
        let field_path = join_path(path, rule.name);
        match object.get(rule.name) {
            None | Some(Value::Null) => {
                if rule.required {
                    return Err(ValidationError::for_field(
                        field_path.clone(),
                        format!("{} is required", field_path),
                    ));
                }
            }
            Some(field_value) => check_kind(&rule.kind, field_value, &field_path)?,
        }
    }
    Ok(())
}

fn check_list(entity: Entity, value: &Value, path: Option<&str>) -> Result<(), ValidationError> {
    let items = value
        .as_array()
        .ok_or_else(|| mismatch(path, "array", value))?;
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{}[{}]", path.unwrap_or(""), index);
        check_object(entity.fields(), item, Some(&item_path))?;
    }
    Ok(())
}

fn check_kind(kind: &FieldKind, value: &Value, path: &str) -> Result<(), ValidationError> {
    match kind {
        FieldKind::String { min_len, message } => {
            let text = value
                .as_str()
                .ok_or_else(|| mismatch(Some(path), "string", value))?;
            if text.chars().count() < *min_len {
                let message = message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} must be at least {} characters", path, min_len));
                return Err(ValidationError::for_field(path, message));
            }
            Ok(())
        }
        FieldKind::Boolean => match value {
            Value::Bool(_) => Ok(()),
            other => Err(mismatch(Some(path), "boolean", other)),
        },
        FieldKind::Integer => {
            if value.is_i64() || value.is_u64() {
                Ok(())
            } else {
                Err(mismatch(Some(path), "integer", value))
            }
        }
        FieldKind::Number => {
            if value.is_number() {
                Ok(())
            } else {
                Err(mismatch(Some(path), "number", value))
            }
        }
        FieldKind::Decimal {
            positive,
            bounded,
            message,
        } => {
            let text = value
                .as_str()
                .ok_or_else(|| mismatch(Some(path), "string", value))?;
            let amount =
                parse_decimal(text).map_err(|_| ValidationError::for_field(path, *message))?;
            let in_range = if *positive {
                amount > Decimal::ZERO
            } else {
                amount >= Decimal::ZERO
            };
            if !in_range {
                return Err(ValidationError::for_field(path, *message));
            }
            if *bounded && !within_bounds(amount) {
                return Err(ValidationError::for_field(
                    path,
                    format!(
                        "{} must have at most {} integer digits and {} decimal places",
                        path, MAX_INTEGER_DIGITS, MAX_SCALE
                    ),
                ));
            }
            Ok(())
        }
        FieldKind::Timestamp => {
            let text = value
                .as_str()
                .ok_or_else(|| mismatch(Some(path), "string", value))?;
            DateTime::parse_from_rfc3339(text).map(|_| ()).map_err(|_| {
                ValidationError::for_field(path, format!("{} must be an RFC 3339 timestamp", path))
            })
        }
        FieldKind::OneOf { values } => {
            let text = value
                .as_str()
                .ok_or_else(|| mismatch(Some(path), "string", value))?;
            if values.contains(&text) {
                Ok(())
            } else {
                Err(ValidationError::for_field(
                    path,
                    format!(
                        "Invalid enum value. Expected {}, received '{}'",
                        values.join(" | "),
                        text
                    ),
                ))
            }
        }
        FieldKind::Row { entity } => check_object(entity.fields(), value, Some(path)),
        FieldKind::List { entity } => check_list(*entity, value, Some(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // Input rules
    // =========================================================================

    #[test]
    fn test_proposal_title_too_short() {
        let err = validate_input(
            CREATE_PROPOSAL_INPUT,
            &json!({"title": "Hey", "description": "a description that is long enough"}),
        )
        .unwrap_err();
        assert_eq!(err.message, "Title must be at least 5 characters");
        assert_eq!(err.field.as_deref(), Some("title"));
    }

    #[test]
    fn test_first_failing_field_wins() {
        let err = validate_input(CREATE_PROPOSAL_INPUT, &json!({"title": "x", "description": "y"}))
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("title"));
    }

    #[test]
    fn test_missing_field_is_required() {
        let err = validate_input(CAST_VOTE_INPUT, &json!({"weight": "10"})).unwrap_err();
        assert_eq!(err.message, "support is required");
        assert_eq!(err.field.as_deref(), Some("support"));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = validate_input(CAST_VOTE_INPUT, &json!({"support": "yes", "weight": "10"}))
            .unwrap_err();
        assert_eq!(err.message, "Expected boolean, received string");
    }

    #[test]
    fn test_body_must_be_object() {
        let err = validate_input(STAKE_INPUT, &json!(["100"])).unwrap_err();
        assert_eq!(err.message, "Expected object, received array");
        assert!(err.field.is_none());
    }

    #[test]
    fn test_stake_amount_must_be_positive_decimal() {
        for bad in ["0", "-5", "abc", "", "1_000", "1e3"] {
            let err = validate_input(STAKE_INPUT, &json!({ "amount": bad })).unwrap_err();
            assert_eq!(err.message, "Amount must be a positive number", "input {:?}", bad);
        }
        assert!(validate_input(STAKE_INPUT, &json!({"amount": "100.25"})).is_ok());
    }

    #[test]
    fn test_stake_amount_must_fit_bounds() {
        for bad in [
            "79228162514264337593543950335",
            "1000000000000000",
            "0.1234567890123456789012345678",
        ] {
            let err = validate_input(STAKE_INPUT, &json!({ "amount": bad })).unwrap_err();
            assert_eq!(
                err.message, "amount must have at most 15 integer digits and 8 decimal places",
                "input {:?}",
                bad
            );
            assert_eq!(err.field.as_deref(), Some("amount"));
        }
        let max = json!({"amount": "999999999999999.99999999"});
        assert!(validate_input(STAKE_INPUT, &max).is_ok());
    }

    #[test]
    fn test_total_staked_is_unbounded() {
        let body = json!({"totalStaked": "1999999999999999.99999998", "stakes": []});
        let rule = ResponseRule::Object {
            fields: STAKING_STATUS_RESPONSE,
        };
        assert!(validate_response(&rule, &body).is_ok());
    }

    #[test]
    fn test_vote_weight_accepts_zero() {
        assert!(validate_input(CAST_VOTE_INPUT, &json!({"support": false, "weight": "0"})).is_ok());
        assert!(validate_input(CAST_VOTE_INPUT, &json!({"support": true, "weight": "-1"})).is_err());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let body = json!({"walletAddress": "0xabc", "signature": "sig", "extra": 1});
        assert!(validate_input(VERIFY_INPUT, &body).is_ok());
    }

    #[test]
    fn test_empty_wallet_address_rejected() {
        let err = validate_input(VERIFY_INPUT, &json!({"walletAddress": "", "signature": "s"}))
            .unwrap_err();
        assert_eq!(err.message, "walletAddress is required");
    }

    // =========================================================================
    // Response rules
    // =========================================================================

    fn proposal_json() -> Value {
        json!({
            "id": 1,
            "title": "Increase APY",
            "description": "long enough description for the proposal",
            "creatorId": 7,
            "status": "active",
            "createdAt": "2024-05-01T12:00:00Z"
        })
    }

    #[test]
    fn test_row_response_valid() {
        let rule = ResponseRule::Row {
            entity: Entity::Proposal,
        };
        assert!(validate_response(&rule, &proposal_json()).is_ok());
    }

    #[test]
    fn test_row_response_bad_status() {
        let mut body = proposal_json();
        body["status"] = json!("pending");
        let rule = ResponseRule::Row {
            entity: Entity::Proposal,
        };
        let err = validate_response(&rule, &body).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("status"));
        assert!(err.message.contains("active | executed | defeated"));
    }

    #[test]
    fn test_list_response_reports_index() {
        let mut second = proposal_json();
        second["creatorId"] = json!("seven");
        let rule = ResponseRule::List {
            entity: Entity::Proposal,
        };
        let err = validate_response(&rule, &json!([proposal_json(), second])).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("[1].creatorId"));
    }

    #[test]
    fn test_nullable_accepts_null() {
        let rule = ResponseRule::Nullable {
            entity: Entity::User,
        };
        assert!(validate_response(&rule, &Value::Null).is_ok());
        assert!(validate_response(&rule, &json!({"id": 1})).is_err());
    }

    #[test]
    fn test_nested_row_path() {
        let rule = ResponseRule::Object {
            fields: VERIFY_RESPONSE,
        };
        let err = validate_response(&rule, &json!({"user": {"id": 1, "nonce": "n"}})).unwrap_err();
        assert_eq!(err.message, "user.walletAddress is required");
    }

    #[test]
    fn test_error_body_field_is_optional() {
        let rule = ResponseRule::Object {
            fields: ERROR_RESPONSE,
        };
        assert!(validate_response(&rule, &json!({"message": "Unauthorized"})).is_ok());
    }

    #[test]
    fn test_rules_serialize_as_data() {
        let json = serde_json::to_value(STAKE_INPUT).unwrap();
        assert_eq!(json[0]["name"], "amount");
        assert_eq!(json[0]["kind"]["type"], "decimal");
        assert_eq!(json[0]["kind"]["positive"], true);
        assert_eq!(json[0]["kind"]["bounded"], true);
    }
}
