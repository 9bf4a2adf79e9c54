//! Shared contract for the StackWave governance API.
//!
//! This crate is the single source of truth consumed by both the HTTP server
//! and the typed client:
//! - `schema`: entity DTOs and request/response messages
//! - `rules`: data-described validation rules and their interpreter
//! - `routes`: the operation table (method, path, input rule, response rules)
//! - `decimal`: exact arithmetic over decimal strings (stake totals, tallies)

pub mod decimal;
pub mod routes;
pub mod rules;
pub mod schema;

pub use decimal::{
    canonical_decimal, format_decimal, parse_decimal, sum_decimal_strings, within_bounds,
    DecimalError, VoteTally,
};
pub use routes::{build_url, contract_document, route, Method, Operation, RouteDef, ROUTES};
pub use rules::{validate_input, validate_response, Entity, ResponseRule, ValidationError};
pub use schema::*;
