use thiserror::Error;

use crate::gateway::GatewayError;

/// Failure scoped to a single query in a batch.
///
/// A `QueryError` becomes that identifier's result; sibling queries in the
/// same batch are unaffected.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("error parsing query {payload}: {reason}")]
    InvalidPayload { payload: String, reason: String },

    #[error("unknown format: {0}")]
    UnknownFormat(String),

    #[error("unknown query type: {0}")]
    UnknownType(String),

    #[error("query target must not be empty")]
    EmptyTarget,

    #[error("error compiling pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("error reading key {key}: {source}")]
    Get { key: String, source: GatewayError },

    #[error("error listing keys under {prefix}: {source}")]
    List { prefix: String, source: GatewayError },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("value at {key} is not numeric: {value}")]
    NonNumericValue { key: String, value: String },

    #[error("store probe failed: {0}")]
    ProbeFailed(GatewayError),

    #[error("query cancelled")]
    Cancelled,
}

/// Failure affecting the whole request, before any per-query evaluation.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("no queries found in request")]
    EmptyBatch,
}

pub type Result<T> = std::result::Result<T, QueryError>;
