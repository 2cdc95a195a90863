//! Planning errors.

use thiserror::Error;

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Query planning and plan-rewriting errors.
///
/// Rewrite passes fail fast on malformed input rather than emitting a
/// silently-wrong plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("duplicate table alias: {0}")]
    DuplicateAlias(String),

    #[error("predicate references unknown relation: {0}")]
    UnknownAlias(String),

    #[error("query selects no tables")]
    EmptyFrom,

    #[error("malformed plan: {0}")]
    MalformedPlan(String),

    #[error("internal error: {0}")]
    Internal(String),
}
