//! Error types for the stmt-equiv crate.
//!
//! Rules never return these: a rule that cannot decide declines. Errors are
//! reserved for broken caller contracts and for the JSON driver.

/// Hard failures of the heuristics engine.
#[derive(Debug, thiserror::Error)]
pub enum HeuristicsError {
    /// A statement id does not resolve in its arena.
    #[error("unknown statement id {id} (arena holds {len} statements)")]
    UnknownStatement { id: usize, len: usize },

    /// The conditional engine was handed a node that is not an `if`.
    #[error("statement {id} is not an if statement")]
    NotAnIfStatement { id: usize },

    /// An `if` node carries no condition expression.
    #[error("if statement {id} has no condition expression")]
    EmptyConditional { id: usize },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for heuristics operations.
pub type HeuristicsResult<T> = Result<T, HeuristicsError>;

/// Report a broken internal invariant.
///
/// Panics in debug builds; in release builds logs at `error` and lets the
/// calling rule decline.
#[track_caller]
pub(crate) fn invariant_violated(err: &HeuristicsError) {
    tracing::error!(error = %err, "heuristics invariant violated");
    debug_assert!(false, "heuristics invariant violated: {err}");
}
