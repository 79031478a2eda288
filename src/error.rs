use thiserror::Error;

/// Failures surfaced across the engine boundary.
///
/// An absent rule set is deliberately not represented here: it means
/// "no rules configured" and resolves to a `NONE` decision, not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("invalid event timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid rule set: {0}")]
    InvalidRuleSet(String),

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}
