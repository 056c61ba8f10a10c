use thiserror::Error;

use swarmfall_core::balance::BalanceError;

/// Errors raised while constructing an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No drawing surface was supplied.
    #[error("no presentation surface supplied")]
    MissingSurface,
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error("invalid engine config `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}
