//! Orchestrator error types.

use thiserror::Error;

use crate::barrier::BarrierError;

/// Errors from driving a match-fetching round end to end.
///
/// Individual match function failures are NOT represented here; a failed
/// target contributes zero proposals and the round proceeds.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Barrier protocol violation while submitting the round.
    #[error(transparent)]
    Barrier(#[from] BarrierError),

    /// The round task itself died (panic or runtime shutdown).
    #[error("match fetching task failed: {0}")]
    Internal(String),
}
