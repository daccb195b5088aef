//! Barrier protocol types.

use thiserror::Error;
use uuid::Uuid;

/// Barrier protocol violations. Both indicate a caller bug (for example
/// submitting with a stale round id); neither is retried.
#[derive(Debug, Error)]
pub enum BarrierError {
    /// The round id was never registered, or was swept when a new cycle
    /// started before this round submitted.
    #[error("round {0} is not registered with the barrier")]
    RoundNotFound(Uuid),

    /// The cycle stopped accepting submissions before this round's arrived.
    #[error("submissions are closed for the current cycle")]
    SubmissionsClosed,
}
