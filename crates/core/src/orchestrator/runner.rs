//! Match orchestrator implementation.
//!
//! Drives one match-fetching request end to end: acquire a round from the
//! barrier, fan out to the requested match functions, submit the combined
//! proposals, and hand the de-conflicted matches back to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{info, warn};

use crate::barrier::SyncBarrier;
use crate::function::{FunctionDispatch, Match, MatchProfile};
use crate::metrics;

use super::config::OrchestratorConfig;
use super::types::OrchestratorError;

/// Per-request driver tying ticket retrieval, external match functions and
/// the synchronization barrier together.
pub struct MatchOrchestrator {
    config: OrchestratorConfig,
    barrier: Arc<SyncBarrier>,
    functions: Arc<dyn FunctionDispatch>,
}

impl MatchOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        barrier: Arc<SyncBarrier>,
        functions: Arc<dyn FunctionDispatch>,
    ) -> Self {
        Self {
            config,
            barrier,
            functions,
        }
    }

    /// Fetch de-conflicted matches for the given profiles.
    ///
    /// One concurrent, deadline-bounded call per profile target. A target
    /// whose call errors, times out or returns garbage contributes zero
    /// proposals and the round proceeds; if every target fails the round
    /// still submits an empty list so the cycle is never blocked on us.
    ///
    /// The round body runs in its own task: a caller that stops waiting
    /// (drops this future) never abandons a registered round; the cycle
    /// still receives a submission to drain.
    pub async fn fetch_matches(
        &self,
        profiles: Vec<MatchProfile>,
    ) -> Result<Vec<Match>, OrchestratorError> {
        let barrier = Arc::clone(&self.barrier);
        let functions = Arc::clone(&self.functions);
        let deadline = Duration::from_millis(self.config.proposal_deadline_ms);

        let round = tokio::spawn(async move {
            let round_id = barrier.acquire_round().await;

            let started = Instant::now();
            let calls = profiles.iter().map(|profile| {
                let client = functions.resolve(&profile.target);
                async move {
                    match tokio::time::timeout(deadline, client.run(profile)).await {
                        Ok(Ok(matches)) => {
                            metrics::FUNCTION_CALLS.with_label_values(&["ok"]).inc();
                            matches
                        }
                        Ok(Err(e)) => {
                            warn!(
                                function = %client.name(),
                                error = %e,
                                "match function failed; contributing no proposals"
                            );
                            metrics::FUNCTION_CALLS.with_label_values(&["error"]).inc();
                            Vec::new()
                        }
                        Err(_) => {
                            warn!(
                                function = %client.name(),
                                deadline_ms = deadline.as_millis() as u64,
                                "match function deadline exceeded; contributing no proposals"
                            );
                            metrics::FUNCTION_CALLS.with_label_values(&["timeout"]).inc();
                            Vec::new()
                        }
                    }
                }
            });
            let proposals: Vec<Match> = join_all(calls).await.into_iter().flatten().collect();

            info!(
                %round_id,
                functions_ms = started.elapsed().as_millis() as u64,
                count = proposals.len(),
                "submitting proposals for evaluation"
            );
            barrier.submit(round_id, proposals).await
        });

        round
            .await
            .map_err(|e| OrchestratorError::Internal(e.to_string()))?
            .map_err(OrchestratorError::from)
    }
}
