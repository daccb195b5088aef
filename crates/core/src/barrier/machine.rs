//! The windowed synchronization barrier.
//!
//! A reusable, singleton-lifetime state machine that admits a variable
//! number of concurrent rounds into a cycle, waits for all of them to
//! submit their proposed matches, runs the evaluator once over the merged
//! pool, and fans the accepted subset back out per round:
//!
//! `Idle → AdmittingRounds → AwaitingSubmissions → Evaluating → Idle`
//!
//! Transitions are driven by a dedicated ticking task started with
//! [`SyncBarrier::start`]; evaluation runs in its own transient task so the
//! driver never blocks on it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::evaluator::Evaluator;
use crate::function::Match;
use crate::metrics;
use crate::ticket::TicketStore;

use super::{BarrierConfig, BarrierError};

/// Bound on waiting for the admission gate. On timeout the caller registers
/// late (best effort, logged) instead of failing.
const ADMISSION_WAIT: Duration = Duration::from_secs(5);

/// Slack past the max window for the results wait, covering the evaluation
/// pass itself.
const RESULTS_GRACE: Duration = Duration::from_secs(5);

/// A binary gate tasks can suspend on, replacing the original design's
/// reset-event polling with watch-channel signaling.
struct Gate {
    opened: watch::Sender<bool>,
}

impl Gate {
    fn new(open: bool) -> Self {
        Self {
            opened: watch::channel(open).0,
        }
    }

    fn open(&self) {
        self.opened.send_replace(true);
    }

    fn close(&self) {
        self.opened.send_replace(false);
    }

    /// Wait until the gate opens; `false` if the bound elapsed first.
    async fn wait(&self, bound: Duration) -> bool {
        let mut rx = self.opened.subscribe();
        let result = match tokio::time::timeout(bound, rx.wait_for(|open| *open)).await {
            Ok(result) => result.is_ok(),
            Err(_) => false,
        };
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    AdmittingRounds,
    AwaitingSubmissions,
    Evaluating,
}

#[derive(Default)]
struct Round {
    submitted: bool,
    matches: Vec<Match>,
    accepted: Vec<Uuid>,
}

struct MachineState {
    phase: Phase,
    accepting_submissions: bool,
    /// Start of the current cycle's window; meaningful outside `Idle`.
    window_started: Instant,
}

struct BarrierInner {
    config: BarrierConfig,
    store: Arc<dyn TicketStore>,
    evaluator: Arc<dyn Evaluator>,
    state: Mutex<MachineState>,
    rounds: Mutex<HashMap<Uuid, Round>>,
    admission_gate: Gate,
    results_gate: Gate,
}

/// The synchronization barrier. Intended to be shared, as a single
/// instance, behind every concurrent match-fetching caller.
pub struct SyncBarrier {
    inner: Arc<BarrierInner>,
    running: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncBarrier {
    pub fn new(
        config: BarrierConfig,
        store: Arc<dyn TicketStore>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            inner: Arc::new(BarrierInner {
                config,
                store,
                evaluator,
                state: Mutex::new(MachineState {
                    phase: Phase::Idle,
                    accepting_submissions: false,
                    window_started: Instant::now(),
                }),
                rounds: Mutex::new(HashMap::new()),
                admission_gate: Gate::new(false),
                results_gate: Gate::new(false),
            }),
            running: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    /// Spawn the periodic driver task that advances the state machine.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("barrier driver already running");
            return;
        }

        let inner = Arc::clone(&self.inner);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let tick = Duration::from_millis(self.inner.config.driver_tick_ms.max(1));

        tokio::spawn(async move {
            info!(tick_ms = tick.as_millis() as u64, "barrier driver started");
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => BarrierInner::advance(&inner),
                    _ = shutdown_rx.recv() => {
                        info!("barrier driver stopped");
                        break;
                    }
                }
            }
        });
    }

    /// Stop the driver task. Rounds already in flight still complete: the
    /// evaluation task, once spawned, opens the results gate on its own.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("barrier driver not running");
            return;
        }
        let _ = self.shutdown_tx.send(());
    }

    /// Register for the current cycle and get a round id back.
    ///
    /// The first caller to find the machine idle starts a new cycle:
    /// bookkeeping from the previous cycle is fully drained before reuse,
    /// admission opens, results close, and the window clock restarts.
    /// Everyone then waits (bounded) for admission before registering.
    pub async fn acquire_round(&self) -> Uuid {
        let started = Instant::now();
        {
            let mut state = self.inner.state.lock().unwrap();
            if state.phase == Phase::Idle {
                self.inner.rounds.lock().unwrap().clear();
                state.phase = Phase::AdmittingRounds;
                state.accepting_submissions = true;
                state.window_started = Instant::now();
                self.inner.results_gate.close();
                self.inner.admission_gate.open();
                metrics::BARRIER_CYCLES.inc();
                debug!("barrier cycle opened");
            }
        }

        if !self.inner.admission_gate.wait(ADMISSION_WAIT).await {
            // Proceeding anyway: a late registration is only guaranteed a
            // result once it re-acquires in a later cycle.
            warn!("admission gate wait timed out; registering late");
        }

        let round_id = Uuid::new_v4();
        self.inner
            .rounds
            .lock()
            .unwrap()
            .insert(round_id, Round::default());
        metrics::ROUNDS_REGISTERED.inc();
        debug!(%round_id, wait_ms = started.elapsed().as_millis() as u64, "round acquired");
        round_id
    }

    /// Hand this round's proposals to the cycle and wait for the evaluated
    /// result: the subset of `matches` that survived conflict resolution
    /// against every other round in the cycle.
    pub async fn submit(
        &self,
        round_id: Uuid,
        matches: Vec<Match>,
    ) -> Result<Vec<Match>, BarrierError> {
        {
            let state = self.inner.state.lock().unwrap();
            let mut rounds = self.inner.rounds.lock().unwrap();
            let round = rounds
                .get_mut(&round_id)
                .ok_or(BarrierError::RoundNotFound(round_id))?;
            if !state.accepting_submissions {
                return Err(BarrierError::SubmissionsClosed);
            }
            round.submitted = true;
            round.matches = matches.clone();
        }
        metrics::MATCHES_SUBMITTED.inc_by(matches.len() as u64);
        debug!(%round_id, count = matches.len(), "round submitted");

        let bound = Duration::from_millis(self.inner.config.max_window_ms) + RESULTS_GRACE;
        if !self.inner.results_gate.wait(bound).await {
            warn!(%round_id, "results gate wait timed out; returning best-effort results");
        }

        let accepted: HashSet<Uuid> = {
            let rounds = self.inner.rounds.lock().unwrap();
            rounds
                .get(&round_id)
                .map(|round| round.accepted.iter().copied().collect())
                .unwrap_or_default()
        };
        Ok(matches
            .into_iter()
            .filter(|m| accepted.contains(&m.id))
            .collect())
    }
}

impl BarrierInner {
    /// One driver tick. Lock order is state, then rounds, everywhere.
    fn advance(inner: &Arc<BarrierInner>) {
        let mut state = inner.state.lock().unwrap();
        match state.phase {
            Phase::Idle | Phase::Evaluating => {}
            Phase::AdmittingRounds => {
                let elapsed = state.window_started.elapsed().as_millis() as u64;
                if elapsed >= inner.config.min_window_ms {
                    debug!(elapsed_ms = elapsed, "min window passed; admission closed");
                    state.phase = Phase::AwaitingSubmissions;
                    inner.admission_gate.close();
                    // Re-check immediately: every round may already be in.
                    Self::maybe_evaluate(inner, &mut state);
                }
            }
            Phase::AwaitingSubmissions => Self::maybe_evaluate(inner, &mut state),
        }
    }

    fn maybe_evaluate(inner: &Arc<BarrierInner>, state: &mut MachineState) {
        let elapsed = state.window_started.elapsed().as_millis() as u64;
        let max_window_exceeded = elapsed >= inner.config.max_window_ms;
        let all_in = {
            let rounds = inner.rounds.lock().unwrap();
            // An empty round set means the cycle opener has not finished
            // registering yet; a window no one joined is not "all in".
            !rounds.is_empty() && rounds.values().all(|round| round.submitted)
        };

        if !(max_window_exceeded || all_in) {
            return;
        }
        if max_window_exceeded {
            debug!(elapsed_ms = elapsed, "max window exceeded; moving to evaluation");
        } else {
            debug!(elapsed_ms = elapsed, "all rounds reported in; moving to evaluation");
        }

        state.phase = Phase::Evaluating;
        state.accepting_submissions = false;
        metrics::ROUND_WINDOW_MS.observe(elapsed as f64);
        tokio::spawn(Self::run_evaluation(Arc::clone(inner)));
    }

    /// Runs in its own task, in parallel with the driver. Whatever happens
    /// here, the results gate must open and the machine must return to
    /// idle, or every waiting round hangs.
    async fn run_evaluation(inner: Arc<BarrierInner>) {
        // Merge every round's proposals into one pool, remembering which
        // round each proposal came from.
        let (pool, origin) = {
            let rounds = inner.rounds.lock().unwrap();
            let mut pool = Vec::new();
            let mut origin: HashMap<Uuid, Uuid> = HashMap::new();
            for (round_id, round) in rounds.iter() {
                for m in &round.matches {
                    origin.insert(m.id, *round_id);
                    pool.push(m.clone());
                }
            }
            (pool, origin)
        };

        let accepted = match inner.evaluator.evaluate(pool).await {
            Ok(accepted) => {
                metrics::EVALUATIONS_TOTAL.with_label_values(&["ok"]).inc();
                accepted
            }
            Err(e) => {
                error!(error = %e, "evaluation failed; no matches accepted this cycle");
                metrics::EVALUATIONS_TOTAL.with_label_values(&["error"]).inc();
                Vec::new()
            }
        };

        // Hide the winners from queries so the next cycle cannot hand the
        // same tickets out again while assignment is under way.
        let ticket_ids: Vec<Uuid> = accepted.iter().flat_map(Match::ticket_ids).collect();
        if !ticket_ids.is_empty() {
            if let Err(e) = inner
                .store
                .exclude(&ticket_ids, inner.config.exclusion_cooldown_ms)
                .await
            {
                error!(error = %e, "failed to exclude matched tickets");
            }
        }
        metrics::MATCHES_ACCEPTED.inc_by(accepted.len() as u64);

        {
            let mut rounds = inner.rounds.lock().unwrap();
            for m in &accepted {
                if let Some(round) = origin.get(&m.id).and_then(|id| rounds.get_mut(id)) {
                    round.accepted.push(m.id);
                }
            }
        }

        inner.state.lock().unwrap().phase = Phase::Idle;
        inner.results_gate.open();
        debug!(
            accepted = accepted.len(),
            tickets_taken = ticket_ids.len(),
            "evaluation completed; results released"
        );
    }
}
