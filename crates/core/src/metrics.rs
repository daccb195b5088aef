//! Prometheus metrics for core components.
//!
//! Registered into the server's registry at startup; callers embedding the
//! core library can register them into their own.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Barrier
// =============================================================================

/// Barrier cycles opened (idle-to-admitting transitions).
pub static BARRIER_CYCLES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("rallypoint_barrier_cycles_total", "Total barrier cycles opened").unwrap()
});

/// Rounds registered across all cycles.
pub static ROUNDS_REGISTERED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rallypoint_rounds_registered_total",
        "Total rounds registered with the barrier",
    )
    .unwrap()
});

/// Wall-clock length of each cycle's window at the moment evaluation starts.
pub static ROUND_WINDOW_MS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "rallypoint_round_window_ms",
            "Cycle window duration at evaluation start",
        )
        .buckets(vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]),
    )
    .unwrap()
});

/// Evaluation passes by outcome.
pub static EVALUATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rallypoint_evaluations_total", "Total evaluation passes"),
        &["result"], // "ok", "error"
    )
    .unwrap()
});

/// Proposals submitted to the barrier.
pub static MATCHES_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rallypoint_matches_submitted_total",
        "Total match proposals submitted for evaluation",
    )
    .unwrap()
});

/// Proposals that survived conflict resolution.
pub static MATCHES_ACCEPTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rallypoint_matches_accepted_total",
        "Total match proposals accepted by evaluation",
    )
    .unwrap()
});

// =============================================================================
// Orchestrator
// =============================================================================

/// Match function calls by outcome.
pub static FUNCTION_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rallypoint_function_calls_total", "Total match function calls"),
        &["result"], // "ok", "error", "timeout"
    )
    .unwrap()
});

// =============================================================================
// Ticket store
// =============================================================================

/// Tickets created.
pub static TICKETS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("rallypoint_tickets_created_total", "Total tickets created").unwrap()
});

/// Tickets placed in the exclusion index.
pub static TICKETS_EXCLUDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rallypoint_tickets_excluded_total",
        "Total tickets hidden behind the exclusion index",
    )
    .unwrap()
});
