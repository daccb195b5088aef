//! Prometheus registry and text rendering for the `/metrics` endpoint.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::error;

use rallypoint_core::metrics as core;

/// Global metrics registry holding every core collector.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(core::BARRIER_CYCLES.clone()))
        .unwrap();
    registry
        .register(Box::new(core::ROUNDS_REGISTERED.clone()))
        .unwrap();
    registry
        .register(Box::new(core::ROUND_WINDOW_MS.clone()))
        .unwrap();
    registry
        .register(Box::new(core::EVALUATIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(core::MATCHES_SUBMITTED.clone()))
        .unwrap();
    registry
        .register(Box::new(core::MATCHES_ACCEPTED.clone()))
        .unwrap();
    registry
        .register(Box::new(core::FUNCTION_CALLS.clone()))
        .unwrap();
    registry
        .register(Box::new(core::TICKETS_CREATED.clone()))
        .unwrap();
    registry
        .register(Box::new(core::TICKETS_EXCLUDED.clone()))
        .unwrap();
}

/// Render all registered metrics in the Prometheus text format.
pub fn render() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
