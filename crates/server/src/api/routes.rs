use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::{handlers, matches, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Ticket lifecycle
        .route("/tickets", post(tickets::create_ticket))
        .route("/tickets/bulk", post(tickets::create_tickets))
        .route("/tickets/query", post(tickets::query_tickets))
        .route("/tickets/assign", post(tickets::assign_tickets))
        .route("/tickets/{id}", get(tickets::get_ticket))
        .route("/tickets/{id}", delete(tickets::delete_ticket))
        // Match fetching
        .route("/matches", post(matches::fetch_matches))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
