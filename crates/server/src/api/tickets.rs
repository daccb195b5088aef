//! Ticket API handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rallypoint_core::{Query, StoreError, Ticket};

use super::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    /// Client-chosen id; generated when omitted.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Numeric attributes to index (at least one required).
    pub attributes: HashMap<String, f64>,
    /// Opaque payload stored with the ticket.
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl From<CreateTicketBody> for Ticket {
    fn from(body: CreateTicketBody) -> Self {
        let mut ticket = Ticket::new(body.attributes, body.properties);
        if let Some(id) = body.id {
            ticket.id = id;
        }
        ticket
    }
}

/// Request body for bulk ticket creation
#[derive(Debug, Deserialize)]
pub struct CreateTicketsBody {
    pub tickets: Vec<CreateTicketBody>,
}

/// Request body for assigning tickets
#[derive(Debug, Deserialize)]
pub struct AssignTicketsBody {
    pub ticket_ids: Vec<Uuid>,
    pub assignment: String,
}

/// Response for ticket queries
#[derive(Debug, Serialize)]
pub struct QueryTicketsResponse {
    pub tickets: Vec<Ticket>,
}

fn error_response(e: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<Ticket>), (StatusCode, Json<ErrorResponse>)> {
    match state.store().create(body.into()).await {
        Ok(ticket) => Ok((StatusCode::CREATED, Json(ticket))),
        Err(e) => Err(error_response(e)),
    }
}

/// Create a batch of tickets
pub async fn create_tickets(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketsBody>,
) -> Result<(StatusCode, Json<Vec<Ticket>>), (StatusCode, Json<ErrorResponse>)> {
    let tickets = body.tickets.into_iter().map(Ticket::from).collect();
    match state.store().create_many(tickets).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created))),
        Err(e) => Err(error_response(e)),
    }
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().get(id).await {
        Ok(ticket) => Ok(Json(ticket)),
        Err(e) => Err(error_response(e)),
    }
}

/// Delete a ticket by ID
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.store().delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(error_response(e)),
    }
}

/// Range-query tickets
pub async fn query_tickets(
    State(state): State<Arc<AppState>>,
    Json(query): Json<Query>,
) -> Result<Json<QueryTicketsResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().query(&query).await {
        Ok(tickets) => Ok(Json(QueryTicketsResponse { tickets })),
        Err(e) => Err(error_response(e)),
    }
}

/// Assign tickets and stop them matching future queries
pub async fn assign_tickets(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssignTicketsBody>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state
        .store()
        .assign(&body.ticket_ids, &body.assignment)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(error_response(e)),
    }
}
