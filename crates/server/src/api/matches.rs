//! Match fetching API handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use rallypoint_core::{Match, MatchProfile, OrchestratorError};

use super::ErrorResponse;
use crate::state::AppState;

/// Request body for fetching matches
#[derive(Debug, Deserialize)]
pub struct FetchMatchesBody {
    /// One entry per match function to run in this round.
    pub profiles: Vec<MatchProfile>,
}

/// Response with the de-conflicted matches
#[derive(Debug, Serialize)]
pub struct FetchMatchesResponse {
    pub matches: Vec<Match>,
}

/// Run the given profiles through one synchronized evaluation round
pub async fn fetch_matches(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FetchMatchesBody>,
) -> Result<Json<FetchMatchesResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.orchestrator().fetch_matches(body.profiles).await {
        Ok(matches) => Ok(Json(FetchMatchesResponse { matches })),
        Err(e) => {
            let status = match &e {
                // A stale or late round is a caller-visible conflict, not a
                // server fault.
                OrchestratorError::Barrier(_) => StatusCode::CONFLICT,
                OrchestratorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
