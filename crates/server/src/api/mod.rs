pub mod handlers;
pub mod matches;
pub mod routes;
pub mod tickets;

use serde::Serialize;

pub use routes::create_router;

/// Error body shared by every API endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
