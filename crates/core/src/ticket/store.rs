//! Ticket storage trait.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::{Query, Ticket};

/// Errors from ticket storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed input, rejected synchronously and never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown ticket id.
    #[error("ticket not found: {0}")]
    NotFound(Uuid),
}

/// The contract any ticket storage backend must satisfy.
///
/// The in-memory reference implementation is
/// [`MemoryTicketStore`](super::MemoryTicketStore); a persistent backend
/// must provide the same semantics, in particular the reserved exclusion
/// index behavior of [`exclude`](TicketStore::exclude).
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Store a ticket and index its attributes.
    ///
    /// Fails with [`StoreError::InvalidArgument`] if the attribute map is
    /// empty. Assigns the creation timestamp. Creating an id that already
    /// exists deterministically replaces the previous record and its index
    /// entries (last write wins).
    async fn create(&self, ticket: Ticket) -> Result<Ticket, StoreError>;

    /// Bulk [`create`](TicketStore::create); validation applies per ticket
    /// and the first failure aborts the remainder.
    async fn create_many(&self, tickets: Vec<Ticket>) -> Result<Vec<Ticket>, StoreError>;

    /// Fetch a ticket by id.
    async fn get(&self, id: Uuid) -> Result<Ticket, StoreError>;

    /// Remove a ticket and all of its index entries, the reserved ones
    /// included.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Set the assignment field of the given tickets and remove them from
    /// all non-reserved indexes, so they stop matching future queries. The
    /// records themselves are kept. Unknown ids are skipped with a warning.
    async fn assign(&self, ids: &[Uuid], assignment: &str) -> Result<(), StoreError>;

    /// Hide the given tickets from queries for `duration_ms` milliseconds by
    /// inserting (or refreshing) an expiry in the reserved exclusion index.
    /// Other index membership is untouched.
    async fn exclude(&self, ids: &[Uuid], duration_ms: i64) -> Result<(), StoreError>;

    /// Range-query tickets. Fails with [`StoreError::InvalidArgument`] if
    /// the query has no filters. See [`Query`] for the intersection and
    /// missing-index semantics; ids currently excluded are subtracted from
    /// the result.
    async fn query(&self, query: &Query) -> Result<Vec<Ticket>, StoreError>;
}
