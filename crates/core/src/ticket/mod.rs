//! Ticket storage: concurrent CRUD plus attribute-range queries over
//! matchmaking tickets, with a built-in time-bounded exclusion index.

mod memory;
mod store;
mod types;

pub use memory::{MemoryTicketStore, CREATED_INDEX, EXCLUSION_INDEX};
pub use store::{StoreError, TicketStore};
pub use types::{Filter, Query, Ticket};
