//! In-memory reference implementation of the ticket store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::metrics;

use super::{Query, StoreError, Ticket, TicketStore};

/// Reserved index hiding recently-matched tickets from queries until an
/// expiry timestamp (the stored value, in epoch milliseconds) passes.
pub const EXCLUSION_INDEX: &str = "awaiting-assignment";

/// Built-in index keyed by creation timestamp, maintained like any user
/// attribute index.
pub const CREATED_INDEX: &str = "created";

/// One ordered index per attribute name. The `Arc` lets queries clone a
/// handle and copy the map without holding the index-map lock.
type Index = Arc<Mutex<BTreeMap<Uuid, f64>>>;

/// Concurrent in-memory ticket store with per-attribute range indexes.
///
/// Each index is protected by its own mutex; queries copy every index under
/// its lock (bounding snapshot skew to a single index) and then intersect
/// the copies lock-free. Cross-attribute intersection may therefore observe
/// slightly different instants, which the query contract allows.
#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: RwLock<HashMap<Uuid, Ticket>>,
    indexes: RwLock<HashMap<String, Index>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or atomically create the index for an attribute. The entry API
    /// under the write lock makes concurrent first-use of an attribute safe.
    fn index(&self, name: &str) -> Index {
        if let Some(index) = self.indexes.read().unwrap().get(name) {
            return Arc::clone(index);
        }
        let mut indexes = self.indexes.write().unwrap();
        Arc::clone(indexes.entry(name.to_string()).or_default())
    }

    fn index_if_present(&self, name: &str) -> Option<Index> {
        self.indexes.read().unwrap().get(name).map(Arc::clone)
    }

    fn add_ticket_indexes(&self, ticket: &Ticket) {
        for (attribute, value) in &ticket.attributes {
            self.index(attribute).lock().unwrap().insert(ticket.id, *value);
        }
        self.index(CREATED_INDEX)
            .lock()
            .unwrap()
            .insert(ticket.id, ticket.created as f64);
    }

    /// Remove a ticket from every non-reserved index it belongs to: its
    /// attribute indexes plus the built-in created index.
    fn remove_ticket_indexes(&self, ticket: &Ticket) {
        for attribute in ticket.attributes.keys() {
            if let Some(index) = self.index_if_present(attribute) {
                index.lock().unwrap().remove(&ticket.id);
            }
        }
        if let Some(index) = self.index_if_present(CREATED_INDEX) {
            index.lock().unwrap().remove(&ticket.id);
        }
    }

    /// Copy every index under its own lock. Queries work on the copies.
    fn snapshot_indexes(&self) -> HashMap<String, BTreeMap<Uuid, f64>> {
        let indexes = self.indexes.read().unwrap();
        indexes
            .iter()
            .map(|(name, index)| (name.clone(), index.lock().unwrap().clone()))
            .collect()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn create(&self, ticket: Ticket) -> Result<Ticket, StoreError> {
        if ticket.attributes.is_empty() {
            return Err(StoreError::InvalidArgument(
                "ticket must have at least one attribute to index".to_string(),
            ));
        }

        let ticket = Ticket {
            created: Utc::now().timestamp_millis(),
            ..ticket
        };

        // Last write wins on duplicate ids: drop the previous record's
        // index entries before indexing the replacement.
        let previous = self
            .tickets
            .write()
            .unwrap()
            .insert(ticket.id, ticket.clone());
        if let Some(previous) = previous {
            debug!(ticket_id = %ticket.id, "replacing existing ticket");
            self.remove_ticket_indexes(&previous);
        }
        self.add_ticket_indexes(&ticket);

        metrics::TICKETS_CREATED.inc();
        Ok(ticket)
    }

    async fn create_many(&self, tickets: Vec<Ticket>) -> Result<Vec<Ticket>, StoreError> {
        let mut created = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            created.push(self.create(ticket).await?);
        }
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Ticket, StoreError> {
        self.tickets
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let ticket = self
            .tickets
            .write()
            .unwrap()
            .remove(&id)
            .ok_or(StoreError::NotFound(id))?;

        self.remove_ticket_indexes(&ticket);
        if let Some(index) = self.index_if_present(EXCLUSION_INDEX) {
            index.lock().unwrap().remove(&id);
        }
        Ok(())
    }

    async fn assign(&self, ids: &[Uuid], assignment: &str) -> Result<(), StoreError> {
        for id in ids {
            let ticket = self.tickets.read().unwrap().get(id).cloned();
            let Some(ticket) = ticket else {
                warn!(ticket_id = %id, "assign skipped unknown ticket");
                continue;
            };
            self.remove_ticket_indexes(&ticket);
            if let Some(ticket) = self.tickets.write().unwrap().get_mut(id) {
                ticket.assignment = assignment.to_string();
            }
        }
        debug!(count = ids.len(), assignment, "tickets assigned");
        Ok(())
    }

    async fn exclude(&self, ids: &[Uuid], duration_ms: i64) -> Result<(), StoreError> {
        let expiry = (Utc::now().timestamp_millis() + duration_ms) as f64;
        let index = self.index(EXCLUSION_INDEX);
        let mut index = index.lock().unwrap();
        for id in ids {
            index.insert(*id, expiry);
        }
        metrics::TICKETS_EXCLUDED.inc_by(ids.len() as u64);
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Ticket>, StoreError> {
        if query.filters.is_empty() {
            return Err(StoreError::InvalidArgument(
                "query must have at least one filter".to_string(),
            ));
        }

        let indexes = self.snapshot_indexes();

        // A filter over an attribute with no index contributes no hit list
        // and never narrows the result.
        let mut hits: Vec<Vec<Uuid>> = Vec::new();
        for filter in &query.filters {
            if let Some(index) = indexes.get(&filter.attribute) {
                hits.push(
                    index
                        .iter()
                        .filter(|(_, value)| filter.matches(**value))
                        .map(|(id, _)| *id)
                        .collect(),
                );
            }
        }

        // No filter referenced an existing index: empty result, not all
        // tickets.
        let Some(mut pool) = hits.first().cloned() else {
            return Ok(Vec::new());
        };
        for hit in &hits[1..] {
            let keep: HashSet<&Uuid> = hit.iter().collect();
            pool.retain(|id| keep.contains(id));
        }

        if let Some(exclusions) = indexes.get(EXCLUSION_INDEX) {
            let now = Utc::now().timestamp_millis() as f64;
            let ignored: HashSet<&Uuid> = exclusions
                .iter()
                .filter(|(_, expiry)| **expiry >= now)
                .map(|(id, _)| id)
                .collect();
            pool.retain(|id| !ignored.contains(id));
        }

        // Tickets deleted between the snapshot and this lookup drop out.
        let tickets = self.tickets.read().unwrap();
        Ok(pool.iter().filter_map(|id| tickets.get(id).cloned()).collect())
    }
}
