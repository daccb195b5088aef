//! Core ticket data types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A matchmaking unit (a player or a pre-made group) with queryable numeric
/// attributes.
///
/// Owned by the [`TicketStore`](super::TicketStore) once created: everything
/// except the assignment field and index membership is immutable after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Identifier tracked by clients.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Numeric attributes the store indexes for range queries.
    /// At least one is required at creation.
    pub attributes: HashMap<String, f64>,

    /// Opaque caller-supplied payload. Not interpreted by the core.
    #[serde(default)]
    pub properties: serde_json::Value,

    /// Milliseconds since the unix epoch, assigned by the store at creation.
    #[serde(default)]
    pub created: i64,

    /// Connection/session information populated by a backend once the ticket
    /// has been matched. Empty until set.
    #[serde(default)]
    pub assignment: String,
}

impl Ticket {
    /// Create a ticket with a fresh id. The creation timestamp is assigned
    /// by the store, not here.
    pub fn new(attributes: HashMap<String, f64>, properties: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            attributes,
            properties,
            created: 0,
            assignment: String::new(),
        }
    }
}

/// A range predicate over one ticket attribute.
///
/// Both bounds are **inclusive**: a ticket with `attribute == max` matches.
/// (An earlier layer of the system documented the upper bound as exclusive
/// while applying it inclusively; the inclusive behavior is the contract.)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    /// The attribute to query.
    pub attribute: String,
    /// Minimum value, inclusive.
    pub min: f64,
    /// Maximum value, inclusive.
    pub max: f64,
}

impl Filter {
    pub fn new(attribute: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            attribute: attribute.into(),
            min,
            max,
        }
    }

    /// Whether a value falls inside this filter's range.
    pub fn matches(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A ticket search: the intersection (AND) of all filter hits.
///
/// At least one filter is required. A filter naming an attribute no ticket
/// has ever carried contributes no hits and never narrows the result; a
/// query where *no* filter references an existing index yields an empty
/// result, not all tickets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
}

impl Query {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let filter = Filter::new("skill", 10.0, 20.0);
        assert!(filter.matches(10.0));
        assert!(filter.matches(20.0));
        assert!(filter.matches(15.0));
        assert!(!filter.matches(9.999));
        assert!(!filter.matches(20.001));
    }

    #[test]
    fn test_ticket_deserialize_minimal() {
        let json = r#"{"attributes": {"skill": 42.0}}"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.attributes["skill"], 42.0);
        assert!(ticket.assignment.is_empty());
        assert_eq!(ticket.created, 0);
        assert!(ticket.properties.is_null());
    }
}
