//! Shared test fixtures.

use std::collections::HashMap;

use serde_json::json;

use crate::function::{FunctionKind, Match, MatchProfile, TargetFunction};
use crate::ticket::Ticket;

/// A ticket with a single `skill` attribute.
pub fn skill_ticket(skill: f64) -> Ticket {
    let mut attributes = HashMap::new();
    attributes.insert("skill".to_string(), skill);
    Ticket::new(attributes, json!({"name": "test player"}))
}

/// A proposal over the given tickets carrying a score.
pub fn scored_match(score: f64, tickets: Vec<Ticket>) -> Match {
    Match::new(tickets, json!({ "score": score }))
}

/// A REST profile pointing at the named (usually mocked) target.
pub fn rest_profile(target_name: &str) -> MatchProfile {
    MatchProfile {
        target: TargetFunction {
            name: target_name.to_string(),
            kind: FunctionKind::Rest,
            port: 8080,
        },
        pools: HashMap::new(),
        config: serde_json::Value::Null,
    }
}
