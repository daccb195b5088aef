//! Types for the match function system.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ticket::{Filter, Ticket};

/// A candidate grouping of tickets proposed by a match function.
///
/// The opaque `properties` document must expose a numeric `score` field;
/// the evaluator orders competing proposals by it. Matches are consumed by
/// one evaluation round and discarded afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// The tickets this proposal would consume.
    pub tickets: Vec<Ticket>,

    /// Scored payload produced by the match function, returned to the
    /// caller untouched.
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl Match {
    pub fn new(tickets: Vec<Ticket>, properties: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            tickets,
            properties,
        }
    }

    /// The numeric score, if the properties carry a usable one.
    pub fn score(&self) -> Option<f64> {
        self.properties.get("score").and_then(serde_json::Value::as_f64)
    }

    pub fn ticket_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.tickets.iter().map(|ticket| ticket.id)
    }
}

/// A named set of hard filters a match function draws candidates from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    pub filters: Vec<Filter>,
}

/// Transports a match function can be reached over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Rest,
    // Future: Grpc
}

/// Where a match function lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetFunction {
    /// Hostname of the function service.
    pub name: String,
    pub kind: FunctionKind,
    #[serde(default = "default_function_port")]
    pub port: u16,
}

fn default_function_port() -> u16 {
    8080
}

/// One requested target: the function to run plus the ticket pools and
/// opaque configuration it runs with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchProfile {
    pub target: TargetFunction,

    /// Pool name to the filters defining it. Forwarded to the function,
    /// which queries the ticket store through its own data access.
    pub pools: HashMap<String, Vec<Filter>>,

    /// Opaque function configuration, forwarded verbatim.
    #[serde(default)]
    pub config: serde_json::Value,
}

/// Errors from a single match function call. All of these degrade that
/// target's contribution to zero proposals; none of them fails a round.
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("match function unavailable: {0}")]
    Unavailable(String),

    #[error("match function returned a malformed response: {0}")]
    Malformed(String),

    #[error("match function call timed out")]
    Timeout,
}

/// Trait for match function transports.
#[async_trait]
pub trait FunctionClient: Send + Sync {
    /// Target name for logging.
    fn name(&self) -> &str;

    /// Run the function for one profile and collect its proposed matches.
    async fn run(&self, profile: &MatchProfile) -> Result<Vec<Match>, FunctionError>;
}
