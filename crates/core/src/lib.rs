//! Core library for rallypoint, a batch-synchronized matchmaking backend.
//!
//! Concurrent callers ask for matches; their proposals are collected into
//! synchronized evaluation rounds by the [`barrier`], de-conflicted by the
//! [`evaluator`], and the winning tickets are temporarily hidden from the
//! [`ticket`] store so no two rounds hand out the same players.

pub mod barrier;
pub mod config;
pub mod evaluator;
pub mod function;
pub mod metrics;
pub mod orchestrator;
pub mod testing;
pub mod ticket;

pub use barrier::{BarrierConfig, BarrierError, SyncBarrier};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServerConfig,
};
pub use evaluator::{Evaluator, EvaluatorError, ScoreEvaluator};
pub use function::{
    FunctionClient, FunctionDispatch, FunctionError, FunctionKind, FunctionResolver, Match,
    MatchProfile, Pool, RestFunctionClient, TargetFunction,
};
pub use orchestrator::{MatchOrchestrator, OrchestratorConfig, OrchestratorError};
pub use ticket::{Filter, MemoryTicketStore, Query, StoreError, Ticket, TicketStore};
