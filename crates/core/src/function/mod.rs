//! External match functions: the proposal-source capability the
//! orchestrator fans out to, plus the REST transport and its resolver.

mod resolver;
mod rest;
mod types;

pub use resolver::{FunctionDispatch, FunctionResolver};
pub use rest::RestFunctionClient;
pub use types::{
    FunctionClient, FunctionError, FunctionKind, Match, MatchProfile, Pool, TargetFunction,
};
