//! Test doubles and fixtures for exercising the matchmaking pipeline
//! without real match function services.

pub mod fixtures;
mod mock_function;

pub use mock_function::{MockFunctionClient, MockFunctionDispatch};
