//! Mock match function for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::function::{
    FunctionClient, FunctionDispatch, FunctionError, Match, MatchProfile, TargetFunction,
};

/// Mock implementation of the `FunctionClient` trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable match proposals
/// - Fail the next call with a chosen error
/// - Simulate slow functions with an artificial delay
/// - Record every profile it was run with, for assertions
pub struct MockFunctionClient {
    name: String,
    matches: RwLock<Vec<Match>>,
    next_error: RwLock<Option<FunctionError>>,
    delay: RwLock<Option<Duration>>,
    runs: RwLock<Vec<MatchProfile>>,
}

impl MockFunctionClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matches: RwLock::new(Vec::new()),
            next_error: RwLock::new(None),
            delay: RwLock::new(None),
            runs: RwLock::new(Vec::new()),
        }
    }

    /// Configure the proposals every subsequent run returns.
    pub async fn set_matches(&self, matches: Vec<Match>) {
        *self.matches.write().await = matches;
    }

    /// Fail the next run with this error (one-shot).
    pub async fn set_next_error(&self, error: FunctionError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every run by this much before responding.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Profiles this client has been run with, in call order.
    pub async fn recorded_runs(&self) -> Vec<MatchProfile> {
        self.runs.read().await.clone()
    }
}

#[async_trait]
impl FunctionClient for MockFunctionClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, profile: &MatchProfile) -> Result<Vec<Match>, FunctionError> {
        self.runs.write().await.push(profile.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.matches.read().await.clone())
    }
}

/// Test dispatch mapping target names to registered mock clients.
///
/// Resolving a target no client was registered for yields a client whose
/// every run fails with [`FunctionError::Unavailable`], mirroring an
/// unreachable function service.
#[derive(Default)]
pub struct MockFunctionDispatch {
    clients: std::sync::RwLock<HashMap<String, Arc<dyn FunctionClient>>>,
}

impl MockFunctionDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, client: Arc<dyn FunctionClient>) {
        self.clients.write().unwrap().insert(name.into(), client);
    }
}

impl FunctionDispatch for MockFunctionDispatch {
    fn resolve(&self, target: &TargetFunction) -> Arc<dyn FunctionClient> {
        if let Some(client) = self.clients.read().unwrap().get(&target.name) {
            return Arc::clone(client);
        }
        Arc::new(UnreachableFunction {
            name: target.name.clone(),
        })
    }
}

struct UnreachableFunction {
    name: String,
}

#[async_trait]
impl FunctionClient for UnreachableFunction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _profile: &MatchProfile) -> Result<Vec<Match>, FunctionError> {
        Err(FunctionError::Unavailable(format!(
            "no mock registered for {}",
            self.name
        )))
    }
}
