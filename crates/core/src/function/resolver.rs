//! Transport dispatch for match function targets.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::{FunctionClient, FunctionKind, RestFunctionClient, TargetFunction};

/// Maps a match function target to a transport client.
///
/// The orchestrator depends on this seam instead of a concrete resolver so
/// tests can hand it canned clients.
pub trait FunctionDispatch: Send + Sync {
    fn resolve(&self, target: &TargetFunction) -> Arc<dyn FunctionClient>;
}

/// Resolves a [`TargetFunction`] to a concrete transport client.
///
/// Dispatch happens on the target's declared kind, once per distinct
/// target: resolved clients are cached and reused across rounds, all
/// sharing one connection pool.
pub struct FunctionResolver {
    client: Client,
    resolved: Mutex<HashMap<String, Arc<dyn FunctionClient>>>,
}

impl FunctionResolver {
    /// `call_timeout` caps a single function call at the transport level;
    /// the orchestrator applies its own overall deadline on top.
    pub fn new(call_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(call_timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            resolved: Mutex::new(HashMap::new()),
        }
    }
}

impl FunctionDispatch for FunctionResolver {
    fn resolve(&self, target: &TargetFunction) -> Arc<dyn FunctionClient> {
        let key = format!("{:?}://{}:{}", target.kind, target.name, target.port);
        let mut resolved = self.resolved.lock().unwrap();
        if let Some(client) = resolved.get(&key) {
            return Arc::clone(client);
        }

        debug!(target = %target.name, kind = ?target.kind, "resolving match function client");
        let client: Arc<dyn FunctionClient> = match target.kind {
            FunctionKind::Rest => {
                Arc::new(RestFunctionClient::new(self.client.clone(), target))
            }
        };
        resolved.insert(key, Arc::clone(&client));
        client
    }
}
