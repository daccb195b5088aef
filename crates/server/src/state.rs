use std::sync::Arc;

use rallypoint_core::{Config, MatchOrchestrator, TicketStore};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn TicketStore>,
    orchestrator: Arc<MatchOrchestrator>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn TicketStore>,
        orchestrator: Arc<MatchOrchestrator>,
    ) -> Self {
        Self {
            config,
            store,
            orchestrator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn TicketStore> {
        &self.store
    }

    pub fn orchestrator(&self) -> &MatchOrchestrator {
        &self.orchestrator
    }
}
