//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the match orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Ceiling on a single match function call (milliseconds). Caller
    /// cancellation can shorten the effective deadline but never lengthens
    /// it past this.
    #[serde(default = "default_proposal_deadline")]
    pub proposal_deadline_ms: u64,
}

fn default_proposal_deadline() -> u64 {
    60_000 // 1 minute
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            proposal_deadline_ms: default_proposal_deadline(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(OrchestratorConfig::default().proposal_deadline_ms, 60_000);
    }

    #[test]
    fn test_deserialize_empty() {
        let config: OrchestratorConfig = toml::from_str("").unwrap();
        assert_eq!(config.proposal_deadline_ms, 60_000);
    }
}
