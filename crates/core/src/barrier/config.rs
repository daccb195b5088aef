//! Barrier configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the synchronization barrier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarrierConfig {
    /// Minimum time a cycle stays open for new rounds to join (milliseconds).
    #[serde(default = "default_min_window")]
    pub min_window_ms: u64,

    /// Hard ceiling before evaluation is forced even if some rounds never
    /// submit (milliseconds).
    #[serde(default = "default_max_window")]
    pub max_window_ms: u64,

    /// State machine polling cadence (milliseconds). A tunable, not a
    /// correctness requirement.
    #[serde(default = "default_driver_tick")]
    pub driver_tick_ms: u64,

    /// How long matched tickets stay hidden from queries (milliseconds).
    #[serde(default = "default_exclusion_cooldown")]
    pub exclusion_cooldown_ms: i64,
}

fn default_min_window() -> u64 {
    500
}

fn default_max_window() -> u64 {
    5000
}

fn default_driver_tick() -> u64 {
    50
}

fn default_exclusion_cooldown() -> i64 {
    60_000 // 1 minute
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            min_window_ms: default_min_window(),
            max_window_ms: default_max_window(),
            driver_tick_ms: default_driver_tick(),
            exclusion_cooldown_ms: default_exclusion_cooldown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BarrierConfig::default();
        assert_eq!(config.min_window_ms, 500);
        assert_eq!(config.max_window_ms, 5000);
        assert_eq!(config.driver_tick_ms, 50);
        assert_eq!(config.exclusion_cooldown_ms, 60_000);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            min_window_ms = 100
            max_window_ms = 400
        "#;
        let config: BarrierConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.min_window_ms, 100);
        assert_eq!(config.max_window_ms, 400);
        assert_eq!(config.driver_tick_ms, 50);
    }
}
