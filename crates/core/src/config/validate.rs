use super::{Config, ConfigError};

/// Cross-field validation beyond what deserialization can express.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let barrier = &config.barrier;

    if barrier.min_window_ms > barrier.max_window_ms {
        return Err(ConfigError::Invalid(format!(
            "barrier.min_window_ms ({}) must not exceed barrier.max_window_ms ({})",
            barrier.min_window_ms, barrier.max_window_ms
        )));
    }
    if barrier.driver_tick_ms == 0 {
        return Err(ConfigError::Invalid(
            "barrier.driver_tick_ms must be greater than zero".to_string(),
        ));
    }
    if barrier.exclusion_cooldown_ms <= 0 {
        return Err(ConfigError::Invalid(
            "barrier.exclusion_cooldown_ms must be greater than zero".to_string(),
        ));
    }
    if config.orchestrator.proposal_deadline_ms == 0 {
        return Err(ConfigError::Invalid(
            "orchestrator.proposal_deadline_ms must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
