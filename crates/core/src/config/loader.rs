use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("RALLYPOINT_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_str_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.barrier.min_window_ms, 500);
        assert_eq!(config.orchestrator.proposal_deadline_ms, 60_000);
    }

    #[test]
    fn test_load_config_from_str_overrides() {
        let toml = r#"
[server]
port = 9000

[barrier]
min_window_ms = 250
max_window_ms = 2000

[orchestrator]
proposal_deadline_ms = 15000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.barrier.min_window_ms, 250);
        assert_eq!(config.barrier.max_window_ms, 2000);
        assert_eq!(config.orchestrator.proposal_deadline_ms, 15_000);
    }

    #[test]
    fn test_load_config_from_str_malformed() {
        let result = load_config_from_str("[barrier]\nmin_window_ms = \"soon\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
