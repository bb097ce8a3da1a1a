use scout::{ScoutError, SimulationConfig};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] ScoutError),
}

/// Load a simulation configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load a configuration from a JSON string; missing fields take defaults
pub fn load_config_from_str(json: &str) -> Result<SimulationConfig, ConfigError> {
    let config: SimulationConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<SimulationConfig, ConfigError> {
    let default_config = include_str!("default_config.json");
    load_config_from_str(default_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout::{MarketId, Policy};

    #[test]
    fn test_default_config_matches_builtin_default() {
        let config = load_default_config().unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = load_config_from_str(r#"{"periods": 50, "policy": {"kind": "thompson"}}"#)
            .unwrap();
        assert_eq!(config.periods, 50);
        assert_eq!(config.policy, Policy::Thompson);
        assert_eq!(config.participants_per_period, 10);
        assert_eq!(config.markets.len(), 3);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_legacy_market_field_names() {
        let json = r#"{
            "markets": [
                {"market_id": 4, "mu_true": 0.5, "sigma_true": 2.0, "signal_noise_sd": 1.0}
            ]
        }"#;
        let config = load_config_from_str(json).unwrap();
        assert_eq!(config.markets[0].id, MarketId(4));
        assert_eq!(config.markets[0].true_sd, 2.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = load_config_from_str(r#"{"periods": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ScoutError::ZeroPeriods)));

        let err = load_config_from_str(r#"{"policy": {"kind": "epsilon_greedy", "epsilon": 1.5}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ScoutError::InvalidEpsilon(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = load_config_from_str("{ periods: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/scout.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
