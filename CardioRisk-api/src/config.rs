use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use cardio_risk_domain::model::DEFAULT_MODEL_PATH;

/// Port used when `PORT` is not set
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `PORT` is set but is not a valid port number
    #[error("PORT must be a number between 1 and 65535, got '{0}'")]
    InvalidPort(String),
}

/// Server configuration from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on
    pub port: u16,
    /// Location of the model artifact
    pub model_path: PathBuf,
    /// Deployment environment name reported by the health check
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            environment: "development".to_string(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => defaults.port,
        };

        let config = Self {
            port,
            model_path: lookup("MODEL_PATH").map(PathBuf::from).unwrap_or(defaults.model_path),
            environment: lookup("APP_ENV").unwrap_or(defaults.environment),
        };

        // Log validation warnings but don't fail
        if let Err(errors) = config.validate() {
            for error in &errors {
                warn!("Server configuration warning: {}", error);
            }
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !self.model_path.exists() {
            errors.push(format!("Model artifact {} does not exist", self.model_path.display()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.model_path, PathBuf::from("models/cardio_pipeline.json"));
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("MODEL_PATH", "/srv/model.json"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(config.environment, "production");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(ref p) if p == "http"));
        assert!(ServerConfig::from_lookup(lookup(&[("PORT", "0")])).is_err());
    }
}
