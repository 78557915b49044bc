use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cache_backend: CacheBackend,
    /// Required when `cache_backend` is `Sqlite`.
    pub database_path: Option<String>,
    pub snapshot_path: String,
    pub apr_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let cache_backend = match env_map
            .get("CACHE_BACKEND")
            .map(|s| s.as_str())
            .unwrap_or("sqlite")
        {
            "memory" => CacheBackend::Memory,
            "sqlite" => CacheBackend::Sqlite,
            other => {
                return Err(ConfigError::InvalidValue(
                    "CACHE_BACKEND".to_string(),
                    format!("must be memory or sqlite, got {}", other),
                ))
            }
        };

        let database_path = env_map.get("DATABASE_PATH").cloned();
        if cache_backend == CacheBackend::Sqlite && database_path.is_none() {
            return Err(ConfigError::MissingEnv("DATABASE_PATH".to_string()));
        }

        let snapshot_path = env_map
            .get("SNAPSHOT_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("SNAPSHOT_PATH".to_string()))?;

        let apr_enabled = env_map
            .get("APR_ENABLED")
            .map(|s| s.as_str())
            .unwrap_or("true")
            .parse::<bool>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "APR_ENABLED".to_string(),
                    "must be true or false".to_string(),
                )
            })?;

        Ok(Config {
            cache_backend,
            database_path,
            snapshot_path,
            apr_enabled,
        })
    }
}
