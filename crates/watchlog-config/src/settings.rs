use crate::config::Config;
use crate::env_file::{EnvFile, POSTGRES_URL_KEY, TMDB_API_KEY_KEY};
use crate::error::ConfigError;

/// Resolved configuration for one run, handed explicitly to every stage.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub config: Config,
}

impl Settings {
    pub fn resolve(env: &EnvFile, config: Config) -> Self {
        Self {
            database_url: env.get_or_env(POSTGRES_URL_KEY),
            tmdb_api_key: env.get_or_env(TMDB_API_KEY_KEY),
            config,
        }
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing { key: POSTGRES_URL_KEY })
    }

    pub fn tmdb_api_key(&self) -> Result<&str, ConfigError> {
        self.tmdb_api_key
            .as_deref()
            .ok_or(ConfigError::Missing { key: TMDB_API_KEY_KEY })
    }
}
