pub mod config;
pub mod env_file;
pub mod error;
pub mod paths;
pub mod settings;

pub use config::{Config, DatabaseConfig, IdStrategy, ImportConfig, TmdbConfig};
pub use env_file::{EnvFile, POSTGRES_URL_KEY, TMDB_API_KEY_KEY};
pub use error::ConfigError;
pub use paths::PathManager;
pub use settings::Settings;
