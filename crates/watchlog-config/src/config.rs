use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::ConfigError;

/// Optional `config.toml`. Every field has a default so a missing file is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Pause after every lookup, to stay under the API rate limit.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_month_locale")]
    pub month_locale: String,
    /// Viewers expected in the log; anyone else is imported but warned about.
    #[serde(default = "default_known_viewers")]
    pub known_viewers: Vec<String>,
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_table")]
    pub table: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `import-<unix-seconds>-<random>`; every run inserts fresh rows.
    #[default]
    Timestamped,
    /// `import-<year>-<month>-<slug>`; re-running skips rows already present.
    Content,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::Timestamped => "timestamped",
            IdStrategy::Content => "content",
        }
    }
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_language() -> String {
    "fi-FI".to_string()
}

fn default_request_delay_ms() -> u64 {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_source() -> String {
    "import".to_string()
}

fn default_month_locale() -> String {
    "fi".to_string()
}

fn default_known_viewers() -> Vec<String> {
    ["Tomi", "Mikkis", "Aino", "Mari"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_table() -> String {
    "movies".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_tmdb_base_url(),
            language: default_language(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            month_locale: default_month_locale(),
            known_viewers: default_known_viewers(),
            id_strategy: IdStrategy::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { table: default_table() }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Missing file means defaults; a file that exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tmdb.language.trim().is_empty() {
            return Err(ConfigError::Invalid("tmdb.language cannot be empty".to_string()));
        }
        if self.tmdb.request_delay_ms > 10_000 {
            return Err(ConfigError::Invalid(format!(
                "tmdb.request_delay_ms is {} ms, the limit is 10000",
                self.tmdb.request_delay_ms
            )));
        }
        if self.import.source.trim().is_empty() {
            return Err(ConfigError::Invalid("import.source cannot be empty".to_string()));
        }
        if self.import.month_locale.trim().is_empty() {
            return Err(ConfigError::Invalid("import.month_locale cannot be empty".to_string()));
        }

        // Table name is interpolated into SQL, so only plain identifiers are accepted
        let table = &self.database.table;
        let valid_table = !table.is_empty()
            && !table.starts_with(|c: char| c.is_ascii_digit())
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_table {
            return Err(ConfigError::Invalid(format!("database.table '{}' is not a plain identifier", table)));
        }

        Ok(())
    }
}
