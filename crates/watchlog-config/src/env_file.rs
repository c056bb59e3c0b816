use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};
use crate::error::ConfigError;

pub const POSTGRES_URL_KEY: &str = "POSTGRES_URL";
pub const TMDB_API_KEY_KEY: &str = "TMDB_API_KEY";

/// `KEY=VALUE` file such as `.env.local`.
#[derive(Debug, Default, Clone)]
pub struct EnvFile {
    values: HashMap<String, String>,
}

impl EnvFile {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let env = Self::parse(&content);
        debug!("Loaded {} key(s) from {}", env.values.len(), path.display());
        Ok(env)
    }

    /// Loading failures are logged and yield an empty file; missing keys surface later.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(env) => env,
            Err(e) => {
                warn!("Error loading {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut values = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_string(), unquote(value.trim()).to_string());
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// File value first, then the process environment.
    pub fn get_or_env(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
