use anyhow::Result;
use std::path::PathBuf;

/// Name of the key-value file holding connection secrets, looked up in the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env.local";

/// Base path override, mainly for containers.
fn base_path_override() -> Option<PathBuf> {
    std::env::var("WATCHLOG_BASE_PATH").ok().map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("watchlog");

        Ok(Self::from_base(base_dir))
    }

    pub fn from_base(base: PathBuf) -> Self {
        Self {
            log_dir: base.join("logs"),
            config_dir: base,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Used by `--log-to-file`; the appender creates the directory.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("watchlog.log")
    }

    pub fn env_file(&self) -> PathBuf {
        PathBuf::from(DEFAULT_ENV_FILE)
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = base_path_override() {
            return Self::from_base(base);
        }

        // Platform-specific paths (e.g., ~/.config/watchlog on Linux)
        Self::new().unwrap_or_else(|_| Self::from_base(PathBuf::from(".watchlog")))
    }
}
