pub mod config;
pub mod import;
pub mod import_ui;
pub mod parse;
pub mod setup_db;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::path::{Path, PathBuf};
use watchlog_config::{Config, EnvFile, PathManager, Settings};
use watchlog_core::BUNDLED_LOG;

/// File locations given on the command line, shared by every subcommand.
pub struct RunContext {
    pub env_file: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

impl RunContext {
    pub fn env_file_path(&self) -> PathBuf {
        self.env_file
            .clone()
            .unwrap_or_else(|| PathManager::default().env_file())
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| PathManager::default().config_file())
    }

    /// Env file and config file resolved into run settings.
    ///
    /// A missing env file only warns: the lookup and database steps report what is absent
    /// when they need it. An explicitly named config file must exist.
    pub fn load_settings(&self) -> Result<Settings> {
        let env = EnvFile::load_or_empty(&self.env_file_path());
        let config = self.load_config()?;
        Ok(Settings::resolve(&env, config))
    }

    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_file_path();
        if self.config_file.is_some() && !path.exists() {
            return Err(eyre!("Config file not found: {}", path.display()));
        }

        let config = Config::load_or_default(&path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?;
        config
            .validate()
            .wrap_err_with(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }
}

/// The watch log text: the given file, or the bundled log.
pub fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read watch log {}", path.display())),
        None => {
            tracing::debug!("Using bundled watch log");
            Ok(BUNDLED_LOG.to_string())
        }
    }
}
