//! Environment-driven runtime configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Explicit overrides take precedence over the environment
//! - 1.0.0: Initial release

use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

use super::logging::LogSettings;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_DATABASE_PATH: &str = "promptsmith.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_PLUGIN_DIR: &str = "plugins";

/// Runtime configuration resolved from overrides, then the environment, then defaults
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// OpenAI-compatible base URL; `None` means the public OpenAI endpoint
    pub endpoint: Option<String>,
    /// Model or deployment name sent with every request
    pub deployment_id: String,
    pub database_path: String,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub plugin_dir: PathBuf,
    /// YAML file with prompt sections and assistant settings
    pub prompt_config_path: Option<PathBuf>,
}

/// Values supplied by the caller that win over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub deployment_id: Option<String>,
    pub database_path: Option<String>,
}

impl Config {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(ConfigOverrides::default())
    }

    /// Load configuration, letting explicit values override the environment
    pub fn from_env_with(overrides: ConfigOverrides) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(overrides, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = overrides
            .api_key
            .or_else(|| var("API_KEY"))
            .ok_or_else(|| anyhow!("API_KEY must be set in the environment or passed explicitly"))?;

        Ok(Self {
            api_key,
            endpoint: overrides.endpoint.or_else(|| var("ENDPOINT")),
            deployment_id: overrides
                .deployment_id
                .or_else(|| var("DEPLOYMENT_ID"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            database_path: overrides
                .database_path
                .or_else(|| var("DATABASE_PATH"))
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: var("LOG_FILE").map(PathBuf::from),
            plugin_dir: var("PLUGIN_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PLUGIN_DIR)),
            prompt_config_path: var("PROMPT_CONFIG_PATH").map(PathBuf::from),
        })
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            level: self.log_level.clone(),
            file: self.log_file.clone(),
        }
    }
}
