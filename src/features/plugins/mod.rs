//! # Feature: Plugin System
//!
//! Directory-based prompt plugins. Each plugin lives in its own folder with a
//! `config.json` of sampling settings and an `skprompt.txt` template.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.4.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.1.0: Added `generate_and_execute` to run generated SQL against a repository
//! - 1.0.0: Initial release with directory registry and natural-language-to-SQL plugin

pub mod config;
pub mod nl_to_sql;

pub use config::{PluginDefinition, PluginSettings};
pub use nl_to_sql::NlToSql;

use crate::core::Config;
use crate::features::completion::Completion;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::Path;

/// A prompt plugin that turns input text into a completion
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, input: &str) -> Result<Completion>;
}

/// Plugins discovered under one directory, keyed by folder name
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, PluginDefinition>,
}

impl PluginRegistry {
    /// Load every plugin subdirectory of `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read plugin directory {}", dir.display()))?;

        let mut plugins = BTreeMap::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name == "__pycache__" || name.starts_with('.') {
                continue;
            }
            if !entry.file_type()?.is_dir() {
                debug!("Skipping non-directory entry {}", name);
                continue;
            }

            let plugin = PluginDefinition::load(&name, &entry.path())?;
            plugins.insert(name, plugin);
        }

        info!("Loaded {} plugin(s) from {}", plugins.len(), dir.display());
        Ok(Self { plugins })
    }

    /// Load the plugins under `config.plugin_dir`
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::load(&config.plugin_dir)
    }

    pub fn get(&self, name: &str) -> Option<&PluginDefinition> {
        self.plugins.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
