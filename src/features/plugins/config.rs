//! # Plugin Configuration Schema
//!
//! `config.json` sampling settings and the loaded plugin definition.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "config.json";
pub const TEMPLATE_FILE: &str = "skprompt.txt";

/// Sampling settings read from a plugin's `config.json`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PluginSettings {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_n")]
    pub n: u8,

    #[serde(default = "default_stop")]
    pub stop: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            top_p: default_top_p(),
            n: default_n(),
            stop: default_stop(),
            description: None,
        }
    }
}

fn default_max_tokens() -> u64 {
    100
}

fn default_top_p() -> f32 {
    1.0
}

fn default_n() -> u8 {
    1
}

fn default_stop() -> Vec<String> {
    vec!["\n".to_string()]
}

/// A plugin as loaded from disk
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDefinition {
    pub name: String,
    /// Prompt template with line breaks flattened to spaces
    pub template: String,
    pub settings: PluginSettings,
}

impl PluginDefinition {
    /// Load `config.json` and `skprompt.txt` from one plugin directory
    pub fn load(name: &str, dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        let template_path = dir.join(TEMPLATE_FILE);

        if !config_path.is_file() {
            anyhow::bail!("Plugin '{}' is missing {}", name, CONFIG_FILE);
        }
        if !template_path.is_file() {
            anyhow::bail!("Plugin '{}' is missing {}", name, TEMPLATE_FILE);
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let settings: PluginSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid {} for plugin '{}'", CONFIG_FILE, name))?;

        let template = std::fs::read_to_string(&template_path)
            .with_context(|| format!("Failed to read {}", template_path.display()))?
            .replace('\n', " ");

        Ok(Self {
            name: name.to_string(),
            template,
            settings,
        })
    }

    /// Template with every `{{$input}}` replaced by `input`
    pub fn render(&self, input: &str) -> String {
        self.template.replace("{{$input}}", input)
    }
}
