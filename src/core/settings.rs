//! Sectioned key/value settings for prompts and assistants
//!
//! Settings are a two-level YAML mapping (`section -> key -> scalar`). Lookups
//! are case-insensitive and any key missing from a section is looked up in the
//! `default` section before the caller's literal fallback is used.
//!
//! ```yaml
//! default:
//!   error_response: "Sorry, I can't help with that"
//! completion:
//!   initial_prompt: You translate questions into SQL.
//!   max_tokens: 300
//! connectors:
//!   role: "Rol:"
//! ```
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;

/// Well-known section names
pub mod sections {
    pub const DEFAULT: &str = "default";
    pub const COMPLETION: &str = "completion";
    pub const CHAT: &str = "chat";
    pub const CONNECTORS: &str = "connectors";
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    sections: HashMap<String, HashMap<String, String>>,
}

impl ConfigSource {
    /// Load settings from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let source = Self::from_yaml_str(&contents)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        info!(
            "Loaded {} settings section(s) from {}",
            source.sections.len(),
            path.display()
        );
        Ok(source)
    }

    /// Load settings if the file exists, otherwise start empty
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            Some(p) => {
                warn!("Settings file {} not found - using defaults", p.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(contents)?;
        let mut source = Self::default();

        let mapping = match root {
            Value::Null => return Ok(source),
            Value::Mapping(m) => m,
            _ => return Err(anyhow!("Settings root must be a mapping of sections")),
        };

        for (section_key, section_value) in mapping {
            let section = scalar_to_string(&section_key)
                .ok_or_else(|| anyhow!("Section names must be scalars"))?;
            let entries = match section_value {
                Value::Null => continue,
                Value::Mapping(m) => m,
                _ => return Err(anyhow!("Section '{}' must be a mapping", section)),
            };
            for (key, value) in entries {
                let key = scalar_to_string(&key)
                    .ok_or_else(|| anyhow!("Keys in section '{}' must be scalars", section))?;
                let value = scalar_to_string(&value).ok_or_else(|| {
                    anyhow!("Value for '{}.{}' must be a scalar", section, key)
                })?;
                source = source.with_value(&section, &key, value);
            }
        }

        Ok(source)
    }

    /// Set a value, returning the updated source
    pub fn with_value(mut self, section: &str, key: &str, value: impl Into<String>) -> Self {
        self.set(section, key, value);
        self
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_lowercase())
            .or_default()
            .insert(key.to_lowercase(), value.into());
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&section.to_lowercase())
    }

    /// Look up a key in `section`, then in the `default` section
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.sections
            .get(&section.to_lowercase())
            .and_then(|s| s.get(&key))
            .or_else(|| {
                self.sections
                    .get(sections::DEFAULT)
                    .and_then(|s| s.get(&key))
            })
            .map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, section: &str, key: &str, fallback: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(fallback)
    }

    pub fn get_usize(&self, section: &str, key: &str, fallback: usize) -> usize {
        self.get_parsed(section, key, fallback)
    }

    pub fn get_u64(&self, section: &str, key: &str, fallback: u64) -> u64 {
        self.get_parsed(section, key, fallback)
    }

    pub fn get_f32(&self, section: &str, key: &str, fallback: f32) -> f32 {
        self.get_parsed(section, key, fallback)
    }

    fn get_parsed<T: std::str::FromStr>(&self, section: &str, key: &str, fallback: T) -> T {
        match self.get(section, key) {
            Some(raw) => match raw.trim().parse() {
                Ok(v) => v,
                Err(_) => {
                    warn!("Ignoring unparsable value '{}' for {}.{}", raw, section, key);
                    fallback
                }
            },
            None => fallback,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}
