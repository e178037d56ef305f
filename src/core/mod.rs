//! # Core Module
//!
//! Runtime configuration, sectioned settings, and logging setup shared by all features.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add logging module with optional file target
//! - 1.1.0: Add sectioned settings loaded from YAML
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod logging;
pub mod settings;

pub use config::{Config, ConfigOverrides};
pub use logging::{init_logging, LogSettings};
pub use settings::{sections, ConfigSource};
