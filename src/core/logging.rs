//! Logger installation
//!
//! Wraps `env_logger` so every binary or test harness embedding the crate gets
//! the same `timestamp - target - LEVEL - message` line format, optionally
//! written to a file instead of stderr.

use anyhow::{Context, Result};
use log::debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
    /// Append log lines to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Install the global logger; a second call keeps the first configuration
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&settings.level),
    );

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{}",
            format_line(
                &chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f").to_string(),
                record.target(),
                record.level(),
                &record.args().to_string(),
            )
        )
    });

    if let Some(path) = &settings.file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    if builder.try_init().is_err() {
        debug!("Logger already initialised, keeping existing configuration");
    }
    Ok(())
}

fn format_line(timestamp: &str, target: &str, level: log::Level, message: &str) -> String {
    format!("{timestamp} - {target} - {level} - {message}")
}
