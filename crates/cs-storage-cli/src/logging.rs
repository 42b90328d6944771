//! Logging setup for the cs-storage CLI.
//!
//! stdout carries command payloads (JSON documents); all log output goes to
//! stderr, either human-readable or as JSON lines.
//!
//! Configuration sources, lowest to highest precedence: defaults,
//! `CS_STORAGE_LOG` / `CS_STORAGE_LOG_FORMAT`, CLI flags. A `RUST_LOG` filter
//! directive, when set, replaces the level-derived filter entirely.

use clap::ValueEnum;
use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG: &str = "CS_STORAGE_LOG";
pub const ENV_LOG_FORMAT: &str = "CS_STORAGE_LOG_FORMAT";

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines (default)
    #[default]
    #[value(alias = "pretty")]
    Human,
    /// One JSON object per line
    #[value(alias = "json")]
    Jsonl,
}

/// Log level filter. Defaults to warnings only.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "quiet")]
    Off,
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogConfig {
    /// Create config from environment and CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(cli_level, cli_format, |name| std::env::var(name).ok())
    }

    fn from_lookup(
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = LogConfig::default();

        if let Some(level) = lookup(ENV_LOG).and_then(|v| LogLevel::from_str(&v, true).ok()) {
            config.level = level;
        }
        if let Some(format) =
            lookup(ENV_LOG_FORMAT).and_then(|v| LogFormat::from_str(&v, true).ok())
        {
            config.format = format;
        }

        if let Some(level) = cli_level {
            config.level = level;
        }
        if let Some(format) = cli_format {
            config.format = format;
        }

        config
    }

    /// Filter directive applied when `RUST_LOG` is not set.
    fn directive(&self) -> String {
        format!(
            "cs_storage={level},cs_storage_cli={level}",
            level = value_name(self.level)
        )
    }
}

fn value_name(value: impl ValueEnum) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

/// Initialize the logging subsystem. Call once at startup.
pub fn init_logging(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directive()));

    match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .init();
        }
    }
}
