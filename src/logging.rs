//! Structured logging setup.
//!
//! Reads its settings from the environment once at startup:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `BRRTMVC_LOG_LEVEL` | `info` | base level (`trace`..`error`) |
//! | `BRRTMVC_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `BRRTMVC_LOG_TARGETS` | unset | extra comma-separated filter directives |
//! | `BRRTMVC_LOG_LOCATION` | `false` | include file and line |
//! | `BRRTMVC_LOG_ASYNC` | `false` | write through a non-blocking worker |
//! | `BRRTMVC_LOG_BUFFER_SIZE` | `8192` | lines buffered by the async worker |
//!
//! `RUST_LOG`, when set, replaces the base level.

use std::env;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives, comma-separated (`brrtmvc::router=debug`)
    pub targets: Option<String>,
    pub include_location: bool,
    pub async_logging: bool,
    pub buffer_size: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            targets: None,
            include_location: false,
            async_logging: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl LogConfig {
    /// Read `BRRTMVC_LOG_*` variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false)
        };
        Self {
            log_level: lookup("BRRTMVC_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format: lookup("BRRTMVC_LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
            targets: lookup("BRRTMVC_LOG_TARGETS").filter(|t| !t.trim().is_empty()),
            include_location: flag("BRRTMVC_LOG_LOCATION"),
            async_logging: flag("BRRTMVC_LOG_ASYNC"),
            buffer_size: lookup("BRRTMVC_LOG_BUFFER_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_BUFFER_SIZE),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        if let Some(targets) = &self.targets {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                match directive.parse() {
                    Ok(parsed) => filter = filter.add_directive(parsed),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
                }
            }
        }
        filter
    }
}

/// Install the global subscriber.
///
/// With async logging enabled the returned guard must be kept alive; dropping
/// it flushes and stops the writer thread.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let (writer, guard) = if config.async_logging {
        let (writer, guard) = NonBlockingBuilder::default()
            .buffered_lines_limit(config.buffer_size)
            .finish(std::io::stdout());
        (Some(writer), Some(guard))
    } else {
        (None, None)
    };

    let fmt_layer = match (config.format, writer) {
        (LogFormat::Json, Some(writer)) => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        (LogFormat::Json, None) => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        (LogFormat::Pretty, Some(writer)) => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        (LogFormat::Pretty, None) => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    registry
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_reads_variables() {
        let config = LogConfig::from_lookup(lookup(&[
            ("BRRTMVC_LOG_LEVEL", "debug"),
            ("BRRTMVC_LOG_FORMAT", "Pretty"),
            ("BRRTMVC_LOG_TARGETS", "brrtmvc::router=trace"),
            ("BRRTMVC_LOG_LOCATION", "true"),
            ("BRRTMVC_LOG_ASYNC", "1"),
            ("BRRTMVC_LOG_BUFFER_SIZE", "128"),
        ]));
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.targets.as_deref(), Some("brrtmvc::router=trace"));
        assert!(config.include_location);
        assert!(config.async_logging);
        assert_eq!(config.buffer_size, 128);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = LogConfig::from_lookup(lookup(&[
            ("BRRTMVC_LOG_LEVEL", "loud"),
            ("BRRTMVC_LOG_FORMAT", "xml"),
            ("BRRTMVC_LOG_BUFFER_SIZE", "0"),
            ("BRRTMVC_LOG_TARGETS", "  "),
        ]));
        assert_eq!(config.level(), Level::INFO);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.targets, None);
    }
}
