//! Structured logging initialization
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a JSON or
//! pretty fmt layer, optionally writing through a non-blocking appender.
//!
//! ## Environment Variables
//!
//! - `BRRTR_LOG_LEVEL` - trace/debug/info/warn/error (default: `info`)
//! - `BRRTR_LOG_FORMAT` - `json` or `pretty` (default: `json`)
//! - `BRRTR_LOG_TARGETS` - extra comma-separated filter directives, e.g.
//!   `brrtdispatch::dispatcher=debug`
//! - `BRRTR_LOG_ASYNC` - buffer output on a background thread (default: `false`)
//! - `BRRTR_LOG_LOCATION` - include file:line (default: `false`)
//!
//! `RUST_LOG`, when set, replaces the level.

use std::env;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::runtime_config::parse_bool;

/// Keeps the async writer flushing for the life of the process
static ASYNC_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Buffer output on a background thread
    pub async_logging: bool,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            async_logging: false,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_level: lookup("BRRTR_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("BRRTR_LOG_FORMAT").map_or(defaults.format, |f| LogFormat::parse(&f)),
            target_filter: lookup("BRRTR_LOG_TARGETS").filter(|t| !t.trim().is_empty()),
            async_logging: lookup("BRRTR_LOG_ASYNC")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.async_logging),
            include_location: lookup("BRRTR_LOG_LOCATION")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.include_location),
        }
    }

    /// Debug level, pretty output with locations
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            async_logging: false,
            include_location: true,
        }
    }

    /// Build the filter: `RUST_LOG` if set, otherwise the level, plus any
    /// extra target directives.
    ///
    /// # Errors
    ///
    /// Fails on an invalid level or directive.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(self.log_level.trim())
                .with_context(|| format!("invalid log level '{}'", self.log_level))?,
        };

        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                let directive = directive
                    .parse()
                    .with_context(|| format!("invalid log filter directive '{directive}'"))?;
                filter = filter.add_directive(directive);
            }
        }
        Ok(filter)
    }
}

/// Initialize logging from `BRRTR_LOG_*`.
///
/// # Errors
///
/// See [`init_logging_with_config`].
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LogConfig::from_env())
}

/// Initialize logging with an explicit configuration
///
/// # Errors
///
/// Fails on an invalid filter, or when a global subscriber is already
/// installed (including by an earlier call).
///
/// # Example
///
/// ```no_run
/// use brrtdispatch::logging::{init_logging_with_config, LogConfig};
///
/// init_logging_with_config(&LogConfig::from_env())
///     .expect("Failed to initialize logging");
/// ```
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let env_filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(env_filter);

    if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        let fmt_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(non_blocking)
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(non_blocking)
                .boxed(),
        };
        registry
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize async logging")?;
        keep_guard(&ASYNC_GUARD, guard);
    } else {
        let fmt_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .boxed(),
        };
        registry
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize sync logging")?;
    }

    Ok(())
}

/// Park the writer guard for the life of the process so buffered lines
/// are flushed. Returns `false` when a guard was already stored; the new
/// one is dropped and its worker shut down.
fn keep_guard(cell: &OnceCell<WorkerGuard>, guard: WorkerGuard) -> bool {
    match cell.set(guard) {
        Ok(()) => true,
        Err(_) => {
            warn!("Async log writer guard already stored; dropping the new one");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("invalid"), LogFormat::Json);
    }

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::from_lookup(|_| None);
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.log_level, "info");
        assert!(!config.async_logging);
    }

    #[test]
    fn test_log_config_from_vars() {
        let config = LogConfig::from_lookup(lookup(&[
            ("BRRTR_LOG_LEVEL", "debug"),
            ("BRRTR_LOG_FORMAT", "pretty"),
            ("BRRTR_LOG_TARGETS", "brrtdispatch::dispatcher=trace"),
            ("BRRTR_LOG_ASYNC", "true"),
            ("BRRTR_LOG_LOCATION", "1"),
        ]));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.target_filter.as_deref(), Some("brrtdispatch::dispatcher=trace"));
        assert!(config.async_logging);
        assert!(config.include_location);
    }

    #[test]
    fn test_invalid_target_directive_is_error() {
        let config = LogConfig {
            target_filter: Some("brrtdispatch=loud".to_string()),
            ..LogConfig::default()
        };
        assert!(config.env_filter().is_err());
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig::default_dev();
        // another test binary thread may have installed a subscriber first
        let _ = init_logging_with_config(&config);
        assert!(init_logging_with_config(&config).is_err());
    }

    #[test]
    fn test_keep_guard_stores_only_first() {
        let cell = OnceCell::new();
        let (_first, guard) = tracing_appender::non_blocking(std::io::sink());
        assert!(keep_guard(&cell, guard));
        let (_second, guard) = tracing_appender::non_blocking(std::io::sink());
        assert!(!keep_guard(&cell, guard));
        assert!(cell.get().is_some());
    }
}
