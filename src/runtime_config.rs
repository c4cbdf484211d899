//! # Runtime Configuration Module
//!
//! Environment-driven switches for dispatch behavior.
//!
//! ## Environment Variables
//!
//! ### `BRRTR_ERROR_VERBOSE`
//!
//! Include the error message in the `{"status": .., "message": ..}` envelope
//! produced by the built-in HTTP error mapper. Default: `true`.
//!
//! ### `BRRTR_SYNTHESIZE_OPTIONS`
//!
//! Answer `OPTIONS` requests that no manifest declares with a synthesized
//! `Allow` response. Default: `true`.
//!
//! ### `BRRTR_HEAD_FALLBACK`
//!
//! Serve `HEAD` with the `GET` manifests when no `HEAD` manifest is declared.
//! Default: `true`.
//!
//! ### `BRRTR_BASE_PATH`
//!
//! Prefix every manifest path with this value. Default: empty.
//!
//! Boolean variables accept `1`/`0`, `true`/`false`, `yes`/`no` and `on`/`off`;
//! anything else keeps the default.
//!
//! ## Usage
//!
//! ```rust
//! use brrtdispatch::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("HEAD falls back to GET: {}", config.head_fallback);
//! ```
//!
//! The same structure can be embedded under `config:` in a manifest file.

use std::env;

use serde::Deserialize;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Include messages in error envelopes (default: true)
    pub error_verbose: bool,
    /// Synthesize OPTIONS responses (default: true)
    pub synthesize_options: bool,
    /// Route HEAD through GET manifests when none declare HEAD (default: true)
    pub head_fallback: bool,
    /// Path prefix for every manifest (default: empty)
    pub base_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            error_verbose: true,
            synthesize_options: true,
            head_fallback: true,
            base_path: String::new(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(default)
        };
        RuntimeConfig {
            error_verbose: flag("BRRTR_ERROR_VERBOSE", defaults.error_verbose),
            synthesize_options: flag("BRRTR_SYNTHESIZE_OPTIONS", defaults.synthesize_options),
            head_fallback: flag("BRRTR_HEAD_FALLBACK", defaults.head_fallback),
            base_path: lookup("BRRTR_BASE_PATH").unwrap_or(defaults.base_path),
        }
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
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
    fn test_defaults_without_env() {
        let config = RuntimeConfig::from_lookup(|_| None);
        assert_eq!(config, RuntimeConfig::default());
        assert!(config.error_verbose);
        assert!(config.head_fallback);
    }

    #[test]
    fn test_env_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("BRRTR_ERROR_VERBOSE", "false"),
            ("BRRTR_SYNTHESIZE_OPTIONS", "0"),
            ("BRRTR_HEAD_FALLBACK", "off"),
            ("BRRTR_BASE_PATH", "/api"),
        ]));
        assert!(!config.error_verbose);
        assert!(!config.synthesize_options);
        assert!(!config.head_fallback);
        assert_eq!(config.base_path, "/api");
    }

    #[test]
    fn test_unparseable_flag_keeps_default() {
        let config = RuntimeConfig::from_lookup(lookup(&[("BRRTR_HEAD_FALLBACK", "maybe")]));
        assert!(config.head_fallback);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RuntimeConfig = serde_json::from_str(r#"{"error_verbose": false}"#).unwrap();
        assert!(!config.error_verbose);
        assert!(config.synthesize_options);
    }
}
