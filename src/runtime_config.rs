//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the bridge's runtime behaviour.
//!
//! ## Environment Variables
//!
//! ### `HTTPBRIDGE_LOG_PAYLOADS`
//!
//! When `true`, the raw inbound payload and the serialized reply are logged at
//! `debug` level. Payloads may contain credentials and personal data, so this is off
//! by default.
//!
//! ### `HTTPBRIDGE_MAX_LOGGED_BODY`
//!
//! Maximum number of bytes of a payload or reply included in a log record. Accepts
//! decimal (`1024`) or hexadecimal (`0x400`). Default: `1024`.
//!
//! ## Usage
//!
//! ```rust
//! use httpbridge::runtime_config::BridgeConfig;
//!
//! let config = BridgeConfig::from_env();
//! println!("payload logging: {}", config.log_payloads);
//! ```

use std::env;

const DEFAULT_MAX_LOGGED_BODY: usize = 1024;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Log raw payloads and replies at debug level
    pub log_payloads: bool,
    /// Cap on logged payload bytes
    pub max_logged_body: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_payloads: false,
            max_logged_body: DEFAULT_MAX_LOGGED_BODY,
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_payloads: lookup("HTTPBRIDGE_LOG_PAYLOADS")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.log_payloads),
            max_logged_body: lookup("HTTPBRIDGE_MAX_LOGGED_BODY")
                .and_then(|v| parse_size(&v))
                .unwrap_or(defaults.max_logged_body),
        }
    }

    /// Truncate `bytes` for logging and render it as lossy UTF-8.
    #[must_use]
    pub fn preview(&self, bytes: &[u8]) -> String {
        let end = bytes.len().min(self.max_logged_body);
        let mut out = String::from_utf8_lossy(&bytes[..end]).into_owned();
        if end < bytes.len() {
            out.push_str("...");
        }
        out
    }
}
