//! Server configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Numeric tuning knobs fall back to their defaults when absent or
//! unparseable (`env_parse`). Settings that change behavior rather than
//! tune it (`PORT`, `OVERFLOW_POLICY`, `RECOLOR_STROKES`) are strict: a
//! typo there aborts startup instead of silently running the wrong mode.

use std::path::PathBuf;
use std::time::Duration;

use crate::services::relay::OverflowPolicy;
use crate::services::session::RecolorPolicy;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STROKE_LOG_CAPACITY: usize = 1000;
pub const DEFAULT_OUTBOUND_BUFFER: usize = 256;
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 20;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub stroke_log_capacity: usize,
    pub outbound_buffer: usize,
    pub overflow_policy: OverflowPolicy,
    pub recolor_policy: RecolorPolicy,
    pub ping_interval: Duration,
    pub idle_timeout: Duration,
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            stroke_log_capacity: DEFAULT_STROKE_LOG_CAPACITY,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            overflow_policy: OverflowPolicy::Disconnect,
            recolor_policy: RecolorPolicy::ForwardOnly,
            ping_interval: Duration::from_secs(DEFAULT_PING_INTERVAL_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            static_dir: None,
        }
    }
}

impl Config {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `STROKE_LOG_CAPACITY`: default 1000, clamped to at least 2
    /// - `OUTBOUND_BUFFER`: default 256, clamped to at least 1
    /// - `OVERFLOW_POLICY`: `disconnect` (default) or `drop`
    /// - `RECOLOR_STROKES`: `false` (default) or `true`
    /// - `PING_INTERVAL_SECS`: default 20
    /// - `IDLE_TIMEOUT_SECS`: default 60
    /// - `STATIC_DIR`: serve a static client from this directory
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an unparseable port or policy.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. `from_env` delegates here
    /// so tests do not have to mutate the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an unparseable port or policy.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            stroke_log_capacity: env_parse(&lookup, "STROKE_LOG_CAPACITY", DEFAULT_STROKE_LOG_CAPACITY).max(2),
            outbound_buffer: env_parse(&lookup, "OUTBOUND_BUFFER", DEFAULT_OUTBOUND_BUFFER).max(1),
            overflow_policy: parse_overflow_policy(lookup("OVERFLOW_POLICY").as_deref())?,
            recolor_policy: parse_recolor_policy(lookup("RECOLOR_STROKES").as_deref())?,
            ping_interval: Duration::from_secs(
                env_parse(&lookup, "PING_INTERVAL_SECS", DEFAULT_PING_INTERVAL_SECS).max(1),
            ),
            idle_timeout: Duration::from_secs(env_parse(&lookup, "IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT_SECS).max(1)),
            static_dir: lookup("STATIC_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_overflow_policy(raw: Option<&str>) -> Result<OverflowPolicy, ConfigError> {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        None | Some("" | "disconnect") => Ok(OverflowPolicy::Disconnect),
        Some("drop") => Ok(OverflowPolicy::Drop),
        Some(other) => Err(ConfigError::Invalid { key: "OVERFLOW_POLICY", value: other.to_owned() }),
    }
}

fn parse_recolor_policy(raw: Option<&str>) -> Result<RecolorPolicy, ConfigError> {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        None | Some("" | "0" | "false" | "forward" | "forward_only") => Ok(RecolorPolicy::ForwardOnly),
        Some("1" | "true" | "retroactive") => Ok(RecolorPolicy::Retroactive),
        Some(other) => Err(ConfigError::Invalid { key: "RECOLOR_STROKES", value: other.to_owned() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
