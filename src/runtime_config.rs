//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the matcher's runtime
//! behavior.
//!
//! ## Environment Variables
//!
//! ### `PATHWRIGHT_MATCH_CACHE`
//!
//! Capacity of the per-snapshot match cache used by
//! [`SharedRegistry`](crate::router::SharedRegistry). Accepts decimal
//! (`1024`) or hexadecimal (`0x400`). `0` disables caching.
//!
//! Default: `1024`
//!
//! ### `PATHWRIGHT_SLOW_MATCH_US`
//!
//! A single match taking longer than this many microseconds is logged at
//! `warn`.
//!
//! Default: `1000`
//!
//! ## Usage
//!
//! ```rust
//! use pathwright::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Match cache: {} entries", config.match_cache_capacity);
//! ```

use std::env;
use std::time::Duration;

/// Default match cache capacity.
pub const DEFAULT_MATCH_CACHE: usize = 1024;

/// Default slow-match threshold in microseconds.
pub const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Entries kept in each snapshot's match cache (0 = off)
    pub match_cache_capacity: usize,
    /// Matches slower than this are logged as slow
    pub slow_match: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            match_cache_capacity: DEFAULT_MATCH_CACHE,
            slow_match: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
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
        let match_cache_capacity = lookup("PATHWRIGHT_MATCH_CACHE")
            .and_then(|v| parse_size(&v))
            .unwrap_or(DEFAULT_MATCH_CACHE);
        let slow_match_us = lookup("PATHWRIGHT_SLOW_MATCH_US")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SLOW_MATCH_US);
        RuntimeConfig {
            match_cache_capacity,
            slow_match: Duration::from_micros(slow_match_us),
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
