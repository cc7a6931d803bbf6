//! # Runtime Configuration Module
//!
//! Environment variable configuration for the coroutine runtime.
//!
//! ## Environment Variables
//!
//! ### `DUMPPAD_STACK_SIZE`
//!
//! Stack size for connection coroutines. Accepts values in:
//! - Decimal: `262144` (256 KB)
//! - Hexadecimal: `0x40000` (256 KB)
//!
//! Default: `0x40000` (256 KB)
//!
//! Connection coroutines parse requests, decode JSON bodies and run the route
//! handlers. Rendering happens on the pad worker thread, not on these stacks.
//!
//! ## Usage
//!
//! ```rust
//! use dumppad::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;

pub const STACK_SIZE_ENV: &str = "DUMPPAD_STACK_SIZE";
pub const DEFAULT_STACK_SIZE: usize = 0x40000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes (default: 256 KB / 0x40000)
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var(STACK_SIZE_ENV)
            .ok()
            .map_or(DEFAULT_STACK_SIZE, |val| parse_stack_size(&val));
        RuntimeConfig { stack_size }
    }

    /// Apply to the global `may` scheduler. Must run before the first coroutine
    /// is spawned.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal size, falling back to the default.
#[must_use]
pub fn parse_stack_size(val: &str) -> usize {
    let val = val.trim();
    let parsed = match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    };
    match parsed {
        Some(size) if size > 0 => size,
        _ => DEFAULT_STACK_SIZE,
    }
}
