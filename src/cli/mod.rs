//! # CLI Module
//!
//! Command-line interface for the `dumppad` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Listen for dumps and keep the rendered pad up to date:
//!
//! ```bash
//! dumppad serve --config dumppad.yaml --watch --output pad.html
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML configuration (defaults apply when omitted)
//! - `--port <PORT>` / `--host <HOST>` - override the configured address
//! - `--watch` - restart the listener when the configuration file changes
//! - `--output <FILE>` - rewrite this HTML file after every dump or clear
//!
//! A port that cannot be bound is reported and the process keeps running, so a
//! corrected configuration can be picked up by `--watch`.
//!
//! ### `classify`
//!
//! Classify a JSON document and print the rendered fragment:
//!
//! ```bash
//! dumppad classify dump.json --config dumppad.yaml
//! ```

mod commands;


pub use commands::{classify_file, run_cli, Cli, Commands, ServeOverrides};
