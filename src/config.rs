//! # Pad Configuration
//!
//! Settings for the dump listener and the pad view, loaded from an optional YAML
//! file with environment variable overrides.
//!
//! ## File format
//!
//! Every key is optional; missing keys take their defaults.
//!
//! ```yaml
//! listen_port: 5255
//! listen_host: 127.0.0.1
//! type_name_style: normal      # full | normal | none
//! dump_source_style: show      # show | hide
//! dump_display_style: full     # full | single
//! show_time_on_dumps: true
//! auto_scroll_to_bottom: true
//! ```
//!
//! ## Environment Variables
//!
//! - `DUMPPAD_PORT` - overrides `listen_port`
//! - `DUMPPAD_HOST` - overrides `listen_host`
//!
//! ## Usage
//!
//! ```rust
//! use dumppad::config::PadConfig;
//!
//! let config: PadConfig = serde_yaml::from_str("listen_port: 6000").unwrap();
//! assert_eq!(config.listen_port, 6000);
//! assert_eq!(config.listen_host, "127.0.0.1");
//! ```

use crate::formatter::{DumpDisplayStyle, DumpSourceStyle, FormatSettings};
use crate::type_name::TypeNameStyle;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Port the listener binds when none is configured.
pub const DEFAULT_PORT: u16 = 5255;
/// Interface the listener binds when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

pub const PORT_ENV: &str = "DUMPPAD_PORT";
pub const HOST_ENV: &str = "DUMPPAD_HOST";

/// Configuration loading error
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The configuration file is not valid YAML for [`PadConfig`]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    /// An override variable holds a value that does not parse
    InvalidEnv { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config {}: {}", path.display(), source)
            }
            ConfigError::InvalidEnv { var, value } => {
                write!(f, "invalid value '{}' for {}", value, var)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidEnv { .. } => None,
        }
    }
}

/// Listener and display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    pub listen_port: u16,
    pub listen_host: String,
    pub type_name_style: TypeNameStyle,
    pub dump_source_style: DumpSourceStyle,
    pub dump_display_style: DumpDisplayStyle,
    pub show_time_on_dumps: bool,
    /// Pad view only; does not affect classification
    pub auto_scroll_to_bottom: bool,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_PORT,
            listen_host: DEFAULT_HOST.to_string(),
            type_name_style: TypeNameStyle::Normal,
            dump_source_style: DumpSourceStyle::Show,
            dump_display_style: DumpDisplayStyle::Full,
            show_time_on_dumps: true,
            auto_scroll_to_bottom: true,
        }
    }
}

impl PadConfig {
    /// Read and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        // An empty file deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the effective configuration: the file when given (defaults otherwise),
    /// then environment overrides.
    ///
    /// # Errors
    ///
    /// Propagates file errors and rejects unparseable override values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| env::var(var).ok())?;
        Ok(config)
    }

    /// Apply `DUMPPAD_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `DUMPPAD_PORT` is not a valid port.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(PORT_ENV) {
            self.listen_port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv {
                    var: PORT_ENV,
                    value,
                })?;
        }
        if let Some(value) = lookup(HOST_ENV) {
            if !value.trim().is_empty() {
                self.listen_host = value.trim().to_string();
            }
        }
        Ok(())
    }

    /// Settings handed to the classification engine.
    #[must_use]
    pub fn format_settings(&self) -> FormatSettings {
        FormatSettings {
            type_name_style: self.type_name_style,
            dump_source_style: self.dump_source_style,
            dump_display_style: self.dump_display_style,
            show_time_on_dumps: self.show_time_on_dumps,
        }
    }
}
