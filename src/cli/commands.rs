use crate::app::App;
use crate::config::PadConfig;
use crate::formatter::{classify, FormatProvider, Templates, Variant};
use crate::hot_reload::watch_config;
use crate::pad_view::{PadView, WAITING_MESSAGE};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Command-line interface for dumppad
#[derive(Parser)]
#[command(name = "dumppad")]
#[command(about = "Local dump listener and renderer", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Listen for dumps and render them
    Serve {
        /// Path to the YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides the configuration)
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to bind (overrides the configuration)
        #[arg(long)]
        host: Option<String>,

        /// Watch the configuration file and restart the listener on change
        #[arg(long, default_value_t = false)]
        watch: bool,

        /// HTML file rewritten after every dump
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Classify a JSON document and print the rendered fragment
    Classify {
        /// Path to the JSON document
        file: PathBuf,

        /// Path to the YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Command-line overrides that survive configuration reloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeOverrides {
    pub port: Option<u16>,
    pub host: Option<String>,
}

impl ServeOverrides {
    pub fn apply(&self, config: &mut PadConfig) {
        if let Some(port) = self.port {
            config.listen_port = port;
        }
        if let Some(host) = &self.host {
            config.listen_host.clone_from(host);
        }
    }
}

/// Execute the parsed command.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration cannot be loaded
/// - The pad worker or config watcher cannot be started
/// - The document passed to `classify` cannot be read or decoded
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            port,
            host,
            watch,
            output,
        } => serve(config.as_deref(), &ServeOverrides { port, host }, watch, output),
        Commands::Classify { file, config } => {
            let settings = PadConfig::load(config.as_deref())?.format_settings();
            let (variant, fragment) = classify_file(&file, &settings)?;
            println!("variant: {variant}");
            println!("{fragment}");
            Ok(())
        }
    }
}

/// Classify the JSON document at `path` and render it.
///
/// # Errors
///
/// Fails if the file cannot be read, is not JSON, or does not render.
pub fn classify_file(
    path: &Path,
    settings: &crate::formatter::FormatSettings,
) -> Result<(Variant, String)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let formatter = classify(value, settings);
    let templates = Templates::new()?;
    let fragment = formatter.render(&templates)?;
    Ok((formatter.variant(), fragment))
}

fn serve(
    config_path: Option<&Path>,
    overrides: &ServeOverrides,
    watch: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let loaded = PadConfig::load(config_path)?;
    let mut config = loaded.clone();
    overrides.apply(&mut config);

    let app = Arc::new(App::new(Box::new(PadView::new(output)?))?);
    start_reporting(&app, &config);

    let _watcher = match (watch, config_path) {
        (true, Some(path)) => {
            let app = Arc::clone(&app);
            let overrides = overrides.clone();
            let watcher = watch_config(path, loaded, move |mut config| {
                overrides.apply(&mut config);
                start_reporting(&app, &config);
            })
            .with_context(|| format!("failed to watch {}", path.display()))?;
            info!(path = %path.display(), "watching configuration");
            Some(watcher)
        }
        (true, None) => {
            info!("--watch ignored without --config");
            None
        }
        (false, _) => None,
    };

    wait_for_shutdown()?;
    app.close();
    Ok(())
}

/// (Re)start the listener and show the waiting placeholder; a bind failure is
/// reported, never fatal.
pub(super) fn start_reporting(app: &App, config: &PadConfig) {
    match app.restart(config) {
        Ok(_) => {
            if let Err(err) = app.reset(WAITING_MESSAGE) {
                warn!(error = %err, "pad not reset");
            }
        }
        Err(err) => {
            error!(error = %err, "dump listener not running");
            eprintln!("dumppad: {err}");
        }
    }
}

#[cfg(unix)]
fn wait_for_shutdown() -> Result<()> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "shutdown signal received");
    }
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown() -> Result<()> {
    loop {
        std::thread::park();
    }
}
