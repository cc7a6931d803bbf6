//! # Hot Reload Module
//!
//! Watches the configuration file and hands every successfully reloaded
//! [`PadConfig`] to a callback, typically [`App::restart`](crate::app::App::restart)
//! so a changed port or style takes effect without restarting the process.
//!
//! ## Reload Process
//!
//! 1. **Detection** - the filesystem watcher reports a modify or create event
//! 2. **Load** - the file is parsed and environment overrides are applied
//! 3. **Dedup** - a configuration equal to the last one applied is ignored, so
//!    editors that write a file in several steps trigger a single restart
//! 4. **Apply** - the callback receives the new configuration
//!
//! ## Error Handling
//!
//! A file that fails to load is logged and ignored; the running listener keeps
//! its current configuration until the next valid save.

use crate::config::PadConfig;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Watch `config_path` and call `on_reload` with each new configuration.
///
/// `current` is the configuration already in effect; reloads equal to it are
/// skipped. The returned watcher stops watching when dropped.
///
/// # Errors
///
/// Fails if the watcher cannot be created or the path cannot be watched.
pub fn watch_config<P, F>(
    config_path: P,
    current: PadConfig,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(PadConfig) + Send + 'static,
{
    let path: PathBuf = config_path.as_ref().to_path_buf();
    let watch_path = path.clone();
    let mut applied = current;

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                match PadConfig::load(Some(&watch_path)) {
                    Ok(config) if config == applied => {
                        debug!(path = %watch_path.display(), "config unchanged, skipping reload");
                    }
                    Ok(config) => {
                        info!(
                            path = %watch_path.display(),
                            port = config.listen_port,
                            "hot-reload: applying configuration"
                        );
                        applied = config.clone();
                        on_reload(config);
                    }
                    Err(err) => {
                        warn!(error = %err, "hot-reload: keeping current configuration");
                    }
                }
            }
            Err(e) => warn!(error = ?e, "config watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
