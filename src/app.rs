//! # Application Wiring
//!
//! [`App`] ties the pieces together: the current [`FormatSettings`], the
//! presentation sink, and the [`DumpServer`] listening for producers.
//!
//! ## Event flow
//!
//! Route handlers run on connection coroutines and only enqueue a [`PadEvent`].
//! A single `pad-worker` thread drains the queue: it classifies each value with
//! the settings snapshot current at that moment, renders it, and hands it to the
//! sink. Dumps therefore reach the sink in the order the listener received them,
//! and rendering never runs on a coroutine stack.
//!
//! ## Restart
//!
//! [`App::restart`] stores the new settings atomically, closes the running
//! listener, waits for its port to be released, and binds the new one. A bind
//! failure is returned to the caller; the application keeps running without a
//! listener until the next successful start.

use crate::config::PadConfig;
use crate::formatter::{classify, FormatSettings};
use crate::pad_view::DumpSink;
use crate::server::{BindError, ClearCallback, DumpServer, ValueCallback};
use anyhow::{anyhow, Context, Result};
use arc_swap::ArcSwap;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// Work queued for the pad worker.
pub enum PadEvent {
    Dump(Value),
    Clear,
    /// Clear and show a placeholder message
    Reset(String),
    Configure(PadConfig),
    /// Acknowledged once every earlier event has been handled
    Sync(Sender<()>),
    Shutdown,
}

/// The running application.
pub struct App {
    settings: Arc<ArcSwap<FormatSettings>>,
    events: Sender<PadEvent>,
    server: Mutex<DumpServer>,
    worker: Option<JoinHandle<()>>,
}

impl App {
    /// Spawn the pad worker around `sink`. No listener is started yet.
    ///
    /// # Errors
    ///
    /// Fails if the worker thread cannot be spawned.
    pub fn new(sink: Box<dyn DumpSink>) -> Result<Self> {
        let settings = Arc::new(ArcSwap::from_pointee(FormatSettings::default()));
        let (events, queue) = mpsc::channel();
        let worker_settings = Arc::clone(&settings);
        let worker = thread::Builder::new()
            .name("pad-worker".to_string())
            .spawn(move || run_worker(sink, &worker_settings, &queue))
            .context("failed to spawn pad worker")?;

        Ok(Self {
            settings,
            events,
            server: Mutex::new(DumpServer::new(crate::config::DEFAULT_HOST)),
            worker: Some(worker),
        })
    }

    /// Settings snapshot the next dump will be classified with.
    #[must_use]
    pub fn settings(&self) -> FormatSettings {
        **self.settings.load()
    }

    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server().local_addr()
    }

    /// Apply `config` and start listening.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the configured address cannot be bound.
    pub fn start(&self, config: &PadConfig) -> Result<SocketAddr, BindError> {
        self.apply(config);
        let mut server = self.server();
        server.close(|| ());
        *server = DumpServer::new(config.listen_host.clone());
        server.start(config.listen_port, self.value_callback(), self.clear_callback())
    }

    /// Apply `config`, close the running listener and start a new one.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the new listener cannot bind. The previous
    /// listener is closed either way.
    pub fn restart(&self, config: &PadConfig) -> Result<SocketAddr, BindError> {
        self.start(config)
    }

    /// Stop listening. Queued dumps are still delivered.
    pub fn close(&self) {
        self.server().close(|| debug!("dump listener released"));
    }

    /// Queue a value as if it had been posted to the listener.
    ///
    /// # Errors
    ///
    /// Fails once the pad worker has stopped.
    pub fn dump(&self, value: Value) -> Result<()> {
        self.send(PadEvent::Dump(value))
    }

    /// Queue a clear as if `GET /clear` had been received.
    ///
    /// # Errors
    ///
    /// Fails once the pad worker has stopped.
    pub fn clear(&self) -> Result<()> {
        self.send(PadEvent::Clear)
    }

    /// Queue a clear that leaves `message` on the pad.
    ///
    /// # Errors
    ///
    /// Fails once the pad worker has stopped.
    pub fn reset(&self, message: impl Into<String>) -> Result<()> {
        self.send(PadEvent::Reset(message.into()))
    }

    /// Block until every event queued so far has reached the sink.
    ///
    /// # Errors
    ///
    /// Fails if the pad worker has stopped.
    pub fn sync(&self) -> Result<()> {
        let (done, wait) = mpsc::channel();
        self.send(PadEvent::Sync(done))?;
        wait.recv().map_err(|_| anyhow!("pad worker stopped"))
    }

    fn apply(&self, config: &PadConfig) {
        let settings = config.format_settings();
        self.settings.store(Arc::new(settings));
        debug!(?settings, "format settings updated");
        if let Err(err) = self.send(PadEvent::Configure(config.clone())) {
            warn!(error = %err, "pad view not reconfigured");
        }
    }

    fn send(&self, event: PadEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| anyhow!("pad worker stopped"))
    }

    fn value_callback(&self) -> ValueCallback {
        let events = self.events.clone();
        Arc::new(move |value| {
            events
                .send(PadEvent::Dump(value))
                .map_err(|_| anyhow!("pad worker stopped"))
        })
    }

    fn clear_callback(&self) -> ClearCallback {
        let events = self.events.clone();
        Arc::new(move || {
            events
                .send(PadEvent::Clear)
                .map_err(|_| anyhow!("pad worker stopped"))
        })
    }

    fn server(&self) -> MutexGuard<'_, DumpServer> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.close();
        if self.events.send(PadEvent::Shutdown).is_err() {
            debug!("pad worker already stopped");
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("pad worker panicked");
            }
        }
    }
}

fn run_worker(
    mut sink: Box<dyn DumpSink>,
    settings: &ArcSwap<FormatSettings>,
    queue: &Receiver<PadEvent>,
) {
    debug!("pad worker started");
    for event in queue {
        match event {
            PadEvent::Dump(value) => {
                let formatter = classify(value, &settings.load());
                debug!(variant = %formatter.variant(), "dump classified");
                sink.dump(&formatter);
            }
            PadEvent::Clear => {
                debug!("clearing pad");
                sink.clear();
            }
            PadEvent::Reset(message) => {
                debug!(message = %message, "resetting pad");
                sink.reset(&message);
            }
            PadEvent::Configure(config) => sink.configure(&config),
            PadEvent::Sync(done) => {
                if done.send(()).is_err() {
                    debug!("sync waiter went away");
                }
            }
            PadEvent::Shutdown => break,
        }
    }
    debug!("pad worker stopped");
}
