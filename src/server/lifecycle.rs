use super::http_server::{HttpServer, ServerHandle};
use super::service::DumpService;
use crate::router::RouteTable;
use http::Method;
use serde_json::Value;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Route receiving posted dump values.
pub const DUMP_PATH: &str = "/";
/// Route receiving the clear signal.
pub const CLEAR_PATH: &str = "/clear";

/// Invoked with every successfully decoded dump value.
pub type ValueCallback = Arc<dyn Fn(Value) -> anyhow::Result<()> + Send + Sync>;
/// Invoked for every clear signal.
pub type ClearCallback = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// The listener could not bind its address.
#[derive(Debug)]
pub struct BindError {
    pub addr: String,
    pub source: io::Error,
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "couldn't start dump listener on {}: {}", self.addr, self.source)
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Build the route table served by every listener instance.
///
/// `POST /` decodes the body as JSON and hands it to `on_value`; a body that does
/// not decode is logged and dropped without invoking the callback. `GET /clear`
/// invokes `on_clear`.
#[must_use]
pub fn dump_routes(on_value: ValueCallback, on_clear: ClearCallback) -> RouteTable {
    let mut routes = RouteTable::new();
    routes.register(DUMP_PATH, Method::POST, move |body: &str| {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => on_value(value),
            Err(err) => {
                warn!(error = %err, body_size_bytes = body.len(), "discarding undecodable dump body");
                Ok(())
            }
        }
    });
    routes.register(CLEAR_PATH, Method::GET, move |_body: &str| on_clear());
    routes
}

/// Owns at most one listener instance and moves it through start, close and restart.
///
/// Instances never overlap: `start` on a running controller and `restart` both
/// close the current listener, wait for its port to be released, and only then
/// bind the next one.
pub struct DumpServer {
    host: String,
    handle: Option<ServerHandle>,
}

impl DumpServer {
    /// A controller that binds listeners on `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            handle: None,
        }
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.handle.is_some()
    }

    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.handle.as_ref().map(ServerHandle::addr)
    }

    /// Bind a new listener on `port` serving the dump and clear routes.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the address cannot be bound. The controller is
    /// left without a listener and can be started again later.
    pub fn start(
        &mut self,
        port: u16,
        on_value: ValueCallback,
        on_clear: ClearCallback,
    ) -> Result<SocketAddr, BindError> {
        if self.is_listening() {
            debug!("start called while listening, closing the previous listener first");
            self.close(|| ());
        }

        let addr = format!("{}:{}", self.host, port);
        let service = DumpService::new(dump_routes(on_value, on_clear));
        let handle = HttpServer(service)
            .start(addr.as_str())
            .map_err(|source| BindError { addr, source })?;

        let bound = handle.addr();
        info!(addr = %bound, "dump listener started");
        self.handle = Some(handle);
        Ok(bound)
    }

    /// Stop accepting connections, wait for the port to be released, then run
    /// `when_done`.
    ///
    /// Closing a controller with no listener is a no-op; `when_done` still runs.
    pub fn close<F: FnOnce()>(&mut self, when_done: F) {
        match self.handle.take() {
            Some(handle) => {
                let addr = handle.addr();
                info!(addr = %addr, "stopping dump listener");
                handle.stop();
                info!(addr = %addr, "dump listener closed");
            }
            None => debug!("close requested with no listener bound"),
        }
        when_done();
    }

    /// Close the current listener and start a new one on `port`.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the new listener cannot bind.
    pub fn restart(
        &mut self,
        port: u16,
        on_value: ValueCallback,
        on_clear: ClearCallback,
    ) -> Result<SocketAddr, BindError> {
        self.close(|| debug!("previous listener released, rebinding"));
        self.start(port, on_value, on_clear)
    }
}

impl Drop for DumpServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}
