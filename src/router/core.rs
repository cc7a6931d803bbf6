use http::Method;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Callback invoked with the request body of a matched route.
pub type RouteHandler = Arc<dyn Fn(&str) -> anyhow::Result<()> + Send + Sync>;

/// A route handler failed while processing a request.
#[derive(Debug)]
pub enum HandlerError {
    /// The handler returned an error
    Failed {
        method: Method,
        path: String,
        source: anyhow::Error,
    },
    /// The handler panicked; the payload message is kept when it was a string
    Panicked {
        method: Method,
        path: String,
        message: String,
    },
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Failed {
                method,
                path,
                source,
            } => write!(f, "handler for {method} {path} failed: {source:#}"),
            HandlerError::Panicked {
                method,
                path,
                message,
            } => write!(f, "handler for {method} {path} panicked: {message}"),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandlerError::Failed { source, .. } => Some(&**source),
            HandlerError::Panicked { .. } => None,
        }
    }
}

/// An immutable `(path, method, handler)` registration.
#[derive(Clone)]
pub struct RouteEntry {
    pub path: String,
    pub method: Method,
    handler: RouteHandler,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("path", &self.path)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Exact-match routing table.
#[derive(Clone, Default, Debug)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a handler for `method` requests to exactly `path`.
    ///
    /// The first registration of a `(path, method)` pair wins; later duplicates are
    /// kept but never matched.
    pub fn register<F>(&mut self, path: &str, method: Method, handler: F)
    where
        F: Fn(&str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        if self.lookup(path, &method).is_some() {
            warn!(path = %path, method = %method, "duplicate route registration is shadowed");
        }
        self.routes.push(RouteEntry {
            path: path.to_string(),
            method,
            handler: Arc::new(handler),
        });
    }

    #[must_use]
    pub fn lookup(&self, path: &str, method: &Method) -> Option<&RouteEntry> {
        self.routes
            .iter()
            .find(|entry| entry.method == *method && entry.path == path)
    }

    /// Run the handler registered for `(path, method)` with `body`.
    ///
    /// Returns `Ok(true)` when a handler ran and `Ok(false)` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Failed`] when the matched handler returns an error.
    pub fn dispatch(&self, path: &str, method: &Method, body: &str) -> Result<bool, HandlerError> {
        let Some(entry) = self.lookup(path, method) else {
            debug!(path = %path, method = %method, "no route matched");
            return Ok(false);
        };
        (entry.handler)(body).map_err(|source| HandlerError::Failed {
            method: method.clone(),
            path: path.to_string(),
            source,
        })?;
        Ok(true)
    }
}
