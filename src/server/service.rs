use super::request::{read_request, ParsedRequest, ReadOutcome};
use super::response::write_ack;
use crate::router::{HandlerError, RouteTable};
use std::any::Any;
use std::io::{self, Read, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// The request listener: buffers each request, dispatches it through the route
/// table and acknowledges it with `200 OK` no matter what the handler did.
///
/// The accept loop clones the service for every connection; the route table is
/// shared and never mutated after construction.
#[derive(Clone)]
pub struct DumpService {
    routes: Arc<RouteTable>,
}

impl DumpService {
    #[must_use]
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes: Arc::new(routes),
        }
    }

    /// Dispatch a parsed request, converting a handler panic into a [`HandlerError`].
    ///
    /// # Errors
    ///
    /// Returns the handler's error, or [`HandlerError::Panicked`] if it panicked.
    pub fn handle(&self, req: &ParsedRequest) -> Result<bool, HandlerError> {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.routes.dispatch(&req.target, &req.method, &req.body)
        }));
        match outcome {
            Ok(result) => result,
            Err(panic) => Err(HandlerError::Panicked {
                method: req.method.clone(),
                path: req.target.clone(),
                message: panic_message(panic.as_ref()),
            }),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl DumpService {
    /// Serve requests on one connection until the peer closes it or a request
    /// asks for the connection to be closed.
    ///
    /// Every request that arrives in full is acknowledged, including those whose
    /// head cannot be parsed; after such a request the connection is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from or writing to the connection fails.
    pub fn serve_connection<S: Read + Write>(&self, stream: &mut S) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            match read_request(stream, &mut buf)? {
                ReadOutcome::Request {
                    request,
                    keep_alive,
                } => {
                    self.call(&request);
                    write_ack(stream, keep_alive)?;
                    if !keep_alive {
                        return Ok(());
                    }
                }
                ReadOutcome::Malformed => return write_ack(stream, false),
                ReadOutcome::Closed => return Ok(()),
            }
        }
    }

    fn call(&self, req: &ParsedRequest) {
        match self.handle(req) {
            Ok(true) => debug!(method = %req.method, target = %req.target, "request dispatched"),
            Ok(false) => debug!(method = %req.method, target = %req.target, "no route, acknowledged"),
            Err(err) => error!(error = %err, "handler failed, acknowledging anyway"),
        }
    }
}
