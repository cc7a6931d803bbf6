//! # Server Module
//!
//! The network front end: a coroutine-per-connection listener on `may::net` that
//! buffers each request body, dispatches it through the
//! [`RouteTable`](crate::router::RouteTable), and always answers `200 OK`.
//!
//! - [`DumpService`] - the request listener, one connection at a time
//! - [`HttpServer`] / [`ServerHandle`] - binding and graceful stop
//! - [`DumpServer`] - the lifecycle controller: start, close, restart
//!
//! Decode failures, handler errors and handler panics are logged and never reach
//! the client; the only failure reported to the caller is a [`BindError`].

pub mod http_server;
pub mod lifecycle;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use lifecycle::{
    dump_routes, BindError, ClearCallback, DumpServer, ValueCallback, CLEAR_PATH, DUMP_PATH,
};
pub use request::{read_request, ParsedRequest, ReadOutcome};
pub use service::DumpService;
