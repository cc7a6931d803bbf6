//! # Router Module
//!
//! The router maps `(path, method)` pairs to handler callbacks. It is deliberately
//! small: the listener serves a fixed set of routes registered once when a server
//! instance is built, and lookup is an exact comparison of both the request target
//! and the HTTP method.
//!
//! ## Dispatch Contract
//!
//! - A request with no matching entry is a no-op, not an error; [`RouteTable::dispatch`]
//!   returns `Ok(false)`.
//! - Handlers receive the fully buffered body as text and decode it themselves.
//! - Handler failures are returned to the caller as [`HandlerError`]; the table does
//!   not swallow them. Panics unwind through `dispatch` as well, so the listener is
//!   the single place that contains them.
//!
//! ## Example
//!
//! ```rust
//! use dumppad::router::RouteTable;
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//! table.register("/clear", Method::GET, |_body: &str| Ok(()));
//!
//! assert!(table.dispatch("/clear", &Method::GET, "").unwrap());
//! assert!(!table.dispatch("/unknown", &Method::GET, "").unwrap());
//! ```

mod core;

pub use core::{HandlerError, RouteEntry, RouteHandler, RouteTable};
