//! # dumppad
//!
//! **dumppad** is a local dump listener: a debugged program posts loosely-typed JSON
//! values to it, and each value is classified by its Json.NET structural markers and
//! rendered into an HTML pad.
//!
//! ## Architecture
//!
//! - **[`router`]** - exact (path, method) route table
//! - **[`server`]** - coroutine listener on `may::net` and its start/close/restart lifecycle
//! - **[`type_name`]** - parser for assembly-qualified .NET type names
//! - **[`formatter`]** - dump classification engine and HTML format providers
//! - **[`pad_view`]** - ordered presentation sink with optional file output
//! - **[`app`]** - wiring between settings, sink and listener
//! - **[`config`]** / **[`runtime_config`]** - YAML configuration and env overrides
//! - **[`hot_reload`]** - restart the listener when the configuration file changes
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `dumppad` command line
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Producer
//!     participant Server as DumpService<br/>(may coroutine)
//!     participant Routes as RouteTable
//!     participant Worker as pad worker
//!     participant Pad as PadView
//!
//!     Producer->>Server: POST / {"$type": "...DumpContainer...", ...}
//!     Server->>Server: Buffer body
//!     Server->>Routes: dispatch("/", POST, body)
//!     Routes->>Routes: Decode JSON
//!     alt Undecodable body
//!         Routes->>Routes: Log and drop
//!     end
//!     Routes->>Worker: PadEvent::Dump(value)
//!     Server-->>Producer: 200 OK
//!     Worker->>Worker: classify(value, settings)
//!     Worker->>Pad: dump(&Formatter)
//!     Pad->>Pad: Render fragment, rewrite page
//! ```
//!
//! Every request is answered `200 OK`, whether or not a route matched and whether
//! or not its handler succeeded.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dumppad::app::App;
//! use dumppad::config::PadConfig;
//! use dumppad::pad_view::PadView;
//!
//! let view = PadView::new(Some("pad.html".into())).expect("templates");
//! let app = App::new(Box::new(view)).expect("pad worker");
//! match app.start(&PadConfig::default()) {
//!     Ok(addr) => println!("listening on {addr}"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! ## Runtime Considerations
//!
//! dumppad uses the `may` coroutine runtime. Connection coroutine stack size is
//! configurable via the `DUMPPAD_STACK_SIZE` environment variable; rendering runs
//! on a dedicated OS thread.

pub mod app;
pub mod cli;
pub mod config;
pub mod formatter;
pub mod hot_reload;
pub mod logging;
pub mod pad_view;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod type_name;

pub use app::{App, PadEvent};
pub use config::{ConfigError, PadConfig};
pub use formatter::{classify, classify_optional, FormatSettings, Formatter, Variant};
pub use server::{BindError, DumpServer};
