//! # brrtcors
//!
//! **brrtcors** is a CORS decision engine for HTTP services. Given an
//! incoming request and a per-route policy it decides whether the request
//! is cross-origin, whether it is a preflight, whether the origin, method
//! and headers are allowed, and which `Access-Control-*` headers (plus a
//! merged `Vary`) to attach.
//!
//! ## Architecture
//!
//! - **[`cors`]** - options normalization, origin matching, request
//!   classification, preflight validation, header composition and the
//!   observer/event interface
//! - **[`router`]** - route pattern compilation and the ordered
//!   `(route, options)` table with first-match selection
//! - **[`server`]** - the `RequestView` / `ResponseSink` seams, with
//!   implementations for the crate's own request/response types and for
//!   `http::Request` / `http::Response`
//! - **[`middleware`]** - a `before`/`after` middleware wrapping the router
//! - **[`config`]** - YAML / JSON / TOML policy files
//! - **[`logging`]** - tracing subscriber setup for binaries
//! - **[`cli`]** - the `brrtcors` command-line tool
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host server
//!     participant Router as CorsRouter
//!     participant Cors as cors::*
//!     participant Resp as ResponseSink
//!
//!     Host->>Router: handle(req, resp)
//!     Router->>Router: select first matching route
//!     alt preflight (OPTIONS + Origin + ACRM)
//!         Router->>Cors: send_preflight_response
//!         Cors->>Cors: match origin, validate method/headers
//!         Cors->>Resp: Allow-* headers, Vary, 200 + halt
//!         Router-->>Host: Halted
//!     else simple / actual request
//!         Router->>Cors: apply_simple_headers
//!         Cors->>Resp: Allow-Origin, Vary, Expose-Headers
//!         Router-->>Host: Continue
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtcors::cors::CorsOptionsBuilder;
//! use brrtcors::router::{CorsOutcome, CorsRouter};
//! use brrtcors::server::{CorsRequest, CorsResponse};
//! use http::Method;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let router = CorsRouter::builder()
//!     .resource(
//!         "/api/*",
//!         CorsOptionsBuilder::new()
//!             .allowed_origins(&["https://app.example.com"])
//!             .allowed_methods(&["PUT"])
//!             .into_input()?,
//!     )?
//!     .build();
//!
//! let req = CorsRequest::new(Method::OPTIONS, "/api/pets")
//!     .with_header("Origin", "https://app.example.com")
//!     .with_header("Access-Control-Request-Method", "PUT");
//! let mut resp = CorsResponse::new(404);
//!
//! let outcome = router.handle(&req, &mut resp)?;
//! assert!(matches!(outcome, CorsOutcome::Halted(d) if d.is_accepted()));
//! assert_eq!(resp.status, 200);
//! assert_eq!(resp.get_header("access-control-allow-methods"), Some("PUT"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Policy Files
//!
//! See [`config`] for the file format and [`config::load_policy`].
//!
//! ## Logging
//!
//! Every decision is reported as a [`cors::CorsEvent`] and logged through
//! `tracing` at a per-kind level (`accepted`, `rejected`, `invalid`). A
//! custom [`cors::CorsObserver`] can be attached per policy.

pub mod cli;
pub mod config;
pub mod cors;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod server;

pub use config::{load_policy, PolicyError};
pub use cors::{CorsConfigError, CorsOptionsBuilder, Options, PredicateError};
pub use router::{CorsOutcome, CorsRouter};
