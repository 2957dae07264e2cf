//! # CORS Module
//!
//! The decision engine: given a request and an immutable [`Options`] policy,
//! decide which CORS response headers (if any) to attach.
//!
//! ## Flow
//!
//! 1. **Classify** - [`is_cors_request`] / [`is_preflight_request`]
//! 2. **Match origin** - [`Origins::matches`] against the `Origin` header
//! 3. **Validate preflight** - [`validate_preflight`] checks the requested
//!    method and headers against the allow-lists and the simple sets
//! 4. **Compose** - [`apply_simple_headers`] or [`apply_preflight_headers`]
//!    writes the header set; [`send_preflight_response`] also finalizes the
//!    response with `200` and an empty body
//!
//! A failed check at any step leaves the response untouched.
//!
//! ## Credentials and the wildcard
//!
//! `origins: *` together with `allow_credentials: true` is rejected by
//! [`normalize_options`] with [`CorsConfigError::WildcardWithCredentials`],
//! so `Access-Control-Allow-Origin: *` is never sent on a credentialed
//! response.
//!
//! ## Example
//!
//! ```rust
//! use brrtcors::cors::{apply_simple_headers, CorsOptionsBuilder};
//! use brrtcors::server::{CorsRequest, CorsResponse};
//! use http::Method;
//!
//! let opts = CorsOptionsBuilder::new()
//!     .allowed_origins(&["https://app.example.com"])
//!     .build()
//!     .unwrap();
//!
//! let req = CorsRequest::new(Method::GET, "/pets")
//!     .with_header("Origin", "https://app.example.com");
//! let mut resp = CorsResponse::new(200);
//!
//! apply_simple_headers(&req, &mut resp, &opts).unwrap();
//! assert_eq!(
//!     resp.get_header("access-control-allow-origin"),
//!     Some("https://app.example.com")
//! );
//! assert_eq!(resp.get_header("vary"), Some("origin"));
//! ```

mod builder;
mod classify;
mod error;
mod headers;
mod observer;
mod options;
mod origin;
mod preflight;

pub use builder::CorsOptionsBuilder;
pub use classify::{is_cors_request, is_preflight_request, wants_preflight_response};
pub use error::{CorsConfigError, PredicateError};
pub use headers::{
    apply_preflight_headers, apply_simple_headers, send_preflight_response,
    send_preflight_response_with, CorsDecision,
};
pub use observer::{
    CorsEvent, CorsObserver, EventKind, EventLevel, LogLevels, ObserverError, RejectReason,
    RequestKind, SharedObserver,
};
pub use options::{
    normalize_options, AllowList, OriginInput, OriginPredicate, OriginSpec, Origins,
    OriginsInput, Options, OptionsInput, DEFAULT_ALLOW_METHODS,
};
pub use origin::origin_matches;
pub use preflight::{
    disallowed_headers, method_allowed, requested_headers, requested_method,
    validate_preflight, PreflightRequest, SIMPLE_HEADERS, SIMPLE_METHODS,
};

pub const ORIGIN: &str = "origin";
pub const VARY: &str = "vary";
pub const ACCESS_CONTROL_REQUEST_METHOD: &str = "access-control-request-method";
pub const ACCESS_CONTROL_REQUEST_HEADERS: &str = "access-control-request-headers";
pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "access-control-allow-origin";
pub const ACCESS_CONTROL_ALLOW_CREDENTIALS: &str = "access-control-allow-credentials";
pub const ACCESS_CONTROL_ALLOW_PRIVATE_NETWORK: &str = "access-control-allow-private-network";
pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "access-control-allow-methods";
pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "access-control-allow-headers";
pub const ACCESS_CONTROL_EXPOSE_HEADERS: &str = "access-control-expose-headers";
pub const ACCESS_CONTROL_MAX_AGE: &str = "access-control-max-age";
