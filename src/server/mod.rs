//! # Server Interface Module
//!
//! The CORS engine never talks to a socket. It reads requests through
//! [`RequestView`] and writes responses through [`ResponseSink`], so any host
//! server can drive it.
//!
//! Two families of implementations ship with the crate:
//!
//! - [`CorsRequest`] / [`CorsResponse`] - small owned types with
//!   `SmallVec`-backed headers, used by the middleware and the CLI
//! - `http::Request<B>` / `http::Response<B>` - for hyper, axum and friends
//!
//! Both are request-scoped: one value per request, never shared.

mod request;
mod response;

pub use request::{split_path, CorsRequest, HeaderVec, RequestView, MAX_INLINE_HEADERS};
pub use response::{CorsResponse, ResponseSink};
