//! # Router Module
//!
//! Different resources can carry different CORS policies. The router keeps
//! an ordered table of `(route pattern, options)` pairs and selects the
//! first entry whose pattern matches the request path.
//!
//! ## Patterns
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `/pets` | exactly `/pets` |
//! | `/pets/*` | `/pets`, `/pets/1`, `/pets/1/toys`, ... |
//! | `*` | every path |
//!
//! ## Lifecycle
//!
//! 1. **Compilation**: at startup each pattern becomes a [`RouteSpec`] and
//!    each override set is merged with the defaults into an immutable
//!    [`Options`](crate::cors::Options).
//! 2. **Matching**: per request, entries are tested in declaration order.
//!    No entry falls through past a match; a path with no match gets no
//!    CORS headers at all.

mod core;
mod route;
#[cfg(test)]
mod tests;

pub use core::{select_options_for_path, CorsOutcome, CorsRouter, CorsRouterBuilder, RouterEntry};
pub use route::{compile_route, RouteSpec, WILDCARD_SEGMENT};
