//! # Middleware Module
//!
//! Adapts a [`CorsRouter`](crate::router::CorsRouter) to a
//! `before`/`after` request pipeline.
//!
//! - `before` answers routed preflights directly and halts the pipeline
//! - `after` decorates the handler's response with simple-response headers
//!
//! A failing origin predicate turns into a `500` in both hooks.

mod core;
mod cors;

pub use core::Middleware;
pub use cors::CorsMiddleware;
