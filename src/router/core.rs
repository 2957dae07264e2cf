//! Router core module - per-path policy selection.
//!
//! The table is built once and never mutated; lookups walk the entries in
//! declaration order and stop at the first match.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::route::{compile_route, RouteSpec};
use crate::cors::{
    apply_simple_headers, normalize_options, send_preflight_response, wants_preflight_response,
    CorsConfigError, CorsDecision, Options, OptionsInput, PredicateError,
};
use crate::server::{RequestView, ResponseSink};

/// One `(route, policy)` pair
#[derive(Debug, Clone)]
pub struct RouterEntry {
    /// Compiled route pattern
    pub route: RouteSpec,
    /// Immutable policy shared by every request on this route
    pub options: Arc<Options>,
}

/// What the host server should do after [`CorsRouter::handle`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "cors")]
pub enum CorsOutcome {
    /// Keep processing the request; simple-response headers may have been added
    Continue(CorsDecision),
    /// The response was finalized as a preflight answer; stop the pipeline
    Halted(CorsDecision),
    /// No route matched; the request carries no CORS policy
    Unrouted,
}

/// Select the policy of the first entry whose route matches `segments`
#[must_use]
pub fn select_options_for_path<'a>(
    segments: &[&str],
    table: &'a [RouterEntry],
) -> Option<&'a Options> {
    table
        .iter()
        .find(|entry| entry.route.matches(segments))
        .map(|entry| entry.options.as_ref())
}

/// Ordered table of per-route CORS policies
///
/// # Example
///
/// ```rust
/// use brrtcors::cors::CorsOptionsBuilder;
/// use brrtcors::router::CorsRouter;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let router = CorsRouter::builder()
///     .defaults(CorsOptionsBuilder::new().allowed_origins(&["https://a.com"]).into_input()?)
///     .resource("/public/*", CorsOptionsBuilder::new().any_origin().into_input()?)?
///     .resource("/api/*", Default::default())?
///     .build();
///
/// assert!(router.select(&["public", "logo.png"]).unwrap().origins().is_wildcard());
/// assert!(router.select(&["internal"]).is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CorsRouter {
    entries: Vec<RouterEntry>,
}

impl CorsRouter {
    /// Start building a router
    #[must_use]
    pub fn builder() -> CorsRouterBuilder {
        CorsRouterBuilder::default()
    }

    /// Create a router from already-built entries
    #[must_use]
    pub fn new(entries: Vec<RouterEntry>) -> Self {
        let routes_summary: Vec<String> = entries
            .iter()
            .take(10)
            .map(|e| e.route.to_string())
            .collect();
        info!(
            routes_count = entries.len(),
            routes_summary = ?routes_summary,
            "CORS routing table loaded"
        );
        Self { entries }
    }

    /// Entries in declaration order
    #[must_use]
    pub fn entries(&self) -> &[RouterEntry] {
        &self.entries
    }

    /// Policy for a decomposed path, if any route matches
    #[must_use]
    pub fn select(&self, segments: &[&str]) -> Option<&Options> {
        select_options_for_path(segments, &self.entries)
    }

    /// Run the full CORS pipeline for one request
    ///
    /// Preflights (and, with `passthrough_non_cors`, every `OPTIONS`
    /// request) are answered through `send_preflight_response` and yield
    /// [`CorsOutcome::Halted`]. Everything else gets simple-response headers
    /// and [`CorsOutcome::Continue`].
    ///
    /// # Errors
    ///
    /// Propagates a [`PredicateError`] from a predicate origin check.
    pub fn handle(
        &self,
        req: &dyn RequestView,
        resp: &mut dyn ResponseSink,
    ) -> Result<CorsOutcome, PredicateError> {
        let segments = req.path_segments();
        let Some(opts) = self.select(&segments) else {
            debug!(path = ?segments, "No CORS route matched");
            return Ok(CorsOutcome::Unrouted);
        };

        if wants_preflight_response(req, opts) {
            Ok(CorsOutcome::Halted(send_preflight_response(req, resp, opts)?))
        } else {
            Ok(CorsOutcome::Continue(apply_simple_headers(req, resp, opts)?))
        }
    }
}

/// Builder for [`CorsRouter`]
///
/// Per-route overrides are merged over the defaults and normalized at
/// registration time, producing one immutable [`Options`] per entry.
#[derive(Debug, Default)]
pub struct CorsRouterBuilder {
    defaults: OptionsInput,
    entries: Vec<RouterEntry>,
}

impl CorsRouterBuilder {
    /// Base options inherited by every later `resource` call
    #[must_use]
    pub fn defaults(mut self, defaults: OptionsInput) -> Self {
        self.defaults = defaults;
        self
    }

    /// Register `pattern` with the defaults overlaid by `overrides`
    ///
    /// # Errors
    ///
    /// Returns a [`CorsConfigError`] if the merged options are invalid.
    pub fn resource(
        mut self,
        pattern: &str,
        overrides: OptionsInput,
    ) -> Result<Self, CorsConfigError> {
        let options = normalize_options(self.defaults.clone().merge(overrides))?;
        self.entries.push(RouterEntry {
            route: compile_route(pattern),
            options: Arc::new(options),
        });
        Ok(self)
    }

    /// Register `pattern` with an already-built policy
    #[must_use]
    pub fn resource_with(mut self, pattern: &str, options: Arc<Options>) -> Self {
        self.entries.push(RouterEntry {
            route: compile_route(pattern),
            options,
        });
        self
    }

    /// Finish the table
    #[must_use]
    pub fn build(self) -> CorsRouter {
        CorsRouter::new(self.entries)
    }
}
