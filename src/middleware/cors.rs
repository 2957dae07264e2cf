use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use super::Middleware;
use crate::cors::{apply_simple_headers, send_preflight_response, wants_preflight_response};
use crate::router::CorsRouter;
use crate::server::{CorsRequest, CorsResponse, RequestView};

/// CORS middleware backed by a per-route policy table
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    router: Arc<CorsRouter>,
}

impl CorsMiddleware {
    #[must_use]
    pub fn new(router: Arc<CorsRouter>) -> Self {
        Self { router }
    }

    /// The policy table this middleware consults
    #[must_use]
    pub fn router(&self) -> &CorsRouter {
        &self.router
    }
}

impl Middleware for CorsMiddleware {
    fn before(&self, req: &CorsRequest) -> Option<CorsResponse> {
        let segments = req.path_segments();
        let opts = self.router.select(&segments)?;
        if !wants_preflight_response(req, opts) {
            return None;
        }

        let mut resp = CorsResponse::new(200);
        match send_preflight_response(req, &mut resp, opts) {
            Ok(decision) => {
                debug!(path = %req.path, decision = ?decision, "CORS preflight answered");
                Some(resp)
            }
            Err(e) => {
                error!(path = %req.path, error = %e, "CORS origin predicate failed");
                Some(CorsResponse::internal_error())
            }
        }
    }

    fn after(&self, req: &CorsRequest, res: &mut CorsResponse, _latency: Duration) {
        if res.halted {
            return;
        }
        let segments = req.path_segments();
        let Some(opts) = self.router.select(&segments) else {
            return;
        };
        if wants_preflight_response(req, opts) {
            return;
        }

        if let Err(e) = apply_simple_headers(req, res, opts) {
            error!(path = %req.path, error = %e, "CORS origin predicate failed");
            res.status = 500;
        }
    }
}
