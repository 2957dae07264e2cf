use std::time::Duration;

use crate::server::{CorsRequest, CorsResponse};

/// Request pipeline hook
///
/// `before` runs ahead of the handler and may short-circuit it by returning
/// a response; `after` runs on the handler's response.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &CorsRequest) -> Option<CorsResponse> {
        None
    }
    fn after(&self, _req: &CorsRequest, _res: &mut CorsResponse, _latency: Duration) {}
}
