//! Request classification.

use super::options::Options;
use super::{ACCESS_CONTROL_REQUEST_METHOD, ORIGIN};
use crate::server::RequestView;

/// A request is a CORS request iff it carries an `Origin` header
#[must_use]
pub fn is_cors_request(req: &dyn RequestView) -> bool {
    !req.header_values(ORIGIN).is_empty()
}

/// A CORS `OPTIONS` request carrying `Access-Control-Request-Method`
#[must_use]
pub fn is_preflight_request(req: &dyn RequestView) -> bool {
    is_cors_request(req)
        && req.method() == "OPTIONS"
        && !req.header_values(ACCESS_CONTROL_REQUEST_METHOD).is_empty()
}

/// Whether the request should be answered with a preflight response
///
/// With `passthrough_non_cors`, every `OPTIONS` request qualifies.
#[must_use]
pub fn wants_preflight_response(req: &dyn RequestView, opts: &Options) -> bool {
    is_preflight_request(req) || (opts.passthrough_non_cors && req.method() == "OPTIONS")
}
