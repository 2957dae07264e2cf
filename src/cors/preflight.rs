//! Preflight method / header validation.

use super::observer::RejectReason;
use super::options::{AllowList, Options};
use super::{ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD};
use crate::server::RequestView;

/// Methods a browser sends without preflighting
pub const SIMPLE_METHODS: [&str; 3] = ["GET", "HEAD", "POST"];

/// Headers a browser sends without preflighting (lowercase)
pub const SIMPLE_HEADERS: [&str; 3] = ["accept", "accept-language", "content-language"];

/// What a validated preflight asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightRequest {
    /// `Access-Control-Request-Method`; `None` only for passthrough preflights
    pub method: Option<String>,
    /// Flattened, trimmed, lowercased `Access-Control-Request-Headers`
    pub headers: Vec<String>,
}

/// The requested method, taken from the first `Access-Control-Request-Method` value
#[must_use]
pub fn requested_method(req: &dyn RequestView) -> Option<&str> {
    req.header(ACCESS_CONTROL_REQUEST_METHOD).map(str::trim)
}

/// Every token of every `Access-Control-Request-Headers` value
///
/// Empty tokens (`"a,,b"`, trailing commas) are dropped.
#[must_use]
pub fn requested_headers(req: &dyn RequestView) -> Vec<String> {
    req.header_values(ACCESS_CONTROL_REQUEST_HEADERS)
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Accept a simple method, anything under `All`, or a listed method
///
/// The comparison is case-sensitive; configured methods are uppercase.
#[must_use]
pub fn method_allowed(method: &str, allow: &AllowList) -> bool {
    match allow {
        AllowList::All => true,
        AllowList::Exactly(methods) => {
            SIMPLE_METHODS.contains(&method) || methods.iter().any(|m| m == method)
        }
    }
}

/// Returns the requested headers that are neither simple nor allowed
///
/// An empty result means every header passed.
#[must_use]
pub fn disallowed_headers(headers: &[String], allow: &AllowList) -> Vec<String> {
    match allow {
        AllowList::All => Vec::new(),
        AllowList::Exactly(allowed) => headers
            .iter()
            .filter(|h| !SIMPLE_HEADERS.contains(&h.as_str()) && !allowed.contains(h))
            .cloned()
            .collect(),
    }
}

/// Check the requested method and headers of a preflight against `opts`
///
/// Origin validation is assumed to have happened already. The method is
/// checked first, so a request failing both checks reports the method.
///
/// # Errors
///
/// [`RejectReason::MethodNotAllowed`] or [`RejectReason::HeadersNotAllowed`]
/// (carrying every offending header) when a check fails.
pub fn validate_preflight(
    req: &dyn RequestView,
    opts: &Options,
) -> Result<PreflightRequest, RejectReason> {
    let method = requested_method(req);
    if let Some(method) = method {
        if !method_allowed(method, &opts.allow_methods) {
            return Err(RejectReason::MethodNotAllowed(method.to_string()));
        }
    }

    let headers = requested_headers(req);
    let denied = disallowed_headers(&headers, &opts.allow_headers);
    if !denied.is_empty() {
        return Err(RejectReason::HeadersNotAllowed(denied));
    }

    Ok(PreflightRequest {
        method: method.map(str::to_string),
        headers,
    })
}
