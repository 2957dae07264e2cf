//! Response header composition.
//!
//! `apply_simple_headers` decorates an actual response and lets the
//! pipeline continue; `apply_preflight_headers` decorates a preflight
//! answer, and `send_preflight_response` additionally finalizes it. On any
//! failed check the response is left exactly as it was: the browser turns
//! missing headers into the CORS error, not the server.

use serde::Serialize;

use super::classify::wants_preflight_response;
use super::error::PredicateError;
use super::observer::{emit, CorsEvent, EventKind, RejectReason, RequestKind};
use super::options::{AllowList, OriginSpec, Origins, Options};
use super::preflight::validate_preflight;
use super::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_ALLOW_PRIVATE_NETWORK,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ORIGIN, VARY,
};
use crate::server::{RequestView, ResponseSink};

/// Result of one header decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum CorsDecision {
    /// CORS headers were attached
    Accepted,
    /// A CORS request failed a check; the response is untouched
    Rejected(RejectReason),
    /// Not a CORS request of the expected kind; the response is untouched
    Skipped,
}

impl CorsDecision {
    /// Returns `true` if headers were attached
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, CorsDecision::Accepted)
    }
}

/// Value to emit in `Access-Control-Allow-Origin`
enum AllowOrigin<'a> {
    /// Constant `*`
    Any,
    /// The requesting (or single configured) origin
    Mirror(&'a str),
    /// Allowed, but there is no origin to name
    Omit,
}

/// Decide the `Access-Control-Allow-Origin` value, or `None` if the origin is rejected
///
/// Without an `Origin` header (passthrough only) a wildcard policy still
/// yields `*` and a single exact origin is emitted as configured.
fn allowed_origin<'a>(
    req: &'a dyn RequestView,
    opts: &'a Options,
) -> Result<Option<AllowOrigin<'a>>, PredicateError> {
    match req.header(ORIGIN) {
        Some(origin) => {
            if !opts.origins.matches(origin, req)? {
                return Ok(None);
            }
            if opts.origins.is_wildcard() && !opts.allow_credentials {
                Ok(Some(AllowOrigin::Any))
            } else {
                Ok(Some(AllowOrigin::Mirror(origin)))
            }
        }
        None if opts.passthrough_non_cors => Ok(Some(match &opts.origins {
            Origins::Any => AllowOrigin::Any,
            Origins::One(OriginSpec::Exact(origin)) => AllowOrigin::Mirror(origin),
            _ => AllowOrigin::Omit,
        })),
        None => Ok(None),
    }
}

/// Append `origin` to `Vary` unless it is already covered
fn merge_vary(resp: &mut dyn ResponseSink) {
    let covered = resp
        .header_values(VARY)
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|token| token == "*" || token.eq_ignore_ascii_case("origin"));
    if !covered {
        resp.append_header(VARY, "origin".to_string());
    }
}

/// Headers shared by simple and preflight responses
fn put_common_headers(resp: &mut dyn ResponseSink, opts: &Options, allow: AllowOrigin<'_>) {
    match allow {
        AllowOrigin::Any => {
            resp.set_header(ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string());
        }
        AllowOrigin::Mirror(origin) => {
            resp.set_header(ACCESS_CONTROL_ALLOW_ORIGIN, origin.to_string());
            merge_vary(resp);
        }
        AllowOrigin::Omit => merge_vary(resp),
    }

    if opts.allow_credentials {
        resp.set_header(ACCESS_CONTROL_ALLOW_CREDENTIALS, "true".to_string());
    }
}

fn event(
    kind: EventKind,
    request: RequestKind,
    req: &dyn RequestView,
    reason: Option<RejectReason>,
) -> CorsEvent {
    CorsEvent {
        kind,
        request,
        origin: req.header(ORIGIN).map(str::to_string),
        reason,
    }
}

fn reject(
    opts: &Options,
    request: RequestKind,
    req: &dyn RequestView,
    reason: RejectReason,
) -> CorsDecision {
    emit(
        &opts.log,
        opts.observer.as_ref(),
        event(EventKind::Rejected, request, req, Some(reason.clone())),
    );
    CorsDecision::Rejected(reason)
}

/// Attach the headers of an actual (non-preflight) CORS response
///
/// Emits `Access-Control-Allow-Origin`, `Vary` (for non-constant origins),
/// `Access-Control-Allow-Credentials` and `Access-Control-Expose-Headers`.
///
/// # Errors
///
/// Propagates a [`PredicateError`] from a predicate origin check. The
/// response is not modified in that case.
pub fn apply_simple_headers(
    req: &dyn RequestView,
    resp: &mut dyn ResponseSink,
    opts: &Options,
) -> Result<CorsDecision, PredicateError> {
    if req.header(ORIGIN).is_none() && !opts.passthrough_non_cors {
        emit(
            &opts.log,
            opts.observer.as_ref(),
            event(EventKind::Invalid, RequestKind::Simple, req, None),
        );
        return Ok(CorsDecision::Skipped);
    }

    let Some(allow) = allowed_origin(req, opts)? else {
        return Ok(reject(
            opts,
            RequestKind::Simple,
            req,
            RejectReason::OriginNotAllowed,
        ));
    };

    put_common_headers(resp, opts, allow);
    if let Some(expose) = &opts.expose_headers {
        resp.set_header(ACCESS_CONTROL_EXPOSE_HEADERS, expose.clone());
    }

    emit(
        &opts.log,
        opts.observer.as_ref(),
        event(EventKind::Accepted, RequestKind::Simple, req, None),
    );
    Ok(CorsDecision::Accepted)
}

/// Attach the headers of a preflight response
///
/// Validates origin, method and headers first. Under `AllowList::All`
/// only what was requested is echoed back.
///
/// # Errors
///
/// Propagates a [`PredicateError`] from a predicate origin check. The
/// response is not modified in that case.
pub fn apply_preflight_headers(
    req: &dyn RequestView,
    resp: &mut dyn ResponseSink,
    opts: &Options,
) -> Result<CorsDecision, PredicateError> {
    if !wants_preflight_response(req, opts) {
        emit(
            &opts.log,
            opts.observer.as_ref(),
            event(EventKind::Invalid, RequestKind::Preflight, req, None),
        );
        return Ok(CorsDecision::Skipped);
    }

    let Some(allow) = allowed_origin(req, opts)? else {
        return Ok(reject(
            opts,
            RequestKind::Preflight,
            req,
            RejectReason::OriginNotAllowed,
        ));
    };

    let preflight = match validate_preflight(req, opts) {
        Ok(preflight) => preflight,
        Err(reason) => return Ok(reject(opts, RequestKind::Preflight, req, reason)),
    };

    put_common_headers(resp, opts, allow);

    if opts.allow_private_network {
        resp.set_header(ACCESS_CONTROL_ALLOW_PRIVATE_NETWORK, "true".to_string());
    }

    let methods = match &opts.allow_methods {
        AllowList::All => preflight.method,
        AllowList::Exactly(_) => opts.allow_methods_value.clone(),
    };
    if let Some(methods) = methods {
        resp.set_header(ACCESS_CONTROL_ALLOW_METHODS, methods);
    }

    let headers = match &opts.allow_headers {
        AllowList::All if preflight.headers.is_empty() => None,
        AllowList::All => Some(preflight.headers.join(", ")),
        AllowList::Exactly(_) => opts.allow_headers_value.clone(),
    };
    if let Some(headers) = headers {
        resp.set_header(ACCESS_CONTROL_ALLOW_HEADERS, headers);
    }

    if let Some(max_age) = &opts.max_age {
        resp.set_header(ACCESS_CONTROL_MAX_AGE, max_age.clone());
    }

    emit(
        &opts.log,
        opts.observer.as_ref(),
        event(EventKind::Accepted, RequestKind::Preflight, req, None),
    );
    Ok(CorsDecision::Accepted)
}

/// Apply preflight headers, then finalize the response with `200` and an empty body
///
/// The response is finalized whether or not the preflight was accepted;
/// a rejected preflight simply carries no CORS headers.
///
/// # Errors
///
/// Propagates a [`PredicateError`] from a predicate origin check, in which
/// case the response is neither decorated nor finalized.
pub fn send_preflight_response(
    req: &dyn RequestView,
    resp: &mut dyn ResponseSink,
    opts: &Options,
) -> Result<CorsDecision, PredicateError> {
    send_preflight_response_with(req, resp, opts, 200, "")
}

/// [`send_preflight_response`] with an explicit status and body
///
/// # Errors
///
/// Same as [`send_preflight_response`].
pub fn send_preflight_response_with(
    req: &dyn RequestView,
    resp: &mut dyn ResponseSink,
    opts: &Options,
    status: u16,
    body: &str,
) -> Result<CorsDecision, PredicateError> {
    let decision = apply_preflight_headers(req, resp, opts)?;
    resp.respond_and_halt(status, body);
    Ok(decision)
}
