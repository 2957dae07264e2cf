use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use tracing::warn;

use super::request::HeaderVec;

/// Write side of an HTTP response, as seen by the CORS engine
///
/// Header names passed in are lowercase static strings. Implementations
/// own the response for the lifetime of one request only.
pub trait ResponseSink {
    /// All values currently set for the named header (case-insensitive)
    fn header_values(&self, name: &str) -> Vec<&str>;

    /// Replace every value of the header with `value`
    fn set_header(&mut self, name: &'static str, value: String);

    /// Add `value` without touching existing values of the header
    fn append_header(&mut self, name: &'static str, value: String);

    /// Finalize the response with `status` and `body`; nothing further
    /// in the request pipeline may run after this.
    fn respond_and_halt(&mut self, status: u16, body: &str);
}

/// Response produced by [`CorsMiddleware`](crate::middleware::CorsMiddleware)
/// and the `brrtcors` binary
#[derive(Debug, Clone, Default)]
pub struct CorsResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Response body
    pub body: String,
    /// Set once the response has been finalized by a preflight
    pub halted: bool,
}

impl CorsResponse {
    /// Create a new response with the given status and no headers
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Plain-text 500 response, used when an origin predicate fails
    #[must_use]
    pub fn internal_error() -> Self {
        Self {
            status: 500,
            headers: HeaderVec::new(),
            body: "Internal Server Error".to_string(),
            halted: true,
        }
    }

    /// Get the first value of a header by name (case-insensitive)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        // Remove existing header with same name (case-insensitive)
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

impl ResponseSink for CorsResponse {
    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn set_header(&mut self, name: &'static str, value: String) {
        CorsResponse::set_header(self, name, value);
    }

    fn append_header(&mut self, name: &'static str, value: String) {
        self.headers.push((Arc::from(name), value));
    }

    fn respond_and_halt(&mut self, status: u16, body: &str) {
        self.status = status;
        self.body = body.to_string();
        self.halted = true;
    }
}

fn header_pair(name: &str, value: String) -> Option<(HeaderName, HeaderValue)> {
    let header_name = match HeaderName::from_bytes(name.as_bytes()) {
        Ok(n) => n,
        Err(e) => {
            warn!(header = name, error = %e, "Dropping invalid header name");
            return None;
        }
    };
    match HeaderValue::try_from(value) {
        Ok(v) => Some((header_name, v)),
        Err(e) => {
            warn!(header = name, error = %e, "Dropping invalid header value");
            None
        }
    }
}

/// Header values that cannot be represented (control characters, etc.) are
/// dropped with a warning instead of corrupting the response.
impl<B> ResponseSink for http::Response<B>
where
    B: From<String>,
{
    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    fn set_header(&mut self, name: &'static str, value: String) {
        if let Some((name, value)) = header_pair(name, value) {
            self.headers_mut().insert(name, value);
        }
    }

    fn append_header(&mut self, name: &'static str, value: String) {
        if let Some((name, value)) = header_pair(name, value) {
            self.headers_mut().append(name, value);
        }
    }

    fn respond_and_halt(&mut self, status: u16, body: &str) {
        *self.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
        *self.body_mut() = B::from(body.to_string());
    }
}
