use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;

/// Maximum number of headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the per-request hot path.
///
/// Header names use `Arc<str>` because most of them are static strings
/// known up front; values are per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Read-only view over an inbound HTTP request
///
/// This is everything the CORS engine needs from the host server. Header
/// lookups are case-insensitive and return every value in arrival order
/// (an empty vector when the header is absent).
pub trait RequestView {
    /// Request method as sent by the client (e.g. `"OPTIONS"`)
    fn method(&self) -> &str;

    /// Non-empty path segments in order (`/a//b/` yields `["a", "b"]`)
    fn path_segments(&self) -> Vec<&str>;

    /// All values of the named header
    fn header_values(&self, name: &str) -> Vec<&str>;

    /// First value of the named header, if any
    fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).into_iter().next()
    }
}

/// Split a URL path into its non-empty segments
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Minimal owned request used by [`CorsMiddleware`](crate::middleware::CorsMiddleware)
/// and the `brrtcors` binary
#[derive(Debug, Clone)]
pub struct CorsRequest {
    /// HTTP method (GET, OPTIONS, etc.)
    pub method: Method,
    /// Request path without query string
    pub path: String,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
}

impl CorsRequest {
    /// Create a request with no headers
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderVec::new(),
        }
    }

    /// Add a header, keeping any existing values with the same name
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Get the first value of a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl RequestView for CorsRequest {
    fn method(&self) -> &str {
        self.method.as_str()
    }

    fn path_segments(&self) -> Vec<&str> {
        split_path(&self.path)
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Values that are not visible ASCII are skipped rather than failing the lookup.
impl<B> RequestView for http::Request<B> {
    fn method(&self) -> &str {
        http::Request::method(self).as_str()
    }

    fn path_segments(&self) -> Vec<&str> {
        split_path(self.uri().path())
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}
