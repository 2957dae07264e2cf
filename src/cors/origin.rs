//! Origin matching.

use super::error::PredicateError;
use super::options::{OriginSpec, Origins};
use crate::server::RequestView;

impl OriginSpec {
    /// Check a single specification against an `Origin` value
    ///
    /// # Errors
    ///
    /// Propagates a [`PredicateError`] raised by a predicate specification.
    pub fn matches(&self, origin: &str, req: &dyn RequestView) -> Result<bool, PredicateError> {
        match self {
            OriginSpec::Exact(allowed) => Ok(allowed == origin),
            OriginSpec::Pattern(re) => Ok(re.is_match(origin)),
            OriginSpec::Predicate(check) => check(origin, req),
        }
    }
}

impl Origins {
    /// Check if an origin is allowed
    ///
    /// Lists short-circuit on the first matching element, so predicates later
    /// in the list are not invoked once an earlier entry matched.
    ///
    /// # Errors
    ///
    /// Propagates a [`PredicateError`] raised by a predicate specification.
    pub fn matches(&self, origin: &str, req: &dyn RequestView) -> Result<bool, PredicateError> {
        match self {
            Origins::Any => Ok(true),
            Origins::One(spec) => spec.matches(origin, req),
            Origins::List(specs) => {
                for spec in specs {
                    if spec.matches(origin, req)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

/// Decide whether `origin` is accepted by `origins`
///
/// # Errors
///
/// Propagates a [`PredicateError`] raised by a predicate specification.
pub fn origin_matches(
    origin: &str,
    origins: &Origins,
    req: &dyn RequestView,
) -> Result<bool, PredicateError> {
    origins.matches(origin, req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::CorsRequest;
    use http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn req() -> CorsRequest {
        CorsRequest::new(Method::GET, "/")
    }

    #[test]
    fn test_wildcard_matches_anything() {
        for origin in ["https://a.com", "null", ""] {
            assert!(Origins::Any.matches(origin, &req()).unwrap());
        }
    }

    #[test]
    fn test_exact_is_byte_exact() {
        let spec = Origins::One(OriginSpec::exact("https://a.com"));
        assert!(spec.matches("https://a.com", &req()).unwrap());
        assert!(!spec.matches("https://A.com", &req()).unwrap());
        assert!(!spec.matches("http://a.com", &req()).unwrap());
        assert!(!spec.matches("https://a.com/", &req()).unwrap());
    }

    #[test]
    fn test_pattern_matches_anywhere() {
        let spec = Origins::One(OriginSpec::pattern(r"example\.com").unwrap());
        assert!(spec.matches("https://api.example.com", &req()).unwrap());
        assert!(spec.matches("https://example.com.evil.net", &req()).unwrap());
        assert!(!spec.matches("https://example.org", &req()).unwrap());

        let anchored = Origins::One(OriginSpec::pattern(r"^https://.*\.example\.com$").unwrap());
        assert!(anchored.matches("https://api.example.com", &req()).unwrap());
        assert!(!anchored.matches("https://example.com.evil.net", &req()).unwrap());
    }

    #[test]
    fn test_predicate_sees_request_and_captured_args() {
        let suffix = ".internal".to_string();
        let spec = Origins::One(OriginSpec::predicate(move |origin, req| {
            Ok(origin.ends_with(&suffix) && req.header("x-tenant").is_some())
        }));
        let tenant = req().with_header("X-Tenant", "acme");
        assert!(spec.matches("https://svc.internal", &tenant).unwrap());
        assert!(!spec.matches("https://svc.internal", &req()).unwrap());
    }

    #[test]
    fn test_predicate_error_propagates() {
        let spec = Origins::One(OriginSpec::predicate(|_, _| {
            Err(PredicateError::new("tenant lookup failed"))
        }));
        let err = spec.matches("https://a.com", &req()).unwrap_err();
        assert_eq!(err.message(), "tenant lookup failed");
    }

    #[test]
    fn test_list_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let spec = Origins::List(vec![
            OriginSpec::exact("https://a.com"),
            OriginSpec::predicate(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(false)
            }),
        ]);
        assert!(origin_matches("https://a.com", &spec, &req()).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!origin_matches("https://b.com", &spec, &req()).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
