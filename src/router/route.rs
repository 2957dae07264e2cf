//! Route pattern compilation.
//!
//! Patterns are a tiny DSL: literal segments separated by `/`, optionally
//! ending in `*` ("any remaining segments"). A lone `*` matches every path.

use std::fmt;

/// The wildcard token
pub const WILDCARD_SEGMENT: &str = "*";

/// Compiled route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSpec {
    /// Matches every path
    Any,
    /// Segment-for-segment equality
    Exact(Vec<String>),
    /// These leading segments followed by zero or more others
    Prefix(Vec<String>),
}

impl RouteSpec {
    /// The "match any path" sentinel
    #[must_use]
    pub fn any() -> Self {
        RouteSpec::Any
    }

    /// Check decomposed request path segments against this route
    #[must_use]
    pub fn matches(&self, segments: &[&str]) -> bool {
        match self {
            RouteSpec::Any => true,
            RouteSpec::Exact(expected) => {
                expected.len() == segments.len()
                    && expected.iter().zip(segments).all(|(e, s)| e == s)
            }
            RouteSpec::Prefix(prefix) => {
                prefix.len() <= segments.len()
                    && prefix.iter().zip(segments).all(|(p, s)| p == s)
            }
        }
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSpec::Any => write!(f, "{WILDCARD_SEGMENT}"),
            RouteSpec::Exact(segments) => write!(f, "/{}", segments.join("/")),
            RouteSpec::Prefix(segments) if segments.is_empty() => write!(f, "/{WILDCARD_SEGMENT}"),
            RouteSpec::Prefix(segments) => {
                write!(f, "/{}/{WILDCARD_SEGMENT}", segments.join("/"))
            }
        }
    }
}

/// Compile a path pattern into a [`RouteSpec`]
///
/// - empty segments are discarded, so `/a//b/` equals `/a/b`
/// - a trailing `*` turns the rest into a prefix match
/// - `*` on its own (or `/*`) matches any path
/// - a `*` anywhere but last is an ordinary literal segment
#[must_use]
pub fn compile_route(pattern: &str) -> RouteSpec {
    let mut segments: Vec<String> = pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if segments.last().map(String::as_str) == Some(WILDCARD_SEGMENT) {
        segments.pop();
        if segments.is_empty() {
            return RouteSpec::Any;
        }
        return RouteSpec::Prefix(segments);
    }

    RouteSpec::Exact(segments)
}
