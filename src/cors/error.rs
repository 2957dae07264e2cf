use thiserror::Error;

/// CORS configuration error
///
/// Returned by [`normalize_options`](super::normalize_options) and
/// `CorsOptionsBuilder::build()` when the configuration is invalid or
/// violates CORS requirements. These are setup-time failures: a service
/// that receives one must refuse to start.
#[derive(Debug, Clone, Error)]
pub enum CorsConfigError {
    /// No `origins` were configured
    #[error("CORS configuration error: `origins` is required")]
    MissingOrigins,

    /// The wildcard marker was given inside an origin list
    ///
    /// `*` must be the whole origin specification, never one list element.
    #[error(
        "CORS configuration error: the wildcard origin (*) must appear alone, \
        not inside a list of origins"
    )]
    WildcardInOriginList,

    /// An origin list was given but it contains no entries
    #[error("CORS configuration error: the origin list must not be empty")]
    EmptyOriginList,

    /// Wildcard origin (`*`) cannot be used with credentials
    ///
    /// When `allow_credentials` is `true`, you must specify exact origins,
    /// patterns or a predicate, not a wildcard.
    #[error(
        "CORS configuration error: Cannot use wildcard origin (*) with credentials. \
        When allow_credentials is true, you must specify exact origins."
    )]
    WildcardWithCredentials,

    /// An origin pattern failed to compile as a regular expression
    #[error("CORS configuration error: invalid origin pattern '{pattern}': {source}")]
    InvalidOriginPattern {
        /// The offending pattern text
        pattern: String,
        /// Compilation error reported by `regex`
        #[source]
        source: regex::Error,
    },

    /// A string other than `all` / `*` was given where a list was expected
    #[error("CORS configuration error: `{field}` must be a list or \"all\", got \"{value}\"")]
    InvalidAllowKeyword {
        /// Option name (`allow_methods` or `allow_headers`)
        field: &'static str,
        /// The unrecognised keyword
        value: String,
    },

    /// A configured method is not a valid HTTP method token
    #[error("CORS configuration error: invalid HTTP method '{0}'")]
    InvalidMethod(String),

    /// A configured header is not a valid HTTP header name
    #[error("CORS configuration error: invalid header name '{0}'")]
    InvalidHeaderName(String),
}

/// Failure raised by a user-supplied origin predicate
///
/// Propagated to the caller as an internal error. It is never folded into
/// "origin not allowed", since it most likely points at a broken policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("origin predicate failed: {message}")]
pub struct PredicateError {
    message: String,
}

impl PredicateError {
    /// Create a predicate error with a human readable message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message supplied by the predicate
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
