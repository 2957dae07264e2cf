//! Option model and the configuration normalizer.
//!
//! Everything here runs once, at setup time. The resulting [`Options`] is
//! immutable and `Send + Sync`, so a single value (usually behind an `Arc`)
//! serves every concurrent request without locking.

use std::fmt;
use std::sync::Arc;

use http::header::HeaderName;
use http::Method;
use regex::Regex;
use tracing::debug;

use super::error::{CorsConfigError, PredicateError};
use super::observer::{LogLevels, SharedObserver};
use crate::server::RequestView;

/// Origin check supplied by the configurer
///
/// Receives the `Origin` value and the request being checked. Any extra
/// arguments are captured by the closure. Runs on the request-handling
/// thread, so it must not block.
pub type OriginPredicate =
    Arc<dyn Fn(&str, &dyn RequestView) -> Result<bool, PredicateError> + Send + Sync>;

/// A single origin specification
#[derive(Clone)]
pub enum OriginSpec {
    /// Byte-exact comparison, no scheme or case normalization
    Exact(String),
    /// Regular expression that must match somewhere in the origin
    Pattern(Regex),
    /// Custom validation function
    Predicate(OriginPredicate),
}

impl fmt::Debug for OriginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginSpec::Exact(origin) => f.debug_tuple("Exact").field(origin).finish(),
            OriginSpec::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            OriginSpec::Predicate(_) => write!(f, "Predicate(<function>)"),
        }
    }
}

impl OriginSpec {
    /// Exact origin, e.g. `https://example.com`
    pub fn exact(origin: impl Into<String>) -> Self {
        OriginSpec::Exact(origin.into())
    }

    /// Compile a regex origin pattern
    ///
    /// # Errors
    ///
    /// Returns [`CorsConfigError::InvalidOriginPattern`] if `pattern` is not a
    /// valid regular expression.
    pub fn pattern(pattern: &str) -> Result<Self, CorsConfigError> {
        Regex::new(pattern)
            .map(OriginSpec::Pattern)
            .map_err(|source| CorsConfigError::InvalidOriginPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Wrap a predicate function
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &dyn RequestView) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        OriginSpec::Predicate(Arc::new(f))
    }
}

/// Normalized origin configuration
#[derive(Clone, Debug)]
pub enum Origins {
    /// Every origin is allowed (`*`)
    Any,
    /// A single origin specification
    One(OriginSpec),
    /// Non-empty ordered list, matched with logical OR
    List(Vec<OriginSpec>),
}

impl Origins {
    /// Check if wildcard is enabled
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Origins::Any)
    }
}

/// Allowed methods or headers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllowList {
    /// Anything requested is allowed and echoed back
    All,
    /// Only these tokens (plus the built-in simple ones)
    Exactly(Vec<String>),
}

impl AllowList {
    /// Build an explicit list from string slices
    pub fn exactly<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowList::Exactly(items.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for the allow-all sentinel
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, AllowList::All)
    }
}

/// One element of raw `origins` input
#[derive(Clone, Debug)]
pub enum OriginInput {
    /// The `*` marker
    Wildcard,
    /// A concrete specification
    Spec(OriginSpec),
}

/// Raw `origins` input: a single value or a list
#[derive(Clone, Debug)]
pub enum OriginsInput {
    /// `origins: "*"` or `origins: "https://a.com"`
    Single(OriginInput),
    /// `origins: [...]`
    List(Vec<OriginInput>),
}

/// Raw, unvalidated options
///
/// Every field is optional so that one input can act as a set of overrides
/// for another (see [`OptionsInput::merge`]). Turn it into [`Options`] with
/// [`normalize_options`].
#[derive(Clone, Debug, Default)]
pub struct OptionsInput {
    /// Required by the time the input is normalized
    pub origins: Option<OriginsInput>,
    /// Defaults to `PUT, PATCH, DELETE`
    pub allow_methods: Option<AllowList>,
    /// Defaults to an empty list (only the simple headers)
    pub allow_headers: Option<AllowList>,
    /// Defaults to `false`
    pub allow_credentials: Option<bool>,
    /// Defaults to `false`
    pub allow_private_network: Option<bool>,
    /// Header names exposed to scripts, case preserved
    pub expose_headers: Option<Vec<String>>,
    /// Preflight cache duration in seconds
    pub max_age: Option<u64>,
    /// Defaults to `false`
    pub passthrough_non_cors: Option<bool>,
    /// Per-event log levels
    pub log: Option<LogLevels>,
    /// Extra event sink
    pub observer: Option<SharedObserver>,
}

impl OptionsInput {
    /// Overlay `overrides` on top of `self`
    ///
    /// A field set in `overrides` replaces the one in `self`; unset fields
    /// are inherited.
    #[must_use]
    pub fn merge(self, overrides: OptionsInput) -> OptionsInput {
        OptionsInput {
            origins: overrides.origins.or(self.origins),
            allow_methods: overrides.allow_methods.or(self.allow_methods),
            allow_headers: overrides.allow_headers.or(self.allow_headers),
            allow_credentials: overrides.allow_credentials.or(self.allow_credentials),
            allow_private_network: overrides
                .allow_private_network
                .or(self.allow_private_network),
            expose_headers: overrides.expose_headers.or(self.expose_headers),
            max_age: overrides.max_age.or(self.max_age),
            passthrough_non_cors: overrides.passthrough_non_cors.or(self.passthrough_non_cors),
            log: overrides.log.or(self.log),
            observer: overrides.observer.or(self.observer),
        }
    }
}

/// Methods allowed by default on top of the simple ones
pub const DEFAULT_ALLOW_METHODS: [&str; 3] = ["PUT", "PATCH", "DELETE"];

/// Immutable, validated CORS policy
#[derive(Clone, Debug)]
pub struct Options {
    pub(crate) origins: Origins,
    pub(crate) allow_methods: AllowList,
    pub(crate) allow_headers: AllowList,
    pub(crate) allow_credentials: bool,
    pub(crate) allow_private_network: bool,
    pub(crate) expose_headers: Option<String>,
    pub(crate) max_age: Option<String>,
    pub(crate) passthrough_non_cors: bool,
    pub(crate) log: LogLevels,
    pub(crate) observer: Option<SharedObserver>,
    /// `allow_methods` joined once; `None` for `All` or an empty list
    pub(crate) allow_methods_value: Option<String>,
    /// `allow_headers` joined once; `None` for `All` or an empty list
    pub(crate) allow_headers_value: Option<String>,
}

impl Options {
    /// Start a fluent builder
    #[must_use]
    pub fn builder() -> super::CorsOptionsBuilder {
        super::CorsOptionsBuilder::new()
    }

    /// Configured origins
    #[must_use]
    pub fn origins(&self) -> &Origins {
        &self.origins
    }

    /// Allowed methods (uppercase)
    #[must_use]
    pub fn allow_methods(&self) -> &AllowList {
        &self.allow_methods
    }

    /// Allowed headers (lowercase)
    #[must_use]
    pub fn allow_headers(&self) -> &AllowList {
        &self.allow_headers
    }

    /// Whether `Access-Control-Allow-Credentials: true` is emitted
    #[must_use]
    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Whether private-network preflights are allowed
    #[must_use]
    pub fn allow_private_network(&self) -> bool {
        self.allow_private_network
    }

    /// Pre-joined `Access-Control-Expose-Headers` value
    #[must_use]
    pub fn expose_headers(&self) -> Option<&str> {
        self.expose_headers.as_deref()
    }

    /// Pre-serialized `Access-Control-Max-Age` value
    #[must_use]
    pub fn max_age(&self) -> Option<&str> {
        self.max_age.as_deref()
    }

    /// Whether requests without `Origin` still receive CORS headers
    #[must_use]
    pub fn passthrough_non_cors(&self) -> bool {
        self.passthrough_non_cors
    }

    /// Per-event log levels
    #[must_use]
    pub fn log(&self) -> &LogLevels {
        &self.log
    }
}

/// Validate and canonicalize raw options
///
/// - `origins` is required; `*` must stand alone and lists must be non-empty
/// - methods are uppercased, headers lowercased, both validated as HTTP tokens
/// - `expose_headers` and `max_age` are serialized once, here
/// - wildcard origins combined with credentials are rejected
///
/// # Errors
///
/// Returns a [`CorsConfigError`] describing the first problem found.
pub fn normalize_options(input: OptionsInput) -> Result<Options, CorsConfigError> {
    let origins = normalize_origins(input.origins.ok_or(CorsConfigError::MissingOrigins)?)?;
    let allow_credentials = input.allow_credentials.unwrap_or(false);

    if allow_credentials && origins.is_wildcard() {
        return Err(CorsConfigError::WildcardWithCredentials);
    }

    let allow_methods = match input.allow_methods {
        Some(list) => normalize_methods(list)?,
        None => AllowList::exactly(DEFAULT_ALLOW_METHODS),
    };
    let allow_headers = match input.allow_headers {
        Some(list) => normalize_headers(list)?,
        None => AllowList::Exactly(Vec::new()),
    };

    let expose_headers = match input.expose_headers {
        Some(headers) if !headers.is_empty() => {
            for h in &headers {
                HeaderName::from_bytes(h.as_bytes())
                    .map_err(|_| CorsConfigError::InvalidHeaderName(h.clone()))?;
            }
            Some(headers.join(", "))
        }
        _ => None,
    };

    let options = Options {
        allow_methods_value: joined(&allow_methods),
        allow_headers_value: joined(&allow_headers),
        origins,
        allow_methods,
        allow_headers,
        allow_credentials,
        allow_private_network: input.allow_private_network.unwrap_or(false),
        expose_headers,
        max_age: input.max_age.map(|age| age.to_string()),
        passthrough_non_cors: input.passthrough_non_cors.unwrap_or(false),
        log: input.log.unwrap_or_default(),
        observer: input.observer,
    };

    debug!(
        origins = ?options.origins,
        allow_methods = ?options.allow_methods,
        allow_headers = ?options.allow_headers,
        allow_credentials = options.allow_credentials,
        "CORS options normalized"
    );

    Ok(options)
}

fn normalize_origins(input: OriginsInput) -> Result<Origins, CorsConfigError> {
    match input {
        OriginsInput::Single(OriginInput::Wildcard) => Ok(Origins::Any),
        OriginsInput::Single(OriginInput::Spec(spec)) => Ok(Origins::One(spec)),
        OriginsInput::List(items) => {
            if items.is_empty() {
                return Err(CorsConfigError::EmptyOriginList);
            }
            items
                .into_iter()
                .map(|item| match item {
                    OriginInput::Wildcard => Err(CorsConfigError::WildcardInOriginList),
                    OriginInput::Spec(spec) => Ok(spec),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Origins::List)
        }
    }
}

fn normalize_methods(list: AllowList) -> Result<AllowList, CorsConfigError> {
    let AllowList::Exactly(methods) = list else {
        return Ok(AllowList::All);
    };
    let mut out: Vec<String> = Vec::with_capacity(methods.len());
    for m in methods {
        let upper = m.trim().to_ascii_uppercase();
        Method::from_bytes(upper.as_bytes()).map_err(|_| CorsConfigError::InvalidMethod(m))?;
        if !out.contains(&upper) {
            out.push(upper);
        }
    }
    Ok(AllowList::Exactly(out))
}

fn normalize_headers(list: AllowList) -> Result<AllowList, CorsConfigError> {
    let AllowList::Exactly(headers) = list else {
        return Ok(AllowList::All);
    };
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for h in headers {
        let lower = h.trim().to_ascii_lowercase();
        HeaderName::from_bytes(lower.as_bytes())
            .map_err(|_| CorsConfigError::InvalidHeaderName(h))?;
        if !out.contains(&lower) {
            out.push(lower);
        }
    }
    Ok(AllowList::Exactly(out))
}

fn joined(list: &AllowList) -> Option<String> {
    match list {
        AllowList::Exactly(items) if !items.is_empty() => Some(items.join(", ")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_origins(origins: OriginsInput) -> OptionsInput {
        OptionsInput {
            origins: Some(origins),
            ..OptionsInput::default()
        }
    }

    #[test]
    fn test_missing_origins_is_rejected() {
        let err = normalize_options(OptionsInput::default()).unwrap_err();
        assert!(matches!(err, CorsConfigError::MissingOrigins));
    }

    #[test]
    fn test_wildcard_inside_list_is_rejected() {
        let input = with_origins(OriginsInput::List(vec![
            OriginInput::Spec(OriginSpec::exact("https://a.com")),
            OriginInput::Wildcard,
        ]));
        let err = normalize_options(input).unwrap_err();
        assert!(matches!(err, CorsConfigError::WildcardInOriginList));
    }

    #[test]
    fn test_empty_origin_list_is_rejected() {
        let err = normalize_options(with_origins(OriginsInput::List(vec![]))).unwrap_err();
        assert!(matches!(err, CorsConfigError::EmptyOriginList));
    }

    #[test]
    fn test_wildcard_with_credentials_is_rejected() {
        let mut input = with_origins(OriginsInput::Single(OriginInput::Wildcard));
        input.allow_credentials = Some(true);
        let err = normalize_options(input).unwrap_err();
        assert!(matches!(err, CorsConfigError::WildcardWithCredentials));
    }

    #[test]
    fn test_wildcard_without_credentials_is_accepted() {
        let opts = normalize_options(with_origins(OriginsInput::Single(OriginInput::Wildcard)))
            .unwrap();
        assert!(opts.origins().is_wildcard());
        assert!(!opts.allow_credentials());
    }

    #[test]
    fn test_methods_uppercased_and_headers_lowercased() {
        let mut input = with_origins(OriginsInput::Single(OriginInput::Spec(
            OriginSpec::exact("https://a.com"),
        )));
        input.allow_methods = Some(AllowList::exactly(["put", "Patch", "PUT"]));
        input.allow_headers = Some(AllowList::exactly(["X-Token", "Content-Type"]));
        let opts = normalize_options(input).unwrap();
        assert_eq!(opts.allow_methods(), &AllowList::exactly(["PUT", "PATCH"]));
        assert_eq!(
            opts.allow_headers(),
            &AllowList::exactly(["x-token", "content-type"])
        );
        assert_eq!(opts.allow_methods_value.as_deref(), Some("PUT, PATCH"));
        assert_eq!(
            opts.allow_headers_value.as_deref(),
            Some("x-token, content-type")
        );
    }

    #[test]
    fn test_allow_all_passes_through() {
        let mut input = with_origins(OriginsInput::Single(OriginInput::Wildcard));
        input.allow_methods = Some(AllowList::All);
        input.allow_headers = Some(AllowList::All);
        let opts = normalize_options(input).unwrap();
        assert!(opts.allow_methods().is_all());
        assert!(opts.allow_headers().is_all());
        assert_eq!(opts.allow_methods_value, None);
        assert_eq!(opts.allow_headers_value, None);
    }

    #[test]
    fn test_defaults() {
        let opts = normalize_options(with_origins(OriginsInput::Single(OriginInput::Wildcard)))
            .unwrap();
        assert_eq!(
            opts.allow_methods(),
            &AllowList::exactly(DEFAULT_ALLOW_METHODS)
        );
        assert_eq!(opts.allow_headers(), &AllowList::Exactly(vec![]));
        assert!(!opts.allow_private_network());
        assert!(!opts.passthrough_non_cors());
        assert_eq!(opts.expose_headers(), None);
        assert_eq!(opts.max_age(), None);
    }

    #[test]
    fn test_max_age_and_expose_headers_serialized_once() {
        let mut input = with_origins(OriginsInput::Single(OriginInput::Wildcard));
        input.max_age = Some(600);
        input.expose_headers = Some(vec!["X-Total-Count".into(), "X-Page".into()]);
        let opts = normalize_options(input).unwrap();
        assert_eq!(opts.max_age(), Some("600"));
        assert_eq!(opts.expose_headers(), Some("X-Total-Count, X-Page"));
    }

    #[test]
    fn test_empty_expose_headers_is_omitted() {
        let mut input = with_origins(OriginsInput::Single(OriginInput::Wildcard));
        input.expose_headers = Some(vec![]);
        let opts = normalize_options(input).unwrap();
        assert_eq!(opts.expose_headers(), None);
    }

    #[test]
    fn test_invalid_tokens_are_rejected() {
        let mut input = with_origins(OriginsInput::Single(OriginInput::Wildcard));
        input.allow_methods = Some(AllowList::exactly(["GET POST"]));
        assert!(matches!(
            normalize_options(input).unwrap_err(),
            CorsConfigError::InvalidMethod(_)
        ));

        let mut input = with_origins(OriginsInput::Single(OriginInput::Wildcard));
        input.allow_headers = Some(AllowList::exactly(["bad header"]));
        assert!(matches!(
            normalize_options(input).unwrap_err(),
            CorsConfigError::InvalidHeaderName(_)
        ));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = OriginSpec::pattern("(unclosed").unwrap_err();
        assert!(matches!(err, CorsConfigError::InvalidOriginPattern { .. }));
    }

    #[test]
    fn test_merge_overrides_only_set_fields() {
        let base = OptionsInput {
            origins: Some(OriginsInput::Single(OriginInput::Spec(OriginSpec::exact(
                "https://a.com",
            )))),
            max_age: Some(600),
            allow_credentials: Some(true),
            ..OptionsInput::default()
        };
        let overrides = OptionsInput {
            max_age: Some(60),
            ..OptionsInput::default()
        };
        let opts = normalize_options(base.merge(overrides)).unwrap();
        assert_eq!(opts.max_age(), Some("60"));
        assert!(opts.allow_credentials());
        assert!(matches!(opts.origins(), Origins::One(OriginSpec::Exact(o)) if o == "https://a.com"));
    }
}
