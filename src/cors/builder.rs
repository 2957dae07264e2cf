use super::observer::{CorsObserver, LogLevels, SharedObserver};
use super::options::{
    normalize_options, AllowList, OriginInput, OriginSpec, Options, OptionsInput, OriginsInput,
};
use super::{CorsConfigError, PredicateError};
use crate::server::RequestView;

/// Builder for creating [`Options`] with a fluent API
///
/// Every setter records raw input; validation happens once, in
/// [`build()`](Self::build), through [`normalize_options`].
///
/// # Example
///
/// ```rust
/// use brrtcors::cors::CorsOptionsBuilder;
///
/// let cors = CorsOptionsBuilder::new()
///     .allowed_origins(&["https://example.com", "https://api.example.com"])
///     .allowed_methods(&["PUT", "PATCH", "DELETE"])
///     .allowed_headers(&["Content-Type", "Authorization", "X-Custom-Header"])
///     .allow_credentials(true)
///     .expose_headers(&["X-Total-Count", "X-Page-Number"])
///     .max_age(3600) // Cache preflight for 1 hour
///     .build()
///     .expect("Invalid CORS configuration");
///
/// assert!(cors.allow_credentials());
/// ```
#[derive(Debug, Default)]
pub struct CorsOptionsBuilder {
    input: OptionsInput,
    /// First deferred error (e.g. a bad regex), reported by `build()`
    error: Option<CorsConfigError>,
}

impl CorsOptionsBuilder {
    /// Create a new builder
    ///
    /// No origins are configured; `build()` fails until one of the origin
    /// setters is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set exact allowed origins
    ///
    /// `&["*"]` selects the wildcard. A `"*"` mixed with other origins is a
    /// configuration error reported by `build()`.
    #[must_use]
    pub fn allowed_origins(mut self, origins: &[&str]) -> Self {
        let mut items: Vec<OriginInput> = origins
            .iter()
            .map(|o| {
                if *o == "*" {
                    OriginInput::Wildcard
                } else {
                    OriginInput::Spec(OriginSpec::exact(*o))
                }
            })
            .collect();
        self.input.origins = Some(match items.len() {
            1 => OriginsInput::Single(items.remove(0)),
            _ => OriginsInput::List(items),
        });
        self
    }

    /// Allow every origin (`*`)
    #[must_use]
    pub fn any_origin(mut self) -> Self {
        self.input.origins = Some(OriginsInput::Single(OriginInput::Wildcard));
        self
    }

    /// Append one origin specification to the configured list
    #[must_use]
    pub fn origin(mut self, spec: OriginSpec) -> Self {
        let items = match self.input.origins.take() {
            None => vec![OriginInput::Spec(spec)],
            Some(OriginsInput::Single(first)) => vec![first, OriginInput::Spec(spec)],
            Some(OriginsInput::List(mut items)) => {
                items.push(OriginInput::Spec(spec));
                items
            }
        };
        self.input.origins = Some(OriginsInput::List(items));
        self
    }

    /// Append regex origin patterns (e.g. `r"^https://.*\.example\.com$"`)
    #[must_use]
    pub fn origin_patterns(mut self, patterns: &[&str]) -> Self {
        for p in patterns {
            match OriginSpec::pattern(p) {
                Ok(spec) => self = self.origin(spec),
                Err(e) => {
                    self.error.get_or_insert(e);
                }
            }
        }
        self
    }

    /// Append a predicate origin check
    #[must_use]
    pub fn origin_predicate<F>(self, f: F) -> Self
    where
        F: Fn(&str, &dyn RequestView) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        self.origin(OriginSpec::predicate(f))
    }

    /// Set allowed HTTP methods (uppercased by `build()`)
    #[must_use]
    pub fn allowed_methods(mut self, methods: &[&str]) -> Self {
        self.input.allow_methods = Some(AllowList::exactly(methods.iter().copied()));
        self
    }

    /// Allow any requested method; preflights echo the requested one
    #[must_use]
    pub fn allow_all_methods(mut self) -> Self {
        self.input.allow_methods = Some(AllowList::All);
        self
    }

    /// Set allowed headers (lowercased by `build()`)
    #[must_use]
    pub fn allowed_headers(mut self, headers: &[&str]) -> Self {
        self.input.allow_headers = Some(AllowList::exactly(headers.iter().copied()));
        self
    }

    /// Allow any requested header; preflights echo the requested ones
    #[must_use]
    pub fn allow_all_headers(mut self) -> Self {
        self.input.allow_headers = Some(AllowList::All);
        self
    }

    /// Enable or disable credentials
    ///
    /// **Important**: Cannot be used with wildcard origin (`*`).
    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.input.allow_credentials = Some(allow);
        self
    }

    /// Answer private-network preflights with `Access-Control-Allow-Private-Network: true`
    #[must_use]
    pub fn allow_private_network(mut self, allow: bool) -> Self {
        self.input.allow_private_network = Some(allow);
        self
    }

    /// Set headers to expose to JavaScript (case preserved)
    #[must_use]
    pub fn expose_headers(mut self, headers: &[&str]) -> Self {
        self.input.expose_headers = Some(headers.iter().map(|h| h.to_string()).collect());
        self
    }

    /// Set preflight cache duration in seconds
    #[must_use]
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.input.max_age = Some(seconds);
        self
    }

    /// Attach CORS headers even to requests without `Origin`
    #[must_use]
    pub fn passthrough_non_cors(mut self, enabled: bool) -> Self {
        self.input.passthrough_non_cors = Some(enabled);
        self
    }

    /// Set per-event log levels
    #[must_use]
    pub fn log_levels(mut self, levels: LogLevels) -> Self {
        self.input.log = Some(levels);
        self
    }

    /// Attach an event observer
    #[must_use]
    pub fn observer(mut self, observer: impl CorsObserver + 'static) -> Self {
        self.input.observer = Some(SharedObserver::new(observer));
        self
    }

    /// Return the raw input without normalizing it
    ///
    /// Useful for per-route overrides, which are merged with the defaults
    /// before normalization.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by a setter (e.g. an invalid regex).
    pub fn into_input(self) -> Result<OptionsInput, CorsConfigError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.input),
        }
    }

    /// Build the CORS options
    ///
    /// # Errors
    ///
    /// Returns a [`CorsConfigError`] if the configuration is invalid, e.g.
    /// `CorsConfigError::WildcardWithCredentials` when `allow_credentials`
    /// is `true` and the wildcard origin is configured.
    pub fn build(self) -> Result<Options, CorsConfigError> {
        normalize_options(self.into_input()?)
    }
}
