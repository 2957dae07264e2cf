//! # Policy Files
//!
//! Loads a complete per-route CORS policy from YAML, JSON or TOML and
//! compiles it into a [`CorsRouter`].
//!
//! ```yaml
//! defaults:
//!   origins: ["https://app.example.com", { regex: "^https://.*\\.example\\.com$" }]
//!   allow_methods: [PUT, PATCH]
//!   allow_headers: all
//!   allow_credentials: true
//!   max_age: 600
//!   log: { accepted: debug, rejected: warn, invalid: off }
//! resources:
//!   - route: "/api/*"
//!     options: { max_age: 60 }
//!   - route: "*"
//! ```
//!
//! Every resource inherits `defaults` and overrides individual fields.
//! A file with no `resources` applies `defaults` to every path.
//!
//! `origins: "*"` is the wildcard marker. Predicate origins cannot be
//! expressed in a file; build those with
//! [`CorsOptionsBuilder`](crate::cors::CorsOptionsBuilder).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::cors::{
    AllowList, CorsConfigError, LogLevels, OptionsInput, OriginInput, OriginSpec, OriginsInput,
};
use crate::router::{CorsRouter, WILDCARD_SEGMENT};

/// Error loading or compiling a policy file
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML policy: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON policy: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML policy: {0}")]
    Toml(#[from] toml::de::Error),

    /// File extension is not one of `yaml`, `yml`, `json`, `toml`
    #[error("unsupported policy format '{0}' (expected .yaml, .yml, .json or .toml)")]
    UnsupportedFormat(String),

    /// The policy parsed but describes invalid options
    #[error("invalid CORS options for route '{route}': {source}")]
    Config {
        /// Route pattern, or `defaults`
        route: String,
        #[source]
        source: CorsConfigError,
    },
}

/// Serialization format of a policy document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFormat {
    Yaml,
    Json,
    Toml,
}

impl PolicyFormat {
    /// Pick the format from a file extension
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnsupportedFormat`] for anything else.
    pub fn from_path(path: &Path) -> Result<Self, PolicyError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(PolicyFormat::Yaml),
            "json" => Ok(PolicyFormat::Json),
            "toml" => Ok(PolicyFormat::Toml),
            _ => Err(PolicyError::UnsupportedFormat(ext)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    #[serde(default)]
    defaults: RawOptions,
    #[serde(default)]
    resources: Vec<RawResource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawResource {
    route: String,
    #[serde(default)]
    options: RawOptions,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOrigin {
    Text(String),
    Regex { regex: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOrigins {
    One(RawOrigin),
    Many(Vec<RawOrigin>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAllowList {
    Keyword(String),
    List(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    origins: Option<RawOrigins>,
    allow_methods: Option<RawAllowList>,
    allow_headers: Option<RawAllowList>,
    allow_credentials: Option<bool>,
    allow_private_network: Option<bool>,
    expose_headers: Option<Vec<String>>,
    max_age: Option<u64>,
    passthrough_non_cors: Option<bool>,
    log: Option<LogLevels>,
}

impl RawOrigin {
    fn into_input(self) -> Result<OriginInput, CorsConfigError> {
        match self {
            RawOrigin::Text(s) if s == WILDCARD_SEGMENT => Ok(OriginInput::Wildcard),
            RawOrigin::Text(s) => Ok(OriginInput::Spec(OriginSpec::exact(s))),
            RawOrigin::Regex { regex } => Ok(OriginInput::Spec(OriginSpec::pattern(&regex)?)),
        }
    }
}

impl RawAllowList {
    fn into_allow_list(self, field: &'static str) -> Result<AllowList, CorsConfigError> {
        match self {
            RawAllowList::List(items) => Ok(AllowList::Exactly(items)),
            RawAllowList::Keyword(k) if k.eq_ignore_ascii_case("all") || k == "*" => {
                Ok(AllowList::All)
            }
            RawAllowList::Keyword(value) => {
                Err(CorsConfigError::InvalidAllowKeyword { field, value })
            }
        }
    }
}

impl RawOptions {
    fn into_input(self) -> Result<OptionsInput, CorsConfigError> {
        let origins = match self.origins {
            None => None,
            Some(RawOrigins::One(o)) => Some(OriginsInput::Single(o.into_input()?)),
            Some(RawOrigins::Many(list)) => Some(OriginsInput::List(
                list.into_iter()
                    .map(RawOrigin::into_input)
                    .collect::<Result<_, _>>()?,
            )),
        };

        Ok(OptionsInput {
            origins,
            allow_methods: self
                .allow_methods
                .map(|a| a.into_allow_list("allow_methods"))
                .transpose()?,
            allow_headers: self
                .allow_headers
                .map(|a| a.into_allow_list("allow_headers"))
                .transpose()?,
            allow_credentials: self.allow_credentials,
            allow_private_network: self.allow_private_network,
            expose_headers: self.expose_headers,
            max_age: self.max_age,
            passthrough_non_cors: self.passthrough_non_cors,
            log: self.log,
            observer: None,
        })
    }
}

fn config_error(route: &str) -> impl FnOnce(CorsConfigError) -> PolicyError + '_ {
    move |source| PolicyError::Config {
        route: route.to_string(),
        source,
    }
}

/// Parse a policy document and compile it into a router
///
/// # Errors
///
/// Returns a [`PolicyError`] if the text does not deserialize or any
/// route's merged options fail validation.
pub fn parse_policy(text: &str, format: PolicyFormat) -> Result<CorsRouter, PolicyError> {
    let file: PolicyFile = match format {
        PolicyFormat::Yaml => serde_yaml::from_str(text)?,
        PolicyFormat::Json => serde_json::from_str(text)?,
        PolicyFormat::Toml => toml::from_str(text)?,
    };

    let defaults = file.defaults.into_input().map_err(config_error("defaults"))?;
    let mut builder = CorsRouter::builder().defaults(defaults);

    if file.resources.is_empty() {
        debug!("Policy has no resources, applying defaults to every path");
        builder = builder
            .resource(WILDCARD_SEGMENT, OptionsInput::default())
            .map_err(config_error(WILDCARD_SEGMENT))?;
    }

    for resource in file.resources {
        let overrides = resource
            .options
            .into_input()
            .map_err(config_error(&resource.route))?;
        builder = builder
            .resource(&resource.route, overrides)
            .map_err(config_error(&resource.route))?;
    }

    Ok(builder.build())
}

/// Load a policy file, choosing the format from its extension
///
/// # Errors
///
/// Returns a [`PolicyError`] if the file cannot be read, has an unknown
/// extension, or describes an invalid policy.
pub fn load_policy(path: impl AsRef<Path>) -> Result<CorsRouter, PolicyError> {
    let path = path.as_ref();
    let format = PolicyFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| PolicyError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), format = ?format, "Loading CORS policy");
    parse_policy(&text, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            PolicyFormat::from_path(Path::new("cors.YML")).unwrap(),
            PolicyFormat::Yaml
        );
        assert_eq!(
            PolicyFormat::from_path(Path::new("cors.json")).unwrap(),
            PolicyFormat::Json
        );
        assert_eq!(
            PolicyFormat::from_path(Path::new("cors.toml")).unwrap(),
            PolicyFormat::Toml
        );
        assert!(matches!(
            PolicyFormat::from_path(Path::new("cors.ini")),
            Err(PolicyError::UnsupportedFormat(ext)) if ext == "ini"
        ));
        assert!(matches!(
            PolicyFormat::from_path(Path::new("cors")),
            Err(PolicyError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_defaults_only_covers_every_path() {
        let router = parse_policy("defaults:\n  origins: \"*\"\n", PolicyFormat::Yaml).unwrap();
        assert_eq!(router.entries().len(), 1);
        assert!(router.select(&[]).is_some());
        assert!(router.select(&["any", "path"]).unwrap().origins().is_wildcard());
    }

    #[test]
    fn test_allow_keyword() {
        let yaml = "defaults:\n  origins: \"*\"\n  allow_methods: ALL\n  allow_headers: \"*\"\n";
        let router = parse_policy(yaml, PolicyFormat::Yaml).unwrap();
        let opts = router.select(&[]).unwrap();
        assert!(opts.allow_methods().is_all());
        assert!(opts.allow_headers().is_all());
    }

    #[test]
    fn test_unknown_allow_keyword() {
        let yaml = "defaults:\n  origins: \"*\"\n  allow_headers: some\n";
        let err = parse_policy(yaml, PolicyFormat::Yaml).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::Config {
                ref route,
                source: CorsConfigError::InvalidAllowKeyword { field: "allow_headers", .. }
            } if route == "defaults"
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "defaults:\n  origins: \"*\"\n  allow_origin: \"*\"\n";
        assert!(matches!(
            parse_policy(yaml, PolicyFormat::Yaml),
            Err(PolicyError::Yaml(_))
        ));
    }

    #[test]
    fn test_error_names_failing_route() {
        let yaml = r#"
defaults:
  origins: "*"
resources:
  - route: "/public/*"
  - route: "/private/*"
    options: { allow_credentials: true }
"#;
        let err = parse_policy(yaml, PolicyFormat::Yaml).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::Config {
                ref route,
                source: CorsConfigError::WildcardWithCredentials
            } if route == "/private/*"
        ));
    }
}
