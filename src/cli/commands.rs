use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Value};

use crate::config::load_policy;
use crate::cors::{AllowList, OriginSpec, Origins, Options};
use crate::router::CorsRouter;
use crate::server::{CorsRequest, CorsResponse};

/// Command-line interface for brrtcors
///
/// Loads a policy file and either runs a synthetic request through it,
/// lists its routes, or only checks that it is valid.
#[derive(Parser, Debug)]
#[command(name = "brrtcors")]
#[command(about = "Inspect and exercise CORS policies", long_about = None, version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one request through a policy and print the resulting decision
    Check {
        /// Path to the policy file (YAML, JSON or TOML)
        #[arg(short, long)]
        policy: PathBuf,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path
        #[arg(long, default_value = "/")]
        path: String,

        /// Request header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
    /// Print the route table in declaration order
    Routes {
        /// Path to the policy file (YAML, JSON or TOML)
        #[arg(short, long)]
        policy: PathBuf,
    },
    /// Load and validate a policy file
    Validate {
        /// Path to the policy file (YAML, JSON or TOML)
        #[arg(short, long)]
        policy: PathBuf,
    },
}

/// Parse a `Name: value` header argument
fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got \"{raw}\""))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in \"{raw}\""));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn load(policy: &Path) -> Result<CorsRouter> {
    load_policy(policy).with_context(|| format!("Failed to load policy {}", policy.display()))
}

fn describe_origins(origins: &Origins) -> Value {
    fn spec(s: &OriginSpec) -> Value {
        match s {
            OriginSpec::Exact(o) => json!(o),
            OriginSpec::Pattern(re) => json!({ "regex": re.as_str() }),
            OriginSpec::Predicate(_) => json!("<predicate>"),
        }
    }
    match origins {
        Origins::Any => json!("*"),
        Origins::One(s) => spec(s),
        Origins::List(list) => Value::Array(list.iter().map(spec).collect()),
    }
}

fn describe_allow(list: &AllowList) -> Value {
    match list {
        AllowList::All => json!("all"),
        AllowList::Exactly(items) => json!(items),
    }
}

fn describe_options(opts: &Options) -> Value {
    json!({
        "origins": describe_origins(opts.origins()),
        "allow_methods": describe_allow(opts.allow_methods()),
        "allow_headers": describe_allow(opts.allow_headers()),
        "allow_credentials": opts.allow_credentials(),
        "allow_private_network": opts.allow_private_network(),
        "expose_headers": opts.expose_headers(),
        "max_age": opts.max_age(),
        "passthrough_non_cors": opts.passthrough_non_cors(),
    })
}

fn check(
    router: &CorsRouter,
    method: &str,
    path: &str,
    headers: &[(String, String)],
) -> Result<Value> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{method}'"))?;
    let req = headers
        .iter()
        .fold(CorsRequest::new(method, path), |req, (name, value)| {
            req.with_header(name, value.as_str())
        });
    let mut resp = CorsResponse::new(200);

    let outcome = router
        .handle(&req, &mut resp)
        .context("Origin predicate failed")?;

    let headers: Vec<Value> = resp
        .headers
        .iter()
        .map(|(name, value)| json!({ "name": &**name, "value": value }))
        .collect();

    Ok(json!({
        "result": outcome,
        "status": resp.status,
        "halted": resp.halted,
        "headers": headers,
    }))
}

/// Execute one command, writing its report to `out`
///
/// # Errors
///
/// Fails when the policy cannot be loaded, the request cannot be built,
/// or writing the report fails.
pub fn execute(command: &Commands, out: &mut dyn Write) -> Result<()> {
    let report = match command {
        Commands::Check {
            policy,
            method,
            path,
            headers,
        } => check(&load(policy)?, method, path, headers)?,
        Commands::Routes { policy } => {
            let router = load(policy)?;
            Value::Array(
                router
                    .entries()
                    .iter()
                    .map(|e| {
                        json!({
                            "route": e.route.to_string(),
                            "options": describe_options(&e.options),
                        })
                    })
                    .collect(),
            )
        }
        Commands::Validate { policy } => {
            let router = load(policy)?;
            json!({ "valid": true, "routes": router.entries().len() })
        }
    };

    serde_json::to_writer_pretty(&mut *out, &report).context("Failed to write report")?;
    writeln!(out).context("Failed to write report")?;
    Ok(())
}

/// Run a parsed command line against stdout
///
/// # Errors
///
/// See [`execute`].
pub fn run_cli(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    execute(&cli.command, &mut lock)
}
