//! # CLI Module
//!
//! The `brrtcors` binary loads a policy file (see [`crate::config`]) and
//! reports on it as JSON.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Run a synthetic request through the router and print the decision, the
//! final status and every header the engine wrote:
//!
//! ```bash
//! brrtcors check --policy cors.yaml --method OPTIONS --path /api/pets \
//!     -H "Origin: https://app.example.com" \
//!     -H "Access-Control-Request-Method: PUT"
//! ```
//!
//! ### `routes`
//!
//! ```bash
//! brrtcors routes --policy cors.yaml
//! ```
//!
//! ### `validate`
//!
//! Exits non-zero if the policy does not load:
//!
//! ```bash
//! brrtcors validate --policy cors.yaml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use brrtcors::cli::{Cli, run_cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
