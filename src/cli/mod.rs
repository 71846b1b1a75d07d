//! # CLI Module
//!
//! Command-line tooling for route manifests.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Compile a manifest and report the first invalid route:
//!
//! ```bash
//! pathwright check --routes routes.toml
//! ```
//!
//! ### `routes`
//!
//! List the compiled routing table in match-precedence order of
//! registration. `--verbose` adds the regex equivalent of each template.
//!
//! ```bash
//! pathwright routes --routes routes.toml --verbose
//! ```
//!
//! ### `match`
//!
//! Resolve one request and print the outcome as JSON:
//!
//! ```bash
//! pathwright match --routes routes.toml GET '/users/42?expand=1'
//! ```
//!
//! ```json
//! {"status":200,"handler":"get_user","template":"/users/{id:int}","path_params":{"id":42},"method_allowed":true,"allow":[]}
//! ```
//!
//! ### `watch`
//!
//! Keep the manifest compiled and log every reload until interrupted.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use pathwright::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;


pub use commands::{execute, match_report, run_cli, Cli, Commands, MatchReport};
