use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use crate::hot_reload::watch_manifest;
use crate::manifest::load_registry;
use crate::router::{split_target, MatchResult, PathParams, Registry, RouteOutcome, SharedRegistry};
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for pathwright route manifests
#[derive(Parser, Debug)]
#[command(name = "pathwright")]
#[command(about = "Compile, inspect and test route manifests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a manifest and report whether every route is valid
    Check {
        /// Path to the route manifest (TOML, YAML or JSON)
        #[arg(short, long, env = "PATHWRIGHT_ROUTES")]
        routes: PathBuf,
    },
    /// Print the compiled routing table
    Routes {
        /// Path to the route manifest (TOML, YAML or JSON)
        #[arg(short, long, env = "PATHWRIGHT_ROUTES")]
        routes: PathBuf,

        /// Also print the regex equivalent of each template
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
    /// Resolve one request against the manifest and print the result as JSON
    Match {
        /// Path to the route manifest (TOML, YAML or JSON)
        #[arg(short, long, env = "PATHWRIGHT_ROUTES")]
        routes: PathBuf,

        /// HTTP method, any case
        method: String,

        /// Request target; a query string or fragment is ignored
        target: String,
    },
    /// Watch a manifest and report every reload until interrupted
    Watch {
        /// Path to the route manifest (TOML, YAML or JSON)
        #[arg(short, long, env = "PATHWRIGHT_ROUTES")]
        routes: PathBuf,
    },
}

/// JSON shape printed by `match`.
#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub status: u16,
    pub handler: Option<String>,
    pub template: Option<String>,
    pub path_params: PathParams,
    pub method_allowed: Option<bool>,
    pub allow: Vec<String>,
}

/// Summarize a match for display.
#[must_use]
pub fn match_report(result: &MatchResult<String>) -> MatchReport {
    let outcome = result.outcome();
    let allow = match &outcome {
        RouteOutcome::MethodNotAllowed { allow } => allow.iter().map(ToString::to_string).collect(),
        _ => Vec::new(),
    };
    MatchReport {
        status: outcome.status().as_u16(),
        handler: result.handler().cloned(),
        template: result.template().map(|t| t.as_str().to_string()),
        path_params: result.path_params.clone(),
        method_allowed: result.method_allowed,
        allow,
    }
}

fn write_routes(out: &mut impl Write, registry: &Registry<String>, verbose: bool) -> Result<()> {
    for entry in registry.routes() {
        let methods = entry.methods().to_string();
        writeln!(
            out,
            "{methods:<16} {template:<40} -> {handler}",
            template = entry.template().as_str(),
            handler = entry.handler(),
        )?;
        if verbose {
            writeln!(out, "{:<16} {}", "", entry.template().regex_source())?;
        }
    }
    Ok(())
}

/// Execute one command, writing its output to `out`.
///
/// # Errors
///
/// Manifest errors, output errors, and watcher setup errors.
pub fn execute(command: &Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Check { routes } => {
            let registry = load_registry(routes)?;
            writeln!(out, "✅ {}: {} routes OK", routes.display(), registry.len())?;
            Ok(())
        }
        Commands::Routes { routes, verbose } => {
            let registry = load_registry(routes)?;
            registry.dump_routes();
            write_routes(out, &registry, *verbose)
        }
        Commands::Match {
            routes,
            method,
            target,
        } => {
            let mut registry = load_registry(routes)?;
            registry.set_slow_match_threshold(RuntimeConfig::from_env().slow_match);
            let result = registry.match_route(method, split_target(target));
            let report = match_report(&result);
            let json = serde_json::to_string(&report).context("failed to serialize match result")?;
            writeln!(out, "{json}")?;
            Ok(())
        }
        Commands::Watch { routes } => {
            let config = RuntimeConfig::from_env();
            let mut registry = load_registry(routes)?;
            registry.set_slow_match_threshold(config.slow_match);
            writeln!(out, "watching {} ({} routes)", routes.display(), registry.len())?;
            out.flush()?;

            let shared = Arc::new(SharedRegistry::new(registry, config.match_cache_capacity));
            let (tx, rx) = mpsc::channel();
            let _watcher = watch_manifest(routes, Arc::clone(&shared), move |registry| {
                tx.send(registry.len()).ok();
            })
            .with_context(|| format!("failed to watch {}", routes.display()))?;

            for count in rx {
                writeln!(out, "reloaded {} ({count} routes)", routes.display())?;
                out.flush()?;
            }
            Ok(())
        }
    }
}

/// Run a parsed command line against standard output.
///
/// # Errors
///
/// See [`execute`].
pub fn run_cli(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &mut out)
}
