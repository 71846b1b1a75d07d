//! # pathwright
//!
//! **pathwright** is a path-template router: it compiles templates such as
//! `/users/{id:int}` into typed segments and resolves `(method, path)` pairs
//! to registered handlers, with deterministic precedence between overlapping
//! templates.
//!
//! ## Overview
//!
//! The router is transport-agnostic. It never reads a socket or builds a
//! response; a host (an HTTP server, a test harness, a CLI) hands it a method
//! and a path and acts on the [`MatchResult`]:
//!
//! - a handler plus `method_allowed == Some(true)`: invoke the handler
//! - a handler plus `method_allowed == Some(false)`: answer 405
//! - no handler: answer 404
//!
//! ## Architecture
//!
//! - **[`router`]** - template compilation, converters, the registry and matching
//! - **[`view`]** - per-method handler tables behind a single route
//! - **[`manifest`]** - declarative route tables loaded from TOML, YAML or JSON
//! - **[`hot_reload`]** - republish a manifest into a [`SharedRegistry`] when it changes
//! - **[`runtime_config`]** - environment-driven runtime tuning
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `pathwright` command-line tool
//!
//! ## Quick Start
//!
//! ```rust
//! use pathwright::{Router, RouteOutcome};
//!
//! let mut users: Router<&str> = Router::new();
//! users.get("/", "list_users")?.get("/{id:int}", "get_user")?;
//!
//! let mut app = Router::new();
//! app.any("/", "index")?;
//! app.include_router(&users, "/users")?;
//!
//! let m = app.match_route("GET", "/users/42");
//! assert_eq!(m.handler(), Some(&"get_user"));
//! assert_eq!(m.path_params.get_int("id"), Some(42));
//!
//! let m = app.match_route("DELETE", "/users");
//! assert_eq!(m.outcome().status(), http::StatusCode::METHOD_NOT_ALLOWED);
//! # Ok::<(), pathwright::RouteError>(())
//! ```
//!
//! ## Precedence
//!
//! Among templates that structurally fit a path, the winner has the fewest
//! placeholders; ties go to the template whose first placeholder appears
//! latest; remaining ties go to the earliest registration. `/users/admin`
//! therefore beats `/users/{name}` regardless of registration order.
//!
//! ## Error Handling
//!
//! Malformed templates, unknown converters and bad method tokens fail at
//! registration with a [`RouteError`]. Matching itself never fails: a
//! converter that rejects (or panics on) a segment simply makes that
//! template a non-match.
//!
//! ## Logging
//!
//! All diagnostics go through `tracing`. Call [`logging::init_logging`] once
//! at startup, or install your own subscriber.

pub mod cli;
pub mod error;
pub mod hot_reload;
pub mod logging;
pub mod manifest;
pub mod router;
pub mod runtime_config;
pub mod view;

pub use error::{ConvertError, RouteError};
pub use router::{
    Converter, ConverterRegistry, MatchResult, Methods, ParamValue, PathParams, Registry,
    RouteOutcome, Router, SharedRegistry,
};
pub use view::{Dispatch, MethodTable};
