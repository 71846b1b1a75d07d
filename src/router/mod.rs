//! # Router Module
//!
//! The router module compiles path templates and matches incoming
//! `(method, path)` pairs to registered handlers.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling templates such as `/users/{id:int}` into typed segments
//! - Converting raw path segments into typed values ([`ParamValue`])
//! - Picking one route among overlapping templates, deterministically
//! - Telling "no such route" (404) apart from "wrong method" (405)
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: at registration, templates are split on `/` and each
//!    piece becomes a literal or a `{name:converter}` placeholder. Converter
//!    names are resolved against a [`ConverterRegistry`] right away, so a bad
//!    template fails before the application starts serving.
//!
//! 2. **Matching**: for each request the path is split the same way. Templates
//!    with a compatible segment count are walked left to right; survivors are
//!    ranked by [`Specificity`] (fewer placeholders first, then later first
//!    placeholder), with registration order breaking ties. The method is then
//!    checked against the winner only.
//!
//! ## Template syntax
//!
//! | piece              | meaning                                         |
//! |--------------------|-------------------------------------------------|
//! | `users`            | literal, exact match                            |
//! | `{name}`           | one segment, any characters except `/`          |
//! | `{id:int}`         | one segment of ASCII digits, parsed to `i64`    |
//! | `{rest:path}`      | the rest of the path, `/` included; last only   |
//!
//! Leading and trailing slashes are insignificant; `/` alone is the root.
//!
//! ## Example
//!
//! ```rust
//! use pathwright::router::{Methods, Registry, RouteOutcome};
//! use http::Method;
//!
//! let mut registry: Registry<&str> = Registry::new();
//! registry.add_route("/items", "list_items", Method::GET).unwrap();
//! registry.add_route("/files/{filepath:path}", "serve_file", Methods::Any).unwrap();
//!
//! let m = registry.match_route("GET", "/files/a/b/c.txt");
//! assert_eq!(m.path_params.get_str("filepath"), Some("a/b/c.txt"));
//!
//! let m = registry.match_route("POST", "/items");
//! assert_eq!(m.handler(), Some(&"list_items"));
//! assert_eq!(m.method_allowed, Some(false));
//! assert!(matches!(m.outcome(), RouteOutcome::MethodNotAllowed { .. }));
//!
//! let m = registry.match_route("POST", "/missing");
//! assert!(m.handler().is_none() && m.method_allowed.is_none());
//! ```
//!
//! ## Concurrency
//!
//! A [`Registry`] is built single-threaded and then only read; matching takes
//! `&self` and touches no shared mutable state. When routes must change while
//! serving, wrap the registry in a [`SharedRegistry`].

mod converter;
mod core;
mod entry;
mod registry;
#[allow(clippy::module_inception)]
mod router;
mod shared;
mod template;
#[cfg(test)]
mod tests;

pub use converter::{Converter, ConverterRegistry, ParamValue, ParseFn, DEFAULT_CONVERTER};
pub use core::{MatchResult, ParamVec, PathParams, RouteOutcome, MAX_INLINE_PARAMS};
pub use entry::{parse_method, Methods, RouteEntry, Specificity, MAX_INLINE_METHODS};
pub use registry::{Registry, DEFAULT_SLOW_MATCH};
pub use router::Router;
pub use shared::{SharedRegistry, Snapshot};
pub use template::{
    normalize_path, split_segments, split_target, Segment, SegmentVec, Template,
    MAX_INLINE_SEGMENTS,
};
