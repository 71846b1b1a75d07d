//! Router core module - hot path for request matching.
//!
//! Matching is a pure read over an immutable slice of entries: split the path,
//! keep structural candidates, walk segments left to right, rank survivors by
//! [`Specificity`] and registration order, then resolve the method against the
//! single winner.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::{Method, StatusCode};
use serde::ser::SerializeMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::Arc;

use super::converter::ParamValue;
use super::entry::{RouteEntry, Specificity};
use super::template::{split_segments, Segment, Template};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Raw request segments held inline before heap allocation.
const MAX_INLINE_RAW_SEGMENTS: usize = 16;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names are `Arc<str>` shared with the compiled template; values are
/// per-request.
pub type ParamVec = SmallVec<[(Arc<str>, ParamValue); MAX_INLINE_PARAMS]>;

/// Typed path parameters extracted by a match, in template order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathParams {
    params: ParamVec,
}

impl PathParams {
    /// No parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: Arc<str>, value: ParamValue) {
        self.params.push((name, value));
    }

    /// Get a parameter by name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Get an integer parameter (from the `int` converter) by name.
    #[inline]
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    /// Get a string parameter by name.
    #[inline]
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Iterate `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// `true` when nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Serialize for PathParams {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for (k, v) in &self.params {
            map.serialize_entry(k.as_ref(), v)?;
        }
        map.end()
    }
}

/// Result of resolving one `(method, path)` pair.
///
/// | `route`  | `method_allowed` | meaning                       |
/// |----------|------------------|-------------------------------|
/// | `None`   | `None`           | no such route (404)           |
/// | `Some`   | `Some(false)`    | route exists, wrong method (405) |
/// | `Some`   | `Some(true)`     | matched                       |
///
/// The handler is returned for the 405 case too so the host can tell the two
/// failure modes apart and build an `Allow` header.
pub struct MatchResult<H> {
    /// The winning route entry
    pub route: Option<Arc<RouteEntry<H>>>,
    /// Typed parameters extracted from the path
    pub path_params: PathParams,
    /// Whether the request method is permitted by the winning route
    pub method_allowed: Option<bool>,
}

impl<H> std::fmt::Debug for MatchResult<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchResult")
            .field("route", &self.route)
            .field("path_params", &self.path_params)
            .field("method_allowed", &self.method_allowed)
            .finish()
    }
}

impl<H> Clone for MatchResult<H> {
    fn clone(&self) -> Self {
        Self {
            route: self.route.as_ref().map(Arc::clone),
            path_params: self.path_params.clone(),
            method_allowed: self.method_allowed,
        }
    }
}

impl<H> MatchResult<H> {
    /// The "no such route" triple: no handler, no params, no method verdict.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            route: None,
            path_params: PathParams::new(),
            method_allowed: None,
        }
    }

    /// The handler of the winning route, present for both 200 and 405.
    #[must_use]
    pub fn handler(&self) -> Option<&H> {
        self.route.as_deref().map(RouteEntry::handler)
    }

    /// The winning template.
    #[must_use]
    pub fn template(&self) -> Option<&Template> {
        self.route.as_deref().map(RouteEntry::template)
    }

    /// Route matched and method allowed.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.method_allowed == Some(true)
    }

    /// No template matched the path.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.route.is_none()
    }

    /// A template matched but rejects the method.
    #[must_use]
    pub fn is_method_not_allowed(&self) -> bool {
        self.method_allowed == Some(false)
    }

    /// Fold the triple into the outcome a hosting dispatcher acts on.
    #[must_use]
    pub fn outcome(&self) -> RouteOutcome {
        match (&self.route, self.method_allowed) {
            (Some(_), Some(true)) => RouteOutcome::Matched,
            (Some(route), _) => RouteOutcome::MethodNotAllowed {
                allow: route.methods().as_slice().to_vec(),
            },
            (None, _) => RouteOutcome::NotFound,
        }
    }
}

/// What the host should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Invoke the handler.
    Matched,
    /// Render a 405; `allow` populates the `Allow` header.
    MethodNotAllowed {
        /// Methods the matched route accepts
        allow: Vec<Method>,
    },
    /// Render a 404.
    NotFound,
}

impl RouteOutcome {
    /// HTTP status for this outcome.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            RouteOutcome::Matched => StatusCode::OK,
            RouteOutcome::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            RouteOutcome::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Comma-separated `Allow` header value, for the 405 case.
    #[must_use]
    pub fn allow_header(&self) -> Option<String> {
        match self {
            RouteOutcome::MethodNotAllowed { allow } => Some(
                allow
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }
}

/// A template is a structural candidate when its segment count equals the
/// path's, or when it ends in a rest-consuming converter and has no more
/// segments than the path.
#[inline]
fn is_structural_candidate(template: &Template, raw_len: usize) -> bool {
    if template.ends_with_rest() {
        template.len() <= raw_len
    } else {
        template.len() == raw_len
    }
}

/// Walk template and path segments pairwise. The first mismatch eliminates
/// the candidate.
///
/// `path` is the request path with its end slashes trimmed and `raw` its
/// pieces; a rest-consuming converter receives the slice of `path` starting
/// at its segment, so repeated slashes inside the remainder survive.
fn match_segments(template: &Template, path: &str, raw: &[&str]) -> Option<PathParams> {
    let mut params = PathParams::new();
    let mut offset = 0;
    for (idx, seg) in template.segments().iter().enumerate() {
        let piece = raw.get(idx).copied()?;
        match seg {
            Segment::Literal(text) => {
                if piece != text.as_ref() {
                    return None;
                }
            }
            Segment::Dynamic { name, converter } => {
                let value = if converter.consumes_rest() {
                    converter.convert(path.get(offset..)?)?
                } else {
                    converter.convert(piece)?
                };
                params.push(Arc::clone(name), value);
            }
        }
        offset += piece.len() + 1;
    }
    Some(params)
}

/// Find the best entry for `path` and resolve `method` against it.
///
/// Entries are scanned in registration order; a later survivor only replaces
/// the current best when it is strictly more specific, so the earliest
/// registration wins ties.
pub(crate) fn resolve<H>(entries: &[Arc<RouteEntry<H>>], method: &str, path: &str) -> MatchResult<H> {
    let trimmed = path.trim_matches('/');
    let raw: SmallVec<[&str; MAX_INLINE_RAW_SEGMENTS]> = split_segments(trimmed).collect();

    let mut best: Option<(&Arc<RouteEntry<H>>, Specificity, PathParams)> = None;
    for entry in entries {
        if !is_structural_candidate(entry.template(), raw.len()) {
            continue;
        }
        let specificity = entry.specificity();
        if let Some((_, current, _)) = &best {
            if specificity >= *current {
                continue;
            }
        }
        if let Some(params) = match_segments(entry.template(), trimmed, &raw) {
            best = Some((entry, specificity, params));
        }
    }

    match best {
        Some((entry, _, path_params)) => {
            let method_allowed = entry.methods().allows(method);
            MatchResult {
                route: Some(Arc::clone(entry)),
                path_params,
                method_allowed: Some(method_allowed),
            }
        }
        None => MatchResult::not_found(),
    }
}
