//! Registry: the ordered collection of route entries.
//!
//! Registration compiles templates eagerly, so every syntax or converter error
//! surfaces while the application is being wired. Lookups go through
//! [`Registry::match_route`], which never fails.

use http::Method;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::converter::{Converter, ConverterRegistry};
use super::core::{resolve, MatchResult};
use super::entry::{Methods, RouteEntry};
use super::template::{compile_segments, normalize_path, SegmentVec, Template};
use crate::error::RouteError;

/// Default threshold above which a single match is logged as slow.
pub const DEFAULT_SLOW_MATCH: Duration = Duration::from_millis(1);

/// Ordered collection of routes for handlers of type `H`.
///
/// Entries keep registration order. Registering a template whose segments are
/// identical to an existing entry's replaces that entry in place (last
/// registration wins, method set included).
///
/// # Example
///
/// ```rust
/// use pathwright::router::{Methods, Registry};
///
/// let mut registry: Registry<&str> = Registry::new();
/// registry.add_route("/users/admin", "admin", Methods::Any).unwrap();
/// registry.add_route("/users/{username}", "profile", Methods::Any).unwrap();
///
/// let m = registry.match_route("GET", "/users/admin");
/// assert_eq!(m.handler(), Some(&"admin"));
///
/// let m = registry.match_route("GET", "/users/bob");
/// assert_eq!(m.handler(), Some(&"profile"));
/// assert_eq!(m.path_params.get_str("username"), Some("bob"));
/// ```
pub struct Registry<H> {
    entries: Vec<Arc<RouteEntry<H>>>,
    converters: Arc<ConverterRegistry>,
    slow_match: Duration,
}

impl<H> Clone for Registry<H> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            converters: Arc::clone(&self.converters),
            slow_match: self.slow_match,
        }
    }
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries)
            .field("converters", &self.converters.names())
            .finish_non_exhaustive()
    }
}

impl<H> Registry<H> {
    /// An empty registry with the built-in converters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_converters(ConverterRegistry::with_builtins())
    }

    /// An empty registry using `converters` to compile templates.
    #[must_use]
    pub fn with_converters(converters: ConverterRegistry) -> Self {
        Self {
            entries: Vec::new(),
            converters: Arc::new(converters),
            slow_match: DEFAULT_SLOW_MATCH,
        }
    }

    /// Converters used for templates registered from now on.
    #[must_use]
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Make `converter` available to templates registered after this call.
    pub fn register_converter(&mut self, converter: Converter) {
        info!(converter = %converter.name(), "Registering path converter");
        Arc::make_mut(&mut self.converters).register(converter);
    }

    /// Threshold above which [`Registry::match_route`] logs a slow match.
    pub fn set_slow_match_threshold(&mut self, threshold: Duration) {
        self.slow_match = threshold;
    }

    /// The current slow-match threshold.
    #[must_use]
    pub fn slow_match_threshold(&self) -> Duration {
        self.slow_match
    }

    /// Compile `template` and register it for `handler`.
    ///
    /// `/a/b/`, `a/b` and `/a/b` register the same template.
    ///
    /// # Errors
    ///
    /// - [`RouteError::TemplateSyntax`] / [`RouteError::UnknownConverter`] from compilation
    /// - [`RouteError::EmptyMethodSet`] if `methods` is a restriction with no members
    pub fn add_route(
        &mut self,
        template: &str,
        handler: H,
        methods: impl Into<Methods>,
    ) -> Result<(), RouteError> {
        let methods = methods.into();
        if methods.is_empty() {
            return Err(RouteError::EmptyMethodSet {
                template: template.to_string(),
            });
        }
        let compiled = Template::compile(template, &self.converters)?;
        debug!(
            template = %compiled,
            methods = %methods,
            "Route registered"
        );
        self.insert(RouteEntry::new(compiled, handler, methods));
        Ok(())
    }

    fn insert(&mut self, entry: RouteEntry<H>) {
        let existing = self
            .entries
            .iter()
            .position(|e| e.template().same_shape(entry.template()));
        match existing {
            Some(idx) => {
                warn!(
                    template = %entry.template(),
                    previous_methods = %self.entries[idx].methods(),
                    methods = %entry.methods(),
                    "Route template redefined, last registration wins"
                );
                self.entries[idx] = Arc::new(entry);
            }
            None => self.entries.push(Arc::new(entry)),
        }
    }

    /// Match `method` + `path` against the registered routes.
    ///
    /// The path must already be stripped of query and fragment (see
    /// [`split_target`](super::split_target)). Leading, trailing and repeated
    /// slashes are insignificant.
    #[must_use]
    pub fn match_route(&self, method: &str, path: &str) -> MatchResult<H> {
        debug!(method = %method, path = %path, "Route match attempt");

        let match_start = Instant::now();
        let result = resolve(&self.entries, method, path);
        let match_duration = match_start.elapsed();

        if match_duration > self.slow_match {
            warn!(
                method = %method,
                path = %path,
                routes_count = self.entries.len(),
                duration_us = match_duration.as_micros(),
                "Slow route matching detected"
            );
        }

        match &result.route {
            Some(route) => debug!(
                method = %method,
                path = %path,
                route_pattern = %route.template(),
                path_params = ?result.path_params,
                method_allowed = ?result.method_allowed,
                duration_us = match_duration.as_micros(),
                "Route matched"
            ),
            None => debug!(
                method = %method,
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            ),
        }

        result
    }

    /// [`Registry::match_route`] for an already-parsed method.
    #[must_use]
    pub fn match_method(&self, method: &Method, path: &str) -> MatchResult<H> {
        self.match_route(method.as_str(), path)
    }

    /// Registered entries in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry<H>> {
        self.entries.iter().map(|e| e.as_ref())
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalized templates in registration order.
    #[must_use]
    pub fn path_patterns(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.template().as_str().to_string())
            .collect()
    }

    /// Log every registered route at `info`.
    pub fn dump_routes(&self) {
        info!(routes_count = self.entries.len(), "Routing table");
        for entry in &self.entries {
            info!(
                methods = %entry.methods(),
                template = %entry.template(),
                dynamic_segments = entry.specificity().dynamic_count(),
                "Route"
            );
        }
    }
}

impl<H: Clone> Registry<H> {
    /// Copy every entry of `source` into this registry under `prefix`.
    ///
    /// Each merged entry is a new value with the same handler and methods, so
    /// `source` stays independently usable and can be merged elsewhere too.
    /// The prefix is normalized (`api/v1/` ≡ `/api/v1`) and compiled with this
    /// registry's converters, so it may contain placeholders.
    ///
    /// Either every entry is merged or none is.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] from compiling the prefix, or a
    /// [`RouteError::TemplateSyntax`] when a combined template repeats a
    /// parameter name or leaves a rest converter in the middle.
    pub fn merge(&mut self, source: &Registry<H>, prefix: &str) -> Result<(), RouteError> {
        let prefix_segments = compile_segments(prefix, &self.converters)?;
        let prefix_norm = normalize_path(prefix);

        let mut merged = Vec::with_capacity(source.entries.len());
        for entry in &source.entries {
            let mut segments: SegmentVec = prefix_segments.clone();
            segments.extend(entry.template().segments().iter().cloned());
            let raw = normalize_path(&format!(
                "{}/{}",
                prefix_norm.trim_end_matches('/'),
                entry.template().raw().trim_start_matches('/')
            ));
            let template = Template::from_segments(&raw, segments)?;
            merged.push(RouteEntry::new(
                template,
                entry.handler().clone(),
                entry.methods().clone(),
            ));
        }

        info!(
            prefix = %prefix_norm,
            routes_count = merged.len(),
            "Merging routes"
        );
        for entry in merged {
            self.insert(entry);
        }
        Ok(())
    }
}
