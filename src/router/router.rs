use http::Method;

use super::core::MatchResult;
use super::entry::Methods;
use super::registry::Registry;
use crate::error::RouteError;

/// Builder for a group of routes.
///
/// A `Router` owns its own [`Registry`] and adds per-verb registration
/// shortcuts. Routers compose: [`Router::include_router`] copies another
/// router's routes in under a prefix, leaving the included router untouched.
///
/// ```rust
/// use pathwright::router::Router;
///
/// # fn main() -> Result<(), pathwright::RouteError> {
/// let mut users = Router::new();
/// users.get("/", "list_users")?.get("/{id:int}", "get_user")?;
///
/// let mut app = Router::new();
/// app.include_router(&users, "/api/v1/users")?;
///
/// let m = app.match_route("GET", "/api/v1/users/7");
/// assert_eq!(m.handler(), Some(&"get_user"));
/// assert_eq!(m.path_params.get_int("id"), Some(7));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Router<H> {
    registry: Registry<H>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Router<H> {
    /// An empty router with the built-in converters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Wrap an existing registry.
    #[must_use]
    pub fn from_registry(registry: Registry<H>) -> Self {
        Self { registry }
    }

    /// Register `template` for `handler` with an explicit method set.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn route(
        &mut self,
        template: &str,
        handler: H,
        methods: impl Into<Methods>,
    ) -> Result<&mut Self, RouteError> {
        self.registry.add_route(template, handler, methods)?;
        Ok(self)
    }

    /// Register `template` for any method.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn any(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.route(template, handler, Methods::Any)
    }

    /// Register `template` for a single method.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn on(&mut self, method: Method, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.route(template, handler, Methods::single(method))
    }

    /// Register a `GET` route.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn get(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.on(Method::GET, template, handler)
    }

    /// Register a `POST` route.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn post(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.on(Method::POST, template, handler)
    }

    /// Register a `PUT` route.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn put(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.on(Method::PUT, template, handler)
    }

    /// Register a `PATCH` route.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn patch(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.on(Method::PATCH, template, handler)
    }

    /// Register a `DELETE` route.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn delete(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.on(Method::DELETE, template, handler)
    }

    /// Register a `CONNECT` route.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn connect(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.on(Method::CONNECT, template, handler)
    }

    /// Register a `HEAD` route.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn head(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.on(Method::HEAD, template, handler)
    }

    /// Register an `OPTIONS` route.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn options(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.on(Method::OPTIONS, template, handler)
    }

    /// Register a `TRACE` route.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_route`].
    pub fn trace(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.on(Method::TRACE, template, handler)
    }

    /// Resolve a request against this router's routes.
    #[must_use]
    pub fn match_route(&self, method: &str, path: &str) -> MatchResult<H> {
        self.registry.match_route(method, path)
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Registry<H> {
        &self.registry
    }

    /// Mutable access to the underlying registry.
    pub fn registry_mut(&mut self) -> &mut Registry<H> {
        &mut self.registry
    }

    /// Consume the router, keeping its registry.
    #[must_use]
    pub fn into_registry(self) -> Registry<H> {
        self.registry
    }
}

impl<H: Clone> Router<H> {
    /// Copy `other`'s routes into this router under `prefix`.
    ///
    /// # Errors
    ///
    /// See [`Registry::merge`].
    pub fn include_router(&mut self, other: &Router<H>, prefix: &str) -> Result<&mut Self, RouteError> {
        self.registry.merge(&other.registry, prefix)?;
        Ok(self)
    }
}

impl<H> From<Registry<H>> for Router<H> {
    fn from(registry: Registry<H>) -> Self {
        Self::from_registry(registry)
    }
}
