//! # View Module
//!
//! Handler groups: one handler per HTTP method behind a single route.
//!
//! A [`MethodTable`] is a fixed lookup table from method to handler, built
//! once at setup. Dispatching a method with no entry yields
//! [`Dispatch::NotImplemented`] carrying the methods that *are* implemented,
//! which is everything a host needs to answer 405 with an `Allow` header.
//!
//! ```rust
//! use pathwright::view::{Dispatch, MethodTable};
//! use pathwright::router::Registry;
//! use http::Method;
//!
//! let table = MethodTable::new()
//!     .on(Method::GET, "show_article")
//!     .on(Method::DELETE, "delete_article");
//!
//! let mut registry = Registry::new();
//! registry.add_view("/articles/{slug}", table).unwrap();
//!
//! let m = registry.match_route("GET", "/articles/hello-world");
//! let view = m.handler().unwrap();
//! assert!(matches!(view.dispatch(&Method::GET), Dispatch::Handler(&"show_article")));
//!
//! // The route itself only admits the table's methods.
//! assert_eq!(registry.match_route("PUT", "/articles/x").method_allowed, Some(false));
//! ```

use http::Method;
use smallvec::SmallVec;
use std::fmt;

use crate::error::RouteError;
use crate::router::{Methods, Registry, MAX_INLINE_METHODS};

/// Result of looking a method up in a [`MethodTable`].
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch<'a, F> {
    /// The handler registered for the method.
    Handler(&'a F),
    /// No handler for the method; `allowed` lists the implemented ones.
    NotImplemented {
        /// Methods this table does implement
        allowed: Vec<Method>,
    },
}

/// Method → handler lookup table for one resource.
#[derive(Clone)]
pub struct MethodTable<F> {
    handlers: SmallVec<[(Method, F); MAX_INLINE_METHODS]>,
}

impl<F> Default for MethodTable<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> MethodTable<F> {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: SmallVec::new(),
        }
    }

    /// Set the handler for `method`, replacing any previous one.
    #[must_use]
    pub fn on(mut self, method: Method, handler: F) -> Self {
        self.insert(method, handler);
        self
    }

    /// Set the handler for `method` in place. Returns the replaced handler.
    pub fn insert(&mut self, method: Method, handler: F) -> Option<F> {
        if let Some(slot) = self.handlers.iter_mut().find(|(m, _)| *m == method) {
            return Some(std::mem::replace(&mut slot.1, handler));
        }
        self.handlers.push((method, handler));
        None
    }

    /// Look up the handler for a parsed method.
    #[must_use]
    pub fn dispatch(&self, method: &Method) -> Dispatch<'_, F> {
        match self.handlers.iter().find(|(m, _)| m == method) {
            Some((_, handler)) => Dispatch::Handler(handler),
            None => Dispatch::NotImplemented {
                allowed: self.handlers.iter().map(|(m, _)| m.clone()).collect(),
            },
        }
    }

    /// Look up the handler for a raw method token, case-insensitively.
    #[must_use]
    pub fn dispatch_str(&self, method: &str) -> Dispatch<'_, F> {
        match self
            .handlers
            .iter()
            .find(|(m, _)| m.as_str().eq_ignore_ascii_case(method))
        {
            Some((_, handler)) => Dispatch::Handler(handler),
            None => Dispatch::NotImplemented {
                allowed: self.handlers.iter().map(|(m, _)| m.clone()).collect(),
            },
        }
    }

    /// Implemented methods as a route restriction.
    #[must_use]
    pub fn methods(&self) -> Methods {
        Methods::Only(self.handlers.iter().map(|(m, _)| m.clone()).collect())
    }

    /// Number of implemented methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// `true` when no method is implemented.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<F> fmt::Debug for MethodTable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("methods", &self.methods())
            .finish_non_exhaustive()
    }
}

impl<F> Registry<MethodTable<F>> {
    /// Register a method table as one route restricted to exactly the
    /// table's methods.
    ///
    /// # Errors
    ///
    /// [`RouteError::EmptyMethodSet`] for an empty table, plus anything
    /// [`Registry::add_route`] can return.
    pub fn add_view(&mut self, template: &str, table: MethodTable<F>) -> Result<(), RouteError> {
        let methods = table.methods();
        self.add_route(template, table, methods)
    }
}
