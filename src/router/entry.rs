//! Route entries, method sets and the specificity key used for ranking.

use http::Method;
use serde::Serialize;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

use super::template::Template;
use crate::error::RouteError;

/// Methods stored inline per route before spilling to the heap.
pub const MAX_INLINE_METHODS: usize = 4;

/// Parse a method token, case-insensitively, into an [`http::Method`].
///
/// `get`, `Get` and `GET` all produce [`Method::GET`]. Extension tokens
/// (e.g. `PURGE`) are accepted and stored uppercased.
///
/// # Errors
///
/// [`RouteError::InvalidMethod`] if the token is empty or contains characters
/// that are not valid in an HTTP method.
pub fn parse_method(token: &str) -> Result<Method, RouteError> {
    let upper = token.trim().to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| RouteError::InvalidMethod {
        method: token.to_string(),
    })
}

/// Which HTTP methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Methods {
    /// No restriction: every method is allowed.
    #[default]
    Any,
    /// Only the listed methods, uppercase, deduplicated, in first-seen order.
    Only(SmallVec<[Method; MAX_INLINE_METHODS]>),
}

impl Methods {
    /// Build a restricted set from method tokens.
    ///
    /// An empty iterator yields an empty set, which the registry rejects with
    /// [`RouteError::EmptyMethodSet`].
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidMethod`] for any token that is not a valid method.
    pub fn only<I, S>(tokens: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: SmallVec<[Method; MAX_INLINE_METHODS]> = SmallVec::new();
        for token in tokens {
            let method = parse_method(token.as_ref())?;
            if !set.contains(&method) {
                set.push(method);
            }
        }
        Ok(Methods::Only(set))
    }

    /// A set holding exactly one method.
    #[must_use]
    pub fn single(method: Method) -> Self {
        let mut set = SmallVec::new();
        set.push(method);
        Methods::Only(set)
    }

    /// `None` → [`Methods::Any`], `Some(tokens)` → [`Methods::only`].
    ///
    /// # Errors
    ///
    /// See [`Methods::only`].
    pub fn from_tokens<S: AsRef<str>>(tokens: Option<&[S]>) -> Result<Self, RouteError> {
        match tokens {
            None => Ok(Methods::Any),
            Some(list) => Methods::only(list),
        }
    }

    /// `true` for [`Methods::Any`].
    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, Methods::Any)
    }

    /// `true` if a restricted set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Methods::Only(set) if set.is_empty())
    }

    /// Case-insensitive membership test for a raw method token.
    #[must_use]
    pub fn allows(&self, method: &str) -> bool {
        match self {
            Methods::Any => true,
            Methods::Only(set) => set.iter().any(|m| m.as_str().eq_ignore_ascii_case(method)),
        }
    }

    /// Membership test for a parsed method.
    #[must_use]
    pub fn allows_method(&self, method: &Method) -> bool {
        match self {
            Methods::Any => true,
            Methods::Only(set) => set.contains(method),
        }
    }

    /// The restricted methods, or an empty slice for [`Methods::Any`].
    #[must_use]
    pub fn as_slice(&self) -> &[Method] {
        match self {
            Methods::Any => &[],
            Methods::Only(set) => set,
        }
    }

    /// Method names for display and serialization; `["*"]` for any.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        match self {
            Methods::Any => vec![String::from("*")],
            Methods::Only(set) => set.iter().map(|m| m.as_str().to_string()).collect(),
        }
    }
}

impl fmt::Display for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(","))
    }
}

impl Serialize for Methods {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names().serialize(serializer)
    }
}

impl From<Method> for Methods {
    fn from(method: Method) -> Self {
        Methods::single(method)
    }
}

/// Ranking key for structurally matching templates.
///
/// Ordering is ascending by preference: the `Less` side of a comparison is the
/// more specific template.
///
/// 1. Fewer placeholders first.
/// 2. Among equal counts, the template whose first placeholder sits later.
///
/// Registration order breaks remaining ties and lives outside this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Specificity {
    dynamic_count: usize,
    first_dynamic: usize,
}

impl Specificity {
    /// Derive the key from a compiled template.
    #[must_use]
    pub fn of(template: &Template) -> Self {
        Self {
            dynamic_count: template.dynamic_count(),
            first_dynamic: template.first_dynamic().unwrap_or(template.len()),
        }
    }

    /// Number of placeholder segments.
    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        self.dynamic_count
    }

    /// Position of the first placeholder (segment count if there is none).
    #[must_use]
    pub fn first_dynamic(&self) -> usize {
        self.first_dynamic
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dynamic_count
            .cmp(&other.dynamic_count)
            .then_with(|| other.first_dynamic.cmp(&self.first_dynamic))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One registered route. Immutable once built.
#[derive(Clone)]
pub struct RouteEntry<H> {
    template: Template,
    handler: H,
    methods: Methods,
    specificity: Specificity,
}

impl<H> RouteEntry<H> {
    pub(crate) fn new(template: Template, handler: H, methods: Methods) -> Self {
        let specificity = Specificity::of(&template);
        Self {
            template,
            handler,
            methods,
            specificity,
        }
    }

    /// The compiled template.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The handler registered for this route.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Allowed methods.
    #[must_use]
    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    /// Ranking key.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.specificity
    }
}

impl<H> fmt::Debug for RouteEntry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("template", &self.template.as_str())
            .field("methods", &self.methods)
            .field("specificity", &self.specificity)
            .finish_non_exhaustive()
    }
}
