//! Registration-time errors.
//!
//! Everything in here is raised while routes are being wired, never while a
//! request is being matched. "No route" and "method not allowed" are ordinary
//! [`MatchResult`](crate::router::MatchResult) values, not errors.

use thiserror::Error;

/// Error returned when a route cannot be registered.
///
/// All variants are fatal to the registration that produced them. A host
/// application is expected to abort startup rather than serve with a partial
/// routing table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The template is malformed: unbalanced braces, an empty or invalid
    /// parameter name, a repeated parameter name, or a `path` converter that
    /// is not the final segment.
    #[error("invalid route template '{template}': {reason}")]
    TemplateSyntax {
        /// The template as it was handed to the registry
        template: String,
        /// Human-readable description of the problem
        reason: String,
    },

    /// The template references a converter that was never registered.
    #[error("route template '{template}' references unknown converter '{converter}'")]
    UnknownConverter {
        /// The template as it was handed to the registry
        template: String,
        /// The converter name that failed to resolve
        converter: String,
    },

    /// A method token is not a valid HTTP method.
    #[error("invalid HTTP method token '{method}'")]
    InvalidMethod {
        /// The offending token
        method: String,
    },

    /// A method restriction was supplied but contained no methods.
    ///
    /// Use [`Methods::Any`](crate::router::Methods::Any) for an unrestricted route.
    #[error("route template '{template}' was given an empty method set")]
    EmptyMethodSet {
        /// The template the empty set was attached to
        template: String,
    },
}

impl RouteError {
    pub(crate) fn syntax(template: &str, reason: impl Into<String>) -> Self {
        RouteError::TemplateSyntax {
            template: template.to_string(),
            reason: reason.into(),
        }
    }

    /// `true` for the template-syntax family of errors.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self, RouteError::TemplateSyntax { .. })
    }
}

/// Error produced by a converter that rejects a raw segment.
///
/// Converters return this instead of panicking; the matcher treats it as
/// "this candidate does not match" and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("converter '{converter}' rejected '{raw}': {reason}")]
pub struct ConvertError {
    /// Name of the converter that rejected the input
    pub converter: String,
    /// The raw segment text
    pub raw: String,
    /// Why it was rejected
    pub reason: String,
}

impl ConvertError {
    /// Build a rejection for `raw` from converter `converter`.
    pub fn new(converter: &str, raw: &str, reason: impl Into<String>) -> Self {
        Self {
            converter: converter.to_string(),
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}
