//! Template compiler: path template strings → ordered typed segments.
//!
//! Templates are compiled once, at registration time. The request path is
//! split with the same rule ([`split_segments`]) so literal segments compare
//! byte-for-byte against what was registered.

use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::converter::{Converter, ConverterRegistry, DEFAULT_CONVERTER};
use crate::error::RouteError;

/// Segments stored inline before spilling to the heap.
pub const MAX_INLINE_SEGMENTS: usize = 8;

/// Segment storage for a compiled template.
pub type SegmentVec = SmallVec<[Segment; MAX_INLINE_SEGMENTS]>;

/// One unit of a compiled template.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Matches one path segment by exact string equality.
    Literal(Arc<str>),
    /// Matches whatever its converter accepts and binds it to `name`.
    Dynamic {
        /// Parameter name, unique within a template
        name: Arc<str>,
        /// Converter resolved at compile time
        converter: Arc<Converter>,
    },
}

impl Segment {
    /// `true` for placeholders.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Segment::Dynamic { .. })
    }

    /// `true` for a placeholder whose converter consumes the rest of the path.
    #[must_use]
    pub fn consumes_rest(&self) -> bool {
        match self {
            Segment::Dynamic { converter, .. } => converter.consumes_rest(),
            Segment::Literal(_) => false,
        }
    }

    /// Parameter name, for placeholders.
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Dynamic { name, .. } => Some(name),
            Segment::Literal(_) => None,
        }
    }
}

/// Two segments are the same if they would match the same text the same way:
/// equal literals, or placeholders with the same name and converter name.
impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (
                Segment::Dynamic {
                    name: a,
                    converter: ca,
                },
                Segment::Dynamic {
                    name: b,
                    converter: cb,
                },
            ) => a == b && ca.name() == cb.name(),
            _ => false,
        }
    }
}

impl Eq for Segment {}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Dynamic { name, converter } if converter.name() == DEFAULT_CONVERTER => {
                write!(f, "{{{name}}}")
            }
            Segment::Dynamic { name, converter } => write!(f, "{{{name}:{}}}", converter.name()),
        }
    }
}

/// Split a path (or template) into its `/`-delimited pieces.
///
/// Slashes at either end produce no pieces; interior empty pieces are kept,
/// so `/a//b/` splits into `a`, `""`, `b`. An empty piece matches no `str`
/// or `int` placeholder and no non-empty literal.
pub fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.trim_matches('/');
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}

/// Normalize a path: one leading `/` and no trailing `/`. Interior slashes
/// are kept as written. The empty path and any run of slashes normalize to
/// `/`.
///
/// # Example
///
/// ```rust
/// use pathwright::router::normalize_path;
///
/// assert_eq!(normalize_path("users/list/"), "/users/list");
/// assert_eq!(normalize_path("/users//list"), "/users//list");
/// assert_eq!(normalize_path("//"), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    let mut out = String::with_capacity(trimmed.len() + 1);
    out.push('/');
    out.push_str(trimmed);
    out
}

/// Strip the `?query` and `#fragment` parts of a raw request target.
///
/// ```rust
/// use pathwright::router::split_target;
///
/// assert_eq!(split_target("/search?q=rust#top"), "/search");
/// assert_eq!(split_target("/plain"), "/plain");
/// ```
#[must_use]
pub fn split_target(target: &str) -> &str {
    match target.find(['?', '#']) {
        Some(idx) => &target[..idx],
        None => target,
    }
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct Template {
    raw: String,
    normalized: String,
    segments: SegmentVec,
}

impl Template {
    /// Compile `template` against the converters in `converters`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::TemplateSyntax`] for unbalanced braces, empty or invalid
    ///   parameter names, repeated names, or a rest-consuming converter that
    ///   is not last.
    /// - [`RouteError::UnknownConverter`] when a placeholder names a converter
    ///   that is not registered.
    pub fn compile(template: &str, converters: &ConverterRegistry) -> Result<Self, RouteError> {
        let segments = compile_segments(template, converters)?;
        Self::from_segments(template, segments)
    }

    /// Assemble a template from already-compiled segments, re-running the
    /// whole-template checks (unique names, rest converter last).
    pub(crate) fn from_segments(raw: &str, segments: SegmentVec) -> Result<Self, RouteError> {
        validate(raw, &segments)?;
        let normalized = render(&segments);
        Ok(Self {
            raw: raw.to_string(),
            normalized,
            segments,
        })
    }

    /// The template string as it was registered.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized template (`/users/{id:int}`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The compiled segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments; `0` for the root template.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// `true` for the root template `/`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of placeholder segments.
    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_dynamic()).count()
    }

    /// Index of the first placeholder, if any.
    #[must_use]
    pub fn first_dynamic(&self) -> Option<usize> {
        self.segments.iter().position(Segment::is_dynamic)
    }

    /// `true` if the last segment swallows the rest of the path.
    #[must_use]
    pub fn ends_with_rest(&self) -> bool {
        self.segments.last().is_some_and(Segment::consumes_rest)
    }

    /// Parameter names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::param_name)
    }

    /// `true` if both templates have identical segment sequences, i.e. one
    /// registration would redefine the other.
    #[must_use]
    pub fn same_shape(&self, other: &Template) -> bool {
        self.segments == other.segments
    }

    /// Regex source equivalent to this template, for diagnostics.
    ///
    /// Matching never goes through this regex; it exists so route tables can
    /// be inspected and compared with other routers.
    #[must_use]
    pub fn regex_source(&self) -> String {
        if self.segments.is_empty() {
            return String::from("^/$");
        }
        let mut pattern = String::with_capacity(self.normalized.len() + 16);
        pattern.push('^');
        for seg in &self.segments {
            pattern.push('/');
            match seg {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Dynamic { name, converter } => {
                    pattern.push_str("(?P<");
                    pattern.push_str(name);
                    pattern.push('>');
                    pattern.push_str(converter.fragment());
                    pattern.push(')');
                }
            }
        }
        pattern.push('$');
        pattern
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// Compile each piece of `template` without the whole-template checks.
pub(crate) fn compile_segments(
    template: &str,
    converters: &ConverterRegistry,
) -> Result<SegmentVec, RouteError> {
    let mut segments = SegmentVec::new();
    for piece in split_segments(template) {
        segments.push(compile_piece(template, piece, converters)?);
    }
    Ok(segments)
}

fn compile_piece(
    template: &str,
    piece: &str,
    converters: &ConverterRegistry,
) -> Result<Segment, RouteError> {
    let Some(inner) = piece
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        if piece.contains(['{', '}']) {
            return Err(RouteError::syntax(
                template,
                format!("unmatched brace in segment '{piece}'"),
            ));
        }
        return Ok(Segment::Literal(Arc::from(piece)));
    };

    if inner.contains(['{', '}']) {
        return Err(RouteError::syntax(
            template,
            format!("unmatched brace in segment '{piece}'"),
        ));
    }

    let (name, converter_name) = match inner.split_once(':') {
        Some((name, conv)) => (name, conv),
        None => (inner, DEFAULT_CONVERTER),
    };

    if !is_valid_param_name(name) {
        return Err(RouteError::syntax(
            template,
            format!("invalid parameter name '{name}' in segment '{piece}'"),
        ));
    }
    if converter_name.is_empty() {
        return Err(RouteError::syntax(
            template,
            format!("empty converter name in segment '{piece}'"),
        ));
    }

    let converter =
        converters
            .resolve(converter_name)
            .ok_or_else(|| RouteError::UnknownConverter {
                template: template.to_string(),
                converter: converter_name.to_string(),
            })?;

    Ok(Segment::Dynamic {
        name: Arc::from(name),
        converter,
    })
}

/// Parameter names are identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_valid_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate(template: &str, segments: &[Segment]) -> Result<(), RouteError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(segments.len());
    let last = segments.len().saturating_sub(1);
    for (idx, seg) in segments.iter().enumerate() {
        if let Segment::Dynamic { name, converter } = seg {
            if !seen.insert(name.as_ref()) {
                return Err(RouteError::syntax(
                    template,
                    format!("parameter '{name}' appears more than once"),
                ));
            }
            if converter.consumes_rest() && idx != last {
                return Err(RouteError::syntax(
                    template,
                    format!(
                        "'{}' converter on parameter '{name}' must be the last segment",
                        converter.name()
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn render(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return String::from("/");
    }
    let mut out = String::new();
    for seg in segments {
        out.push('/');
        out.push_str(&seg.to_string());
    }
    out
}
