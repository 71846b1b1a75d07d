//! Converter registry: named rules that accept and type one raw path segment.
//!
//! Three converters are built in:
//!
//! | name   | accepts                                  | produces              |
//! |--------|------------------------------------------|-----------------------|
//! | `str`  | one segment, any characters except `/`   | [`ParamValue::Str`]   |
//! | `int`  | one segment of ASCII digits, no sign     | [`ParamValue::Int`]   |
//! | `path` | everything up to the end of the path     | [`ParamValue::Str`]   |
//!
//! `str` is the default for `{name}` placeholders. Additional converters can be
//! registered with [`ConverterRegistry::register`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

use crate::error::ConvertError;

/// Name of the converter used when a placeholder does not name one.
pub const DEFAULT_CONVERTER: &str = "str";

static STR_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[^/]+)$").expect("str converter regex should be valid"));
static INT_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]+)$").expect("int converter regex should be valid"));
static PATH_REMAINDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?s).+)$").expect("path converter regex should be valid"));

/// Typed value extracted from a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Produced by `int`
    Int(i64),
    /// Produced by `str`, `path` and most custom converters
    Str(String),
}

impl ParamValue {
    /// The integer value, if this came from an integer converter.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Str(_) => None,
        }
    }

    /// The string value, if this came from a string-producing converter.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s.as_str()),
            ParamValue::Int(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

/// Parse half of a converter: raw text in, typed value out.
pub type ParseFn = dyn Fn(&str) -> Result<ParamValue, ConvertError> + Send + Sync;

/// A named segment converter.
///
/// The regex fragment describes which raw characters are accepted; the parse
/// function turns accepted text into a [`ParamValue`]. Both must agree for a
/// segment to match.
#[derive(Clone)]
pub struct Converter {
    name: Arc<str>,
    fragment: String,
    matcher: Regex,
    parse: Arc<ParseFn>,
    consumes_rest: bool,
}

impl Converter {
    /// Create a single-segment converter.
    ///
    /// `fragment` is an unanchored regex describing one accepted segment
    /// (e.g. `[a-z0-9-]+`). It is anchored on both ends internally.
    pub fn new<F>(name: &str, fragment: &str, parse: F) -> Result<Self, regex::Error>
    where
        F: Fn(&str) -> Result<ParamValue, ConvertError> + Send + Sync + 'static,
    {
        let matcher = Regex::new(&format!("^(?:{fragment})$"))?;
        Ok(Self {
            name: Arc::from(name),
            fragment: fragment.to_string(),
            matcher,
            parse: Arc::new(parse),
            consumes_rest: false,
        })
    }

    /// Create a converter that consumes the remainder of the path, embedded
    /// `/` included. Such a converter may only appear as the last segment of a
    /// template.
    pub fn remainder<F>(name: &str, fragment: &str, parse: F) -> Result<Self, regex::Error>
    where
        F: Fn(&str) -> Result<ParamValue, ConvertError> + Send + Sync + 'static,
    {
        let mut conv = Self::new(name, fragment, parse)?;
        conv.consumes_rest = true;
        Ok(conv)
    }

    fn builtin<F>(name: &str, fragment: &str, matcher: &Regex, consumes_rest: bool, parse: F) -> Self
    where
        F: Fn(&str) -> Result<ParamValue, ConvertError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            fragment: fragment.to_string(),
            matcher: matcher.clone(),
            parse: Arc::new(parse),
            consumes_rest,
        }
    }

    /// The default `str` converter.
    #[must_use]
    pub fn string() -> Self {
        Self::builtin("str", "[^/]+", &STR_SEGMENT, false, |raw| {
            Ok(ParamValue::Str(raw.to_string()))
        })
    }

    /// The `int` converter: unsigned decimal digits parsed into an `i64`.
    ///
    /// Digit strings beyond `i64::MAX` still match and are kept verbatim as
    /// [`ParamValue::Str`].
    #[must_use]
    pub fn int() -> Self {
        Self::builtin("int", "[0-9]+", &INT_SEGMENT, false, |raw| {
            Ok(raw
                .parse::<i64>()
                .map_or_else(|_| ParamValue::Str(raw.to_string()), ParamValue::Int))
        })
    }

    /// The `path` converter: the rest of the path as a raw string.
    #[must_use]
    pub fn path() -> Self {
        Self::builtin("path", ".+", &PATH_REMAINDER, true, |raw| {
            Ok(ParamValue::Str(raw.to_string()))
        })
    }

    /// Converter name as written in templates.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unanchored regex fragment describing accepted text.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// `true` if this converter swallows the rest of the path.
    #[must_use]
    pub fn consumes_rest(&self) -> bool {
        self.consumes_rest
    }

    /// Convert raw text, or `None` if it is not accepted.
    ///
    /// A parse function that returns an error or panics is reported as a
    /// non-match; nothing propagates to the caller.
    #[must_use]
    pub fn convert(&self, raw: &str) -> Option<ParamValue> {
        if !self.matcher.is_match(raw) {
            return None;
        }
        match catch_unwind(AssertUnwindSafe(|| (self.parse)(raw))) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                debug!(converter = %self.name, raw = %raw, error = %e, "Converter rejected segment");
                None
            }
            Err(_) => {
                debug!(converter = %self.name, raw = %raw, "Converter panicked, treating as no match");
                None
            }
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("name", &self.name)
            .field("fragment", &self.fragment)
            .field("consumes_rest", &self.consumes_rest)
            .finish_non_exhaustive()
    }
}

/// Name → converter lookup used by the template compiler.
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    converters: HashMap<Arc<str>, Arc<Converter>>,
}

impl ConverterRegistry {
    /// A registry with no converters at all, not even `str`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// A registry holding `str`, `int` and `path`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        reg.register(Converter::string());
        reg.register(Converter::int());
        reg.register(Converter::path());
        reg
    }

    /// Register a converter under its own name, replacing any previous
    /// converter with that name. Returns the replaced converter.
    pub fn register(&mut self, converter: Converter) -> Option<Arc<Converter>> {
        let key = Arc::clone(&converter.name);
        self.converters.insert(key, Arc::new(converter))
    }

    /// Look up a converter by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<Converter>> {
        self.converters.get(name).map(Arc::clone)
    }

    /// `true` if a converter with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Registered converter names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.converters.keys().map(|k| k.as_ref()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
