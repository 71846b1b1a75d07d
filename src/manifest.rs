//! # Route Manifests
//!
//! Declarative route tables: templates mapped to handler *names*, loaded from
//! TOML, YAML or JSON and compiled into a [`Registry<String>`]. The CLI and
//! the hot-reload watcher are both built on this.
//!
//! ## Format
//!
//! ```toml
//! [[routes]]
//! path = "/users/{id:int}"
//! handler = "get_user"
//! methods = ["GET"]        # optional; omitted means any method
//!
//! [[mounts]]
//! prefix = "/api/v1"
//!
//! [[mounts.routes]]
//! path = "/users"
//! handler = "list_users"
//! ```
//!
//! Top-level routes are registered first, in file order. Each mount is built
//! as its own registry and merged under its prefix, also in file order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::RouteError;
use crate::router::{ConverterRegistry, Methods, Registry};

/// One route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    /// Path template
    pub path: String,
    /// Handler name the host resolves to a callable
    pub handler: String,
    /// Allowed methods; `None` allows any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

impl RouteSpec {
    fn methods(&self) -> Result<Methods, RouteError> {
        Methods::from_tokens(self.methods.as_deref())
    }
}

/// A group of routes merged under a common prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MountSpec {
    /// Prefix prepended to every route in the group
    pub prefix: String,
    /// Routes relative to the prefix
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

/// A whole route manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Routes registered at the root
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    /// Prefixed route groups
    #[serde(default)]
    pub mounts: Vec<MountSpec>,
}

/// Serialization format of a manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Pick the format from a file extension. Unknown extensions are read as
    /// YAML, which also accepts JSON documents.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => ManifestFormat::Toml,
            Some("json") => ManifestFormat::Json,
            _ => ManifestFormat::Yaml,
        }
    }
}

impl Manifest {
    /// Parse a manifest from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse in `format` or has
    /// unknown fields.
    pub fn parse(content: &str, format: ManifestFormat) -> Result<Self> {
        let manifest = match format {
            ManifestFormat::Toml => toml::from_str(content).context("invalid TOML route manifest")?,
            ManifestFormat::Yaml => {
                serde_yaml::from_str(content).context("invalid YAML route manifest")?
            }
            ManifestFormat::Json => {
                serde_json::from_str(content).context("invalid JSON route manifest")?
            }
        };
        Ok(manifest)
    }

    /// Read and parse a manifest file; the format follows the extension.
    ///
    /// # Errors
    ///
    /// I/O errors and parse errors, with the file path attached.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read route manifest {}", path.display()))?;
        Self::parse(&content, ManifestFormat::from_path(path))
            .with_context(|| format!("failed to parse route manifest {}", path.display()))
    }

    /// Total number of route declarations, mounts included.
    pub fn route_count(&self) -> usize {
        self.routes.len() + self.mounts.iter().map(|m| m.routes.len()).sum::<usize>()
    }

    /// Compile into a registry with the built-in converters.
    ///
    /// # Errors
    ///
    /// The first [`RouteError`] hit while registering.
    pub fn build(&self) -> Result<Registry<String>, RouteError> {
        self.build_with(ConverterRegistry::with_builtins())
    }

    /// Compile into a registry using `converters`; mounted groups use the
    /// same converters.
    ///
    /// # Errors
    ///
    /// The first [`RouteError`] hit while registering.
    pub fn build_with(&self, converters: ConverterRegistry) -> Result<Registry<String>, RouteError> {
        let mut registry = Registry::with_converters(converters.clone());
        for route in &self.routes {
            registry.add_route(&route.path, route.handler.clone(), route.methods()?)?;
        }
        for mount in &self.mounts {
            let mut group = Registry::with_converters(converters.clone());
            for route in &mount.routes {
                group.add_route(&route.path, route.handler.clone(), route.methods()?)?;
            }
            registry.merge(&group, &mount.prefix)?;
        }
        Ok(registry)
    }
}

/// Load a manifest file and compile it.
///
/// # Errors
///
/// Read, parse and registration errors, with the file path attached.
pub fn load_registry(path: impl AsRef<Path>) -> Result<Registry<String>> {
    let path = path.as_ref();
    let manifest = Manifest::load(path)?;
    let registry = manifest
        .build()
        .with_context(|| format!("invalid route in {}", path.display()))?;
    info!(
        manifest = %path.display(),
        routes_count = registry.len(),
        declared = manifest.route_count(),
        "Route manifest loaded"
    );
    Ok(registry)
}
