//! # Hot Reload Module
//!
//! Live reloading of a route manifest without restarting the host.
//!
//! ## Overview
//!
//! The watcher observes the manifest file and, on every modify or create
//! event:
//! - Reloads and compiles the manifest
//! - Publishes the new registry into a [`SharedRegistry`]
//! - Calls a reload hook with the freshly published registry
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pathwright::hot_reload::watch_manifest;
//! use pathwright::manifest::load_registry;
//! use pathwright::router::SharedRegistry;
//! use std::sync::Arc;
//!
//! let shared = Arc::new(SharedRegistry::new(load_registry("routes.toml")?, 1024));
//! let _watcher = watch_manifest("routes.toml", Arc::clone(&shared), |registry| {
//!     println!("Reloaded {} routes", registry.len());
//! })?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Keep the returned watcher alive for as long as reloads should happen.
//!
//! ## Error Handling
//!
//! If the new manifest fails to read, parse or compile, the error is logged
//! and the previous routing table stays published. Saving a half-edited file
//! never takes routes down. An empty file is skipped without logging an
//! error, since editors truncate before writing.

use anyhow::Result;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::manifest::load_registry;
use crate::router::{Registry, SharedRegistry};

/// Load `path` and publish it into `shared`.
///
/// Returns the number of routes published. On error nothing is published.
/// The slow-match threshold of the outgoing registry carries over.
///
/// # Errors
///
/// Any read, parse or registration error from [`load_registry`].
pub fn reload_manifest(path: &Path, shared: &SharedRegistry<String>) -> Result<usize> {
    let mut registry = load_registry(path)?;
    registry.set_slow_match_threshold(shared.load().registry().slow_match_threshold());
    let count = registry.len();
    shared.store(registry);
    Ok(count)
}

/// Watch a route manifest and republish the [`SharedRegistry`] when it
/// changes.
///
/// `on_reload` receives the registry that was just published, so the caller
/// can refresh handler bindings or log a summary.
///
/// # Errors
///
/// Fails if the watcher cannot be created or the path cannot be watched.
pub fn watch_manifest<P, F>(
    manifest_path: P,
    shared: Arc<SharedRegistry<String>>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&Registry<String>) + Send + 'static,
{
    let path: PathBuf = manifest_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                // Truncation ahead of a rewrite shows up as a separate event.
                if fs::metadata(&watch_path).map(|m| m.len() == 0).unwrap_or(true) {
                    debug!(manifest = %watch_path.display(), "hot-reload: skipping empty manifest");
                    return;
                }
                match reload_manifest(&watch_path, &shared) {
                    Ok(count) => {
                        info!(
                            manifest = %watch_path.display(),
                            routes_count = count,
                            "hot-reload: routing table updated"
                        );
                        on_reload(shared.load().registry());
                    }
                    Err(e) => {
                        warn!(
                            manifest = %watch_path.display(),
                            error = format!("{e:#}"),
                            "hot-reload: keeping previous routing table"
                        );
                    }
                }
            }
            Err(e) => error!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Methods;
    use std::time::Duration;

    #[test]
    fn test_reload_publishes_new_routes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        fs::write(&path, "[[routes]]\npath = \"/a\"\nhandler = \"a\"\n").unwrap();

        let mut initial = Registry::new();
        initial
            .add_route("/old", "old".to_string(), Methods::Any)
            .unwrap();
        let shared = SharedRegistry::new(initial, 16);

        assert_eq!(reload_manifest(&path, &shared).unwrap(), 1);
        assert!(shared.match_route("GET", "/a").is_match());
        assert!(shared.match_route("GET", "/old").is_not_found());
    }

    #[test]
    fn test_bad_manifest_keeps_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        fs::write(&path, "[[routes]]\npath = \"/a/{x:nope}\"\nhandler = \"a\"\n").unwrap();

        let mut initial = Registry::new();
        initial
            .add_route("/old", "old".to_string(), Methods::Any)
            .unwrap();
        let shared = SharedRegistry::new(initial, 16);

        assert!(reload_manifest(&path, &shared).is_err());
        assert!(shared.match_route("GET", "/old").is_match());
    }

    #[test]
    fn test_reload_keeps_slow_match_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        fs::write(&path, "[[routes]]\npath = \"/a\"\nhandler = \"a\"\n").unwrap();

        let mut initial: Registry<String> = Registry::new();
        initial.set_slow_match_threshold(Duration::from_micros(250));
        let shared = SharedRegistry::new(initial, 16);

        reload_manifest(&path, &shared).unwrap();
        assert_eq!(
            shared.load().registry().slow_match_threshold(),
            Duration::from_micros(250)
        );
    }
}
