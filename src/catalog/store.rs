//! The process-wide catalog holder.
//!
//! The store owns at most one [`Catalog`] snapshot. Reloads build a complete
//! new snapshot off to the side and swap a single `Arc` in; readers clone the
//! `Arc` and never see a half-built catalog. The lock is held only for the
//! clone or the swap, never across I/O.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::loader::{load_catalog, LoadError};
use super::model::Catalog;
use crate::config::MediaConfig;

/// What the store currently holds.
#[derive(Debug, Clone)]
pub enum StoreState {
    /// Nothing has been loaded yet.
    Unloaded,
    /// The last load succeeded.
    Loaded(Arc<Catalog>),
    /// The last load failed; no catalog is served until the next success.
    Error(String),
}

#[derive(Debug)]
pub struct CatalogStore {
    source: PathBuf,
    media_root: PathBuf,
    verify_files: bool,
    current: RwLock<StoreState>,
}

impl CatalogStore {
    /// Create an unloaded store reading `source` for a library under `media_root`.
    pub fn new(source: impl Into<PathBuf>, media_root: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            media_root: media_root.into(),
            verify_files: true,
            current: RwLock::new(StoreState::Unloaded),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.library_config, &config.root).with_file_audit(config.verify_files)
    }

    /// Toggle the missing-file audit performed on every load.
    pub fn with_file_audit(mut self, enabled: bool) -> Self {
        self.verify_files = enabled;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Parse the library file without touching the visible snapshot.
    pub fn load(&self) -> Result<Catalog, LoadError> {
        let root = self.verify_files.then_some(self.media_root.as_path());
        load_catalog(&self.source, root)
    }

    /// Load the library again and install the outcome.
    ///
    /// A failed load clears the snapshot instead of keeping the previous one,
    /// so a broken file never leaves an old catalog mixed with new files on
    /// disk.
    pub fn reload(&self) -> Result<Arc<Catalog>, LoadError> {
        match self.load() {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                tracing::info!(
                    collections = catalog.collections().len(),
                    path = %self.source.display(),
                    "Library loaded"
                );
                self.install(StoreState::Loaded(catalog.clone()));
                Ok(catalog)
            }
            Err(e) => {
                tracing::error!(path = %self.source.display(), error = %e, "Library load failed");
                self.install(StoreState::Error(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn state(&self) -> StoreState {
        self.current.read().clone()
    }

    /// The current snapshot, if the last load succeeded.
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        match &*self.current.read() {
            StoreState::Loaded(catalog) => Some(catalog.clone()),
            StoreState::Unloaded | StoreState::Error(_) => None,
        }
    }

    /// Message from the last failed load.
    pub fn last_error(&self) -> Option<String> {
        match &*self.current.read() {
            StoreState::Error(message) => Some(message.clone()),
            StoreState::Unloaded | StoreState::Loaded(_) => None,
        }
    }

    /// The current snapshot, or the config error a handler should answer with.
    pub fn require(&self) -> reelhouse_common::Result<Arc<Catalog>> {
        match self.state() {
            StoreState::Loaded(catalog) => Ok(catalog),
            StoreState::Error(message) => Err(reelhouse_common::Error::Config(message)),
            StoreState::Unloaded => Err(reelhouse_common::Error::Config(
                "Config not loaded".to_string(),
            )),
        }
    }

    fn install(&self, state: StoreState) {
        *self.current.write() = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const VALID: &str = r#"
collections:
  - {id: serenity, title: Serenity, type: movie, path: Movies/Serenity, filename: serenity.mp4}
"#;

    const SCHEMA_INVALID: &str = r#"
collections:
  - {id: dup, title: A, type: movie, path: a, filename: a.mp4}
  - {id: dup, title: B, type: movie, path: b, filename: b.mp4}
"#;

    fn store_with(content: &str) -> (tempfile::TempDir, CatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("library.yml");
        std::fs::write(&source, content).unwrap();
        let store = CatalogStore::new(&source, dir.path()).with_file_audit(false);
        (dir, store)
    }

    #[test]
    fn test_starts_unloaded() {
        let (_dir, store) = store_with(VALID);
        assert_matches!(store.state(), StoreState::Unloaded);
        assert!(store.catalog().is_none());
        assert!(store.last_error().is_none());
        assert_matches!(store.require(), Err(reelhouse_common::Error::Config(_)));
    }

    #[test]
    fn test_load_does_not_install() {
        let (_dir, store) = store_with(VALID);
        let catalog = store.load().unwrap();
        assert_eq!(catalog.collections().len(), 1);
        assert!(store.catalog().is_none());
    }

    #[test]
    fn test_reload_installs_snapshot() {
        let (_dir, store) = store_with(VALID);
        store.reload().unwrap();
        let catalog = store.catalog().unwrap();
        assert!(catalog.find_collection("serenity").is_some());
        assert!(store.last_error().is_none());
        assert!(store.require().is_ok());
    }

    #[test]
    fn test_failed_reload_discards_previous_snapshot() {
        let (_dir, store) = store_with(VALID);
        store.reload().unwrap();
        let before = store.catalog().unwrap();

        std::fs::write(store.source(), SCHEMA_INVALID).unwrap();
        assert_matches!(store.reload(), Err(LoadError::Schema { .. }));

        assert!(store.catalog().is_none());
        assert!(store.last_error().unwrap().contains("duplicate id"));
        assert_matches!(store.state(), StoreState::Error(_));

        // Holders of the old snapshot keep a consistent view.
        assert!(before.find_collection("serenity").is_some());
    }

    #[test]
    fn test_recovers_after_fix() {
        let (_dir, store) = store_with("collections: 12");
        assert!(store.reload().is_err());
        assert!(store.catalog().is_none());

        std::fs::write(store.source(), VALID).unwrap();
        store.reload().unwrap();
        assert!(store.catalog().is_some());
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_missing_source_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path().join("absent.yml"), dir.path());
        assert_matches!(store.reload(), Err(LoadError::Missing(_)));
        assert!(store.last_error().unwrap().contains("Config file not found"));
    }

    #[test]
    fn test_snapshots_are_shared_not_copied() {
        let (_dir, store) = store_with(VALID);
        let installed = store.reload().unwrap();
        let read = store.catalog().unwrap();
        assert!(Arc::ptr_eq(&installed, &read));
    }
}
