//! Library file watcher.
//!
//! Watches the directory holding the library file and reloads the catalog
//! after the file settles. The parent directory is watched rather than the
//! file itself so editors that save by writing a new file and renaming it
//! over the old one are still picked up.

use crate::catalog::CatalogStore;
use crate::config::WatchConfig;
use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{
    new_debouncer, DebounceEventResult, DebouncedEvent, DebouncedEventKind, Debouncer,
};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Reloads a [`CatalogStore`] whenever its library file changes.
pub struct ConfigWatcher {
    config: WatchConfig,
    store: Arc<CatalogStore>,
    debouncer: Option<Debouncer<RecommendedWatcher>>,
    task: Option<JoinHandle<()>>,
}

impl ConfigWatcher {
    pub fn new(config: WatchConfig, store: Arc<CatalogStore>) -> Self {
        Self {
            config,
            store,
            debouncer: None,
            task: None,
        }
    }

    /// Start watching. The reload task runs until `cancel` fires or the
    /// watcher is stopped.
    pub fn start(&mut self, cancel: CancellationToken) -> Result<()> {
        if !self.config.enabled {
            tracing::info!("Library watcher is disabled");
            return Ok(());
        }

        let source = self.store.source().to_path_buf();
        let (dir, watched_name) = split_source(&source)?;

        // A full channel already has a reload queued, so extra events are dropped.
        let (reload_tx, mut reload_rx) = mpsc::channel::<()>(1);

        let mut debouncer = new_debouncer(self.config.debounce(), move |res: DebounceEventResult| {
            match res {
                Ok(events) => {
                    if touches_file(&events, &watched_name) {
                        let _ = reload_tx.try_send(());
                    }
                }
                Err(e) => tracing::warn!("Library watch error: {:?}", e),
            }
        })
        .context("Failed to create library watcher")?;

        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {:?}", dir))?;

        tracing::info!(
            path = %source.display(),
            debounce_ms = self.config.debounce_ms,
            "Watching library file"
        );

        let store = self.store.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = reload_rx.recv() => {
                        if event.is_none() {
                            break;
                        }
                        tracing::info!(path = %source.display(), "Library file changed, reloading");
                        let store = store.clone();
                        // Reload outcome is logged by the store.
                        if let Err(e) = tokio::task::spawn_blocking(move || store.reload()).await {
                            tracing::error!("Library reload task failed: {}", e);
                        }
                    }
                }
            }
            tracing::debug!("Library watcher task finished");
        });

        self.debouncer = Some(debouncer);
        self.task = Some(task);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop watching and wait for the reload task to finish.
    pub async fn stop(&mut self) {
        // Dropping the debouncer closes the channel, which ends the task.
        self.debouncer = None;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        tracing::info!("Library watcher stopped");
    }
}

/// Split the library path into the directory to watch and the name to filter on.
fn split_source(source: &Path) -> Result<(PathBuf, OsString)> {
    let file_name = source
        .file_name()
        .map(|n| n.to_os_string())
        .with_context(|| format!("Library path has no file name: {:?}", source))?;

    let dir = match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((dir, file_name))
}

/// Whether any settled event concerns the library file.
///
/// `AnyContinuous` is emitted while writes are still arriving and is followed
/// by an `Any` once they stop, so only the latter triggers a reload.
fn touches_file(events: &[DebouncedEvent], file_name: &OsStr) -> bool {
    events
        .iter()
        .any(|e| e.kind == DebouncedEventKind::Any && e.path.file_name() == Some(file_name))
}
