//! Shared test harness for integration tests.
//!
//! [`TestHarness`] lays out a temporary media root and library file, loads
//! them into a [`CatalogStore`] and builds the router around it so tests can
//! drive requests in-process with `oneshot`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use http_body_util::BodyExt;
use reelhouse::catalog::CatalogStore;
use reelhouse::config::Config;
use reelhouse::server::{create_router, AppContext};
use tempfile::TempDir;
use tower::ServiceExt;

/// Library used by most tests: a one-season series and a movie.
pub const LIBRARY: &str = r#"
collections:
  - id: firefly
    title: Firefly
    type: series
    path: Shows/Firefly
    poster: Shows/Firefly/poster.jpg
    description: Space western.
    seasons:
      - number: 1
        episodes:
          - id: ff-s1e1
            title: Serenity
            season: 1
            episode: 1
            filename: e01.mp4
            duration: 5160.5
          - id: ff-s1e2
            title: The Train Job
            season: 1
            episode: 2
            filename: e02.mkv
          - id: ff-s1e3
            title: Bushwhacked
            season: 1
            episode: 3
            filename: e03.mp4
  - id: serenity
    title: Serenity
    type: movie
    path: Movies/Serenity
    filename: serenity.mp4
    backdrop: Movies/Serenity/backdrop.webp
"#;

/// Deterministic content so byte ranges can be checked exactly.
pub fn video_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub struct TestHarness {
    pub dir: TempDir,
    pub store: Arc<CatalogStore>,
    pub config: Config,
}

impl TestHarness {
    /// Media root with the default library and its files in place, loaded.
    pub fn new() -> Self {
        let harness = Self::unloaded(LIBRARY);
        harness.write_media("Shows/Firefly/Season 01/e01.mp4", &video_bytes(1000));
        harness.write_media("Shows/Firefly/Season 01/e02.mkv", &video_bytes(2048));
        harness.write_media("Shows/Firefly/poster.jpg", b"\xff\xd8\xff\xe0fake-jpeg");
        harness.write_media("Movies/Serenity/serenity.mp4", &video_bytes(4096));
        harness.write_media("Movies/Serenity/backdrop.webp", b"RIFFfake-webp");
        harness
            .store
            .reload()
            .expect("test library should load");
        harness
    }

    /// Media root and library file written, nothing loaded yet.
    pub fn unloaded(library: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let media_root = dir.path().join("media");
        std::fs::create_dir_all(&media_root).unwrap();

        let library_path = dir.path().join("library.yml");
        std::fs::write(&library_path, library).unwrap();

        let mut config = Config::default();
        config.media.root = media_root;
        config.media.library_config = library_path;
        config.media.verify_files = false;

        let store = Arc::new(CatalogStore::from_config(&config.media));

        Self { dir, store, config }
    }

    pub fn media_root(&self) -> &Path {
        &self.config.media.root
    }

    pub fn library_path(&self) -> &Path {
        &self.config.media.library_config
    }

    /// Write a file below the media root, creating parent directories.
    pub fn write_media(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.media_root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn write_library(&self, content: &str) {
        std::fs::write(self.library_path(), content).unwrap();
    }

    pub fn context(&self) -> AppContext {
        AppContext::new(self.config.clone(), self.store.clone())
    }

    pub fn router(&self) -> Router {
        create_router(self.context(), None)
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_range(&self, uri: &str, range: &str) -> Response<Body> {
        self.request(
            Request::get(uri)
                .header("range", range)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}
