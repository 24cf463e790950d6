//! Media streaming module.
//!
//! Serves episode and movie files with HTTP range support so players can
//! seek without downloading the whole file.
//!
//! # Routes
//!
//! - `GET /stream?collectionId={id}&season={n}&ep={n}` - Episode of a series
//! - `GET /stream?collectionId={id}` - Movie

mod direct;
mod range;

pub use direct::{
    chunked_body, file_size, locate, serve_video, stream_media, MediaAddress, StreamQuery,
    CHUNK_SIZE,
};
pub use range::{parse_range, RangeSpec};

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Create the streaming router.
pub fn stream_router() -> Router<AppContext> {
    Router::new().route("/stream", get(stream_media))
}
