//! Image assets (posters, backdrops, thumbnails) from the media root.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use reelhouse_common::{paths, Error};
use serde::Deserialize;
use tokio::fs::File;

use super::{AppContext, AppError};
use crate::streaming::{chunked_body, file_size};

/// Browsers may keep assets for a day.
const CACHE_CONTROL: &str = "public, max-age=86400";

pub fn asset_routes() -> Router<AppContext> {
    Router::new().route("/asset", get(serve_asset))
}

#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub path: Option<String>,
}

/// GET /api/asset?path=Shows/Firefly/poster.jpg
async fn serve_asset(
    State(ctx): State<AppContext>,
    Query(query): Query<AssetQuery>,
) -> Result<Response, AppError> {
    let relative = query
        .path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::validation("Missing required parameter: path"))?;

    let path = paths::resolve(ctx.media_root(), relative).map_err(|denied| {
        tracing::warn!(path = relative, "Refusing asset outside media root");
        Error::from(denied)
    })?;

    let size = file_size(&path).await?;

    let content_type = paths::image_content_type(&path).ok_or_else(|| {
        Error::validation(format!("Unsupported asset type: {}", path.display()))
    })?;

    let file = File::open(&path)
        .await
        .map_err(|_| Error::not_found("asset", relative))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .body(chunked_body(file))
        .map_err(|e| AppError::new(Error::Internal(format!("Failed to build response: {e}"))))
}
