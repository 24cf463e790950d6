//! Direct streaming with HTTP range requests.
//!
//! Serves media files straight from disk. Bodies are read in bounded chunks
//! as the client consumes them; when the client goes away the body stream is
//! dropped and the file handle with it.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use reelhouse_common::{paths, Error, Result};
use serde::Deserialize;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::range::{parse_range, RangeSpec};
use crate::catalog::{Catalog, CollectionKind};
use crate::server::{AppContext, AppError};

/// Read size for streamed bodies.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Content type sent for every stream, whatever the container.
const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Query string of the stream endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub collection_id: Option<String>,
    pub season: Option<String>,
    pub ep: Option<String>,
}

/// What a stream request points at inside a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAddress {
    Episode { season: u32, episode: u32 },
    Movie,
}

impl StreamQuery {
    /// Split the query into a collection id and an address, rejecting
    /// incomplete or non-numeric input.
    pub fn address(&self) -> Result<(&str, MediaAddress)> {
        let collection_id = self
            .collection_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::validation("Missing required parameter: collectionId"))?;

        let address = match (self.season.as_deref(), self.ep.as_deref()) {
            (None, None) => MediaAddress::Movie,
            (Some(season), Some(ep)) => MediaAddress::Episode {
                season: parse_number("season", season)?,
                episode: parse_number("ep", ep)?,
            },
            _ => {
                return Err(Error::validation(
                    "season and ep must be given together",
                ))
            }
        };

        Ok((collection_id, address))
    }
}

fn parse_number(name: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("Invalid {name} number: {value}")))
}

/// Find the file behind an address, relative to the media root.
///
/// A series address on a movie (or the reverse) is reported as not found:
/// nothing exists at that address.
pub fn locate(catalog: &Catalog, collection_id: &str, address: MediaAddress) -> Result<PathBuf> {
    let collection = catalog
        .find_collection(collection_id)
        .ok_or_else(|| Error::not_found("collection", collection_id))?;

    match (address, &collection.kind) {
        (MediaAddress::Episode { season, episode }, CollectionKind::Series { .. }) => {
            let season_entry = collection
                .find_season(season)
                .ok_or_else(|| Error::not_found("season", format!("{collection_id}/{season}")))?;
            let episode_entry = season_entry.find_episode(episode).ok_or_else(|| {
                Error::not_found("episode", format!("{collection_id}/{season}/{episode}"))
            })?;
            Ok(collection.episode_path(season_entry, episode_entry))
        }
        (MediaAddress::Movie, CollectionKind::Movie { filename }) => {
            Ok(Path::new(&collection.path).join(filename))
        }
        (MediaAddress::Episode { season, episode }, CollectionKind::Movie { .. }) => {
            tracing::debug!(collection_id, "Episode requested from a movie");
            Err(Error::not_found(
                "episode",
                format!("{collection_id}/{season}/{episode}"),
            ))
        }
        (MediaAddress::Movie, CollectionKind::Series { .. }) => {
            tracing::debug!(collection_id, "Movie requested from a series");
            Err(Error::not_found("movie", collection_id))
        }
    }
}

/// GET /api/stream?collectionId=..&season=..&ep=..
pub async fn stream_media(
    State(ctx): State<AppContext>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> std::result::Result<Response, AppError> {
    let (collection_id, address) = query.address()?;

    // The snapshot is only needed to find the path; it is released before
    // any file I/O so a reload never waits on a transfer.
    let relative = {
        let catalog = ctx.catalog.require()?;
        locate(&catalog, collection_id, address)?
    };

    let file_path = paths::confine(ctx.media_root(), &relative).map_err(|denied| {
        tracing::warn!(path = %relative.display(), "Refusing to stream outside media root");
        Error::from(denied)
    })?;

    let range = headers.get(header::RANGE).and_then(|h| h.to_str().ok());
    Ok(serve_video(&file_path, range).await?)
}

/// Size of a regular file, or not-found when it is missing or not a file.
pub async fn file_size(path: &Path) -> Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|_| Error::not_found("file", path.display()))?;
    if !metadata.is_file() {
        return Err(Error::not_found("file", path.display()));
    }
    Ok(metadata.len())
}

/// Wrap a reader in a body that pulls [`CHUNK_SIZE`] bytes at a time.
pub fn chunked_body<R>(reader: R) -> Body
where
    R: AsyncRead + Send + 'static,
{
    Body::from_stream(ReaderStream::with_capacity(reader, CHUNK_SIZE))
}

/// Serve a video file, honouring a single-range `Range` header.
pub async fn serve_video(file_path: &Path, range_header: Option<&str>) -> Result<Response> {
    let file_size = file_size(file_path).await?;

    match parse_range(range_header, file_size) {
        RangeSpec::Partial { start, end } => {
            let length = end - start + 1;

            let mut file = File::open(file_path)
                .await
                .map_err(|_| Error::not_found("file", file_path.display()))?;

            file.seek(SeekFrom::Start(start)).await?;

            tracing::debug!(
                path = %file_path.display(),
                start,
                end,
                file_size,
                "Serving byte range"
            );

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, VIDEO_CONTENT_TYPE)
                .header(header::CONTENT_LENGTH, length.to_string())
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, file_size),
                )
                .header(header::ACCEPT_RANGES, "bytes")
                .body(chunked_body(file.take(length)))
                .map_err(|e| Error::Internal(format!("Failed to build response: {e}")))
        }
        RangeSpec::Full => {
            let file = File::open(file_path)
                .await
                .map_err(|_| Error::not_found("file", file_path.display()))?;

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, VIDEO_CONTENT_TYPE)
                .header(header::CONTENT_LENGTH, file_size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(chunked_body(file))
                .map_err(|e| Error::Internal(format!("Failed to build response: {e}")))
        }
        RangeSpec::Unsatisfiable => Response::builder()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{}", file_size))
            .header(header::ACCEPT_RANGES, "bytes")
            .body(Body::empty())
            .map_err(|e| Error::Internal(format!("Failed to build response: {e}"))),
    }
}
