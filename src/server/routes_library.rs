//! Read-only catalog API routes.
//!
//! These routes expose the loaded library as JSON so a frontend can browse
//! collections, seasons and episodes before asking for a stream.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use reelhouse_common::Error;
use serde::Serialize;

use super::{AppContext, AppError};
use crate::catalog::{Catalog, Collection, CollectionSummary, Episode, Season};

/// Create library routes.
pub fn library_routes() -> Router<AppContext> {
    Router::new()
        .route("/library", get(get_library))
        .route("/collections", get(list_collections))
        .route("/collections/:collection_id", get(get_collection))
        .route(
            "/collections/:collection_id/seasons/:season",
            get(get_season),
        )
        .route(
            "/collections/:collection_id/seasons/:season/episodes/:episode",
            get(get_episode),
        )
}

// ============================================================================
// Response types
// ============================================================================

/// An episode together with its neighbours in the season.
#[derive(Debug, Serialize)]
pub struct EpisodeResponse {
    pub collection_id: String,
    #[serde(flatten)]
    pub episode: Episode,
    /// Number of the previous episode in the season, if any.
    pub previous: Option<u32>,
    /// Number of the next episode in the season, if any.
    pub next: Option<u32>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_library(State(ctx): State<AppContext>) -> Result<Response, AppError> {
    let catalog = ctx.catalog.require()?;
    Ok(Json(&*catalog).into_response())
}

async fn list_collections(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<CollectionSummary>>, AppError> {
    let catalog = ctx.catalog.require()?;
    Ok(Json(catalog.summaries()))
}

async fn get_collection(
    State(ctx): State<AppContext>,
    Path(collection_id): Path<String>,
) -> Result<Json<Collection>, AppError> {
    let catalog = ctx.catalog.require()?;
    Ok(Json(collection(&catalog, &collection_id)?.clone()))
}

async fn get_season(
    State(ctx): State<AppContext>,
    Path((collection_id, season)): Path<(String, String)>,
) -> Result<Json<Season>, AppError> {
    let number = parse_number("season", &season)?;
    let catalog = ctx.catalog.require()?;
    let collection = collection(&catalog, &collection_id)?;
    Ok(Json(season_of(collection, number)?.clone()))
}

async fn get_episode(
    State(ctx): State<AppContext>,
    Path((collection_id, season, episode)): Path<(String, String, String)>,
) -> Result<Json<EpisodeResponse>, AppError> {
    let season_number = parse_number("season", &season)?;
    let episode_number = parse_number("episode", &episode)?;

    let catalog = ctx.catalog.require()?;
    let collection = collection(&catalog, &collection_id)?;
    let season = season_of(collection, season_number)?;

    let episode = season.find_episode(episode_number).ok_or_else(|| {
        Error::not_found(
            "episode",
            format!("{collection_id}/{season_number}/{episode_number}"),
        )
    })?;
    let (previous, next) = season.neighbors(episode_number).unwrap_or((None, None));

    Ok(Json(EpisodeResponse {
        collection_id: collection.id.clone(),
        episode: episode.clone(),
        previous: previous.map(|e| e.episode),
        next: next.map(|e| e.episode),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn collection<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a Collection, Error> {
    catalog
        .find_collection(id)
        .ok_or_else(|| Error::not_found("collection", id))
}

fn season_of(collection: &Collection, number: u32) -> Result<&Season, Error> {
    collection
        .find_season(number)
        .ok_or_else(|| Error::not_found("season", format!("{}/{}", collection.id, number)))
}

fn parse_number(name: &str, value: &str) -> Result<u32, Error> {
    value
        .parse()
        .map_err(|_| Error::validation(format!("Invalid {name} number: {value}")))
}
