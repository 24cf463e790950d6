//! Collection, season and episode types as they appear in the library file.

use std::collections::HashMap;
use std::path::PathBuf;

use reelhouse_common::MediaKind;
use serde::{Deserialize, Serialize};

/// Folder name for a season inside a series directory: `Season 01`, `Season 12`.
pub fn season_folder(number: u32) -> String {
    format!("Season {number:02}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub season: u32,
    pub episode: u32,
    /// Relative to the season folder.
    pub filename: String,
    /// Relative to the media root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Runtime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub number: u32,
    /// Kept in file order; that order drives previous/next navigation.
    #[serde(default)]
    pub episodes: Vec<Episode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl Season {
    /// Look up an episode by its number, never by position.
    pub fn find_episode(&self, number: u32) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.episode == number)
    }

    /// Episodes before and after `number` in file order.
    ///
    /// Returns `None` when the season has no such episode.
    pub fn neighbors(&self, number: u32) -> Option<(Option<&Episode>, Option<&Episode>)> {
        let index = self.episodes.iter().position(|e| e.episode == number)?;
        let previous = index.checked_sub(1).and_then(|i| self.episodes.get(i));
        let next = self.episodes.get(index + 1);
        Some((previous, next))
    }
}

/// Series/movie specific part of a collection, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CollectionKind {
    Series {
        #[serde(default)]
        seasons: Vec<Season>,
    },
    Movie {
        /// Relative to the collection path.
        filename: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub title: String,
    /// Directory relative to the media root holding this collection's files.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: CollectionKind,
}

impl Collection {
    pub fn media_kind(&self) -> MediaKind {
        match self.kind {
            CollectionKind::Series { .. } => MediaKind::Series,
            CollectionKind::Movie { .. } => MediaKind::Movie,
        }
    }

    /// Look up a season by number. Movies have no seasons.
    pub fn find_season(&self, number: u32) -> Option<&Season> {
        match &self.kind {
            CollectionKind::Series { seasons } => seasons.iter().find(|s| s.number == number),
            CollectionKind::Movie { .. } => None,
        }
    }

    /// Path of an episode file relative to the media root.
    pub fn episode_path(&self, season: &Season, episode: &Episode) -> PathBuf {
        PathBuf::from(&self.path)
            .join(season_folder(season.number))
            .join(&episode.filename)
    }

    /// Path of the movie file relative to the media root, `None` for series.
    pub fn movie_path(&self) -> Option<PathBuf> {
        match &self.kind {
            CollectionKind::Movie { filename } => Some(PathBuf::from(&self.path).join(filename)),
            CollectionKind::Series { .. } => None,
        }
    }

    pub fn summary(&self) -> CollectionSummary {
        CollectionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            kind: self.media_kind(),
            poster: self.poster.clone(),
            backdrop: self.backdrop.clone(),
        }
    }
}

/// The listing view of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<String>,
}

/// Top-level shape of the library YAML file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LibraryFile {
    pub collections: Vec<Collection>,
}

/// One immutable, fully validated snapshot of the library.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    collections: Vec<Collection>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from collections whose ids are already known unique.
    pub(crate) fn new(collections: Vec<Collection>) -> Self {
        let index = collections
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Self { collections, index }
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn find_collection(&self, id: &str) -> Option<&Collection> {
        self.index.get(id).map(|&i| &self.collections[i])
    }

    pub fn summaries(&self) -> Vec<CollectionSummary> {
        self.collections.iter().map(Collection::summary).collect()
    }

    /// Number of files the library references: artwork plus media files.
    pub fn file_count(&self) -> usize {
        self.collections
            .iter()
            .map(|c| {
                let artwork = usize::from(c.poster.is_some()) + usize::from(c.backdrop.is_some());
                let media = match &c.kind {
                    CollectionKind::Series { seasons } => seasons
                        .iter()
                        .map(|s| {
                            usize::from(s.poster.is_some())
                                + s.episodes
                                    .iter()
                                    .map(|e| 1 + usize::from(e.thumbnail.is_some()))
                                    .sum::<usize>()
                        })
                        .sum(),
                    CollectionKind::Movie { .. } => 1,
                };
                artwork + media
            })
            .sum()
    }
}
