//! Reading, validating and auditing the library file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use reelhouse_common::paths::is_confined;

use super::model::{Catalog, Collection, CollectionKind, LibraryFile};

/// Why a library file could not become a catalog.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Config file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid library config: {}", .violations.join("; "))]
    Schema { violations: Vec<String> },
}

/// Result of checking referenced files against the media root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAudit {
    pub checked: usize,
    /// Missing paths, relative to the media root.
    pub missing: Vec<String>,
}

/// Read and validate a library file.
///
/// When `media_root` is given every referenced file is looked up on disk.
/// Missing files are logged, never fatal: libraries are often only partly
/// populated and playback re-checks each file anyway.
pub fn load_catalog(source: &Path, media_root: Option<&Path>) -> Result<Catalog, LoadError> {
    let content = std::fs::read_to_string(source).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::Missing(source.to_path_buf()),
        _ => LoadError::Read {
            path: source.to_path_buf(),
            source: e,
        },
    })?;

    let library: LibraryFile = serde_yaml::from_str(&content).map_err(|e| LoadError::Parse {
        path: source.to_path_buf(),
        source: e,
    })?;

    let violations = validate_collections(&library.collections);
    if !violations.is_empty() {
        return Err(LoadError::Schema { violations });
    }

    let catalog = Catalog::new(library.collections);

    if let Some(root) = media_root {
        let audit = audit_files(&catalog, root);
        if audit.missing.is_empty() {
            tracing::info!(checked = audit.checked, "All referenced files exist");
        } else {
            tracing::warn!(
                missing = audit.missing.len(),
                checked = audit.checked,
                root = %root.display(),
                "Library references missing files"
            );
            for path in &audit.missing {
                tracing::warn!("  - {path}");
            }
        }
    }

    Ok(catalog)
}

/// Every schema rule the library must satisfy, as human-readable violations.
pub fn validate_collections(collections: &[Collection]) -> Vec<String> {
    let mut violations = Vec::new();
    let mut seen_ids = HashSet::new();

    for (i, collection) in collections.iter().enumerate() {
        let label = if collection.id.trim().is_empty() {
            violations.push(format!("collections[{i}]: id must not be empty"));
            format!("collections[{i}]")
        } else {
            if !seen_ids.insert(collection.id.as_str()) {
                violations.push(format!("collection '{}': duplicate id", collection.id));
            }
            format!("collection '{}'", collection.id)
        };

        check_path(&mut violations, &label, "path", Path::new(&collection.path));
        if let Some(poster) = &collection.poster {
            check_path(&mut violations, &label, "poster", Path::new(poster));
        }
        if let Some(backdrop) = &collection.backdrop {
            check_path(&mut violations, &label, "backdrop", Path::new(backdrop));
        }

        match &collection.kind {
            CollectionKind::Series { seasons } => {
                let mut season_numbers = HashSet::new();
                for season in seasons {
                    let season_label = format!("{label} season {}", season.number);
                    if season.number == 0 {
                        violations.push(format!("{season_label}: number must be positive"));
                    }
                    if !season_numbers.insert(season.number) {
                        violations.push(format!("{season_label}: duplicate season number"));
                    }
                    if let Some(poster) = &season.poster {
                        check_path(&mut violations, &season_label, "poster", Path::new(poster));
                    }

                    let mut episode_numbers = HashSet::new();
                    for episode in &season.episodes {
                        let episode_label = format!("{season_label} episode {}", episode.episode);
                        if episode.episode == 0 {
                            violations.push(format!("{episode_label}: number must be positive"));
                        }
                        if !episode_numbers.insert(episode.episode) {
                            violations.push(format!("{episode_label}: duplicate episode number"));
                        }
                        if episode.season != season.number {
                            violations.push(format!(
                                "{episode_label}: declares season {} but is listed under season {}",
                                episode.season, season.number
                            ));
                        }
                        if episode.filename.is_empty() {
                            violations.push(format!("{episode_label}: filename must not be empty"));
                        } else {
                            let file = collection.episode_path(season, episode);
                            check_path(&mut violations, &episode_label, "filename", &file);
                        }
                        if let Some(thumbnail) = &episode.thumbnail {
                            check_path(
                                &mut violations,
                                &episode_label,
                                "thumbnail",
                                Path::new(thumbnail),
                            );
                        }
                    }
                }
            }
            CollectionKind::Movie { filename } => {
                if filename.is_empty() {
                    violations.push(format!("{label}: filename must not be empty"));
                } else if let Some(file) = collection.movie_path() {
                    check_path(&mut violations, &label, "filename", &file);
                }
            }
        }
    }

    violations
}

fn check_path(violations: &mut Vec<String>, label: &str, field: &str, path: &Path) {
    if !is_confined(path) {
        violations.push(format!(
            "{label}: {field} '{}' must be relative and stay inside the media root",
            path.display()
        ));
    }
}

/// Look up every file the catalog references under `root`.
pub fn audit_files(catalog: &Catalog, root: &Path) -> FileAudit {
    let mut audit = FileAudit::default();
    let mut check = |relative: &Path| {
        audit.checked += 1;
        if !root.join(relative).exists() {
            audit.missing.push(relative.display().to_string());
        }
    };

    for collection in catalog.collections() {
        if let Some(poster) = &collection.poster {
            check(Path::new(poster));
        }
        if let Some(backdrop) = &collection.backdrop {
            check(Path::new(backdrop));
        }

        match &collection.kind {
            CollectionKind::Series { seasons } => {
                for season in seasons {
                    if let Some(poster) = &season.poster {
                        check(Path::new(poster));
                    }
                    for episode in &season.episodes {
                        check(&collection.episode_path(season, episode));
                        if let Some(thumbnail) = &episode.thumbnail {
                            check(Path::new(thumbnail));
                        }
                    }
                }
            }
            CollectionKind::Movie { .. } => {
                if let Some(file) = collection.movie_path() {
                    check(&file);
                }
            }
        }
    }

    audit
}
