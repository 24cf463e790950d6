//! The media catalog.
//!
//! A library YAML file lists collections, each either a series (seasons of
//! episodes) or a single movie. [`load_catalog`] turns the file into a
//! validated [`Catalog`]; [`CatalogStore`] holds the current snapshot and swaps
//! it wholesale on reload.
//!
//! ```yaml
//! collections:
//!   - id: firefly
//!     title: Firefly
//!     type: series
//!     path: Shows/Firefly
//!     seasons:
//!       - number: 1
//!         episodes:
//!           - { id: ff-101, title: Serenity, season: 1, episode: 1, filename: e01.mp4 }
//!   - id: serenity
//!     title: Serenity
//!     type: movie
//!     path: Movies/Serenity
//!     filename: serenity.mp4
//! ```

mod loader;
mod model;
mod store;

pub use loader::{audit_files, load_catalog, validate_collections, FileAudit, LoadError};
pub use model::{
    season_folder, Catalog, Collection, CollectionKind, CollectionSummary, Episode, Season,
};
pub use store::{CatalogStore, StoreState};
