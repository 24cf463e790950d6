//! Reelhouse-Common: shared types and utilities.
//!
//! - **Error Handling**: the unified [`Error`] type and its HTTP status mapping
//! - **Path Confinement**: [`paths::resolve`] keeps every served file inside the media root
//! - **Core Types**: [`MediaKind`] for the series/movie distinction
//!
//! # Examples
//!
//! ```
//! use reelhouse_common::paths;
//! use std::path::Path;
//!
//! let root = Path::new("/media");
//! assert!(paths::resolve(root, "shows/poster.jpg").is_ok());
//! assert!(paths::resolve(root, "../etc/passwd").is_err());
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use paths::Denied;
pub use types::MediaKind;
