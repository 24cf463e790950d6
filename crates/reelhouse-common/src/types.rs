//! Core type definitions shared across reelhouse.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of library collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A multi-season show addressed by season and episode number.
    Series,
    /// A single feature addressed by collection alone.
    Movie,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series => write!(f, "series"),
            Self::Movie => write!(f, "movie"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_display() {
        assert_eq!(MediaKind::Series.to_string(), "series");
        assert_eq!(MediaKind::Movie.to_string(), "movie");
    }
}
