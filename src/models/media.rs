//! Catalog-facing view of stored objects.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

/// Coarse media classification derived from a filename extension.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Audio,
    Pdf,
    Image,
    Other,
}

/// Type filter accepted by the listing and search endpoints.
///
/// `other` is not selectable: clients may only ask for one of the three
/// named categories or for everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Only(MediaCategory),
}

impl TypeFilter {
    pub fn matches(&self, category: MediaCategory) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TypeFilter::All),
            "audio" => Ok(TypeFilter::Only(MediaCategory::Audio)),
            "pdf" => Ok(TypeFilter::Only(MediaCategory::Pdf)),
            "image" => Ok(TypeFilter::Only(MediaCategory::Image)),
            other => Err(format!("Invalid media type `{}`", other)),
        }
    }
}

/// One row of a catalog response.
///
/// `id` is the 1-based position of the object in the listing that produced
/// this response. It is not a stable identifier: the same object may get a
/// different id on the next call, so callers must reference media by `name`.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    pub id: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub category: MediaCategory,
    /// Relative path of this service's download-link endpoint for `name`.
    pub url: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}
