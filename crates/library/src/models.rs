//! Read-only views of media server objects.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Kind of content a library holds.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    #[display("movie")]
    Movie,
    #[display("show")]
    Show,
    #[display("artist")]
    Artist,
    #[display("photo")]
    Photo,
}
impl LibraryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Show => "show",
            Self::Artist => "artist",
            Self::Photo => "photo",
        }
    }

    /// Libraries processed when none are configured explicitly.
    pub fn is_discoverable(&self) -> bool {
        matches!(self, Self::Movie | Self::Show)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Library {
    #[serde(default)]
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: LibraryType,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Collection {
    #[serde(default)]
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub child_count: usize,
}

/// External identifier in `<provider>://<id>` form, e.g. `tmdb://348`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Guid(pub String);
impl Guid {
    pub fn provider(&self) -> Option<&str> {
        self.0.split_once("://").map(|(provider, _)| provider)
    }

    pub fn value(&self) -> Option<&str> {
        self.0.split_once("://").map(|(_, id)| id)
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[display("movie")]
    Movie,
    #[display("show")]
    Show,
    #[display("artist")]
    Artist,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Season {
    pub index: u32,
    #[serde(default)]
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Album {
    pub title: String,
    #[serde(default)]
    pub year: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub title: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

/// A movie, show or artist.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Item {
    #[serde(default)]
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(rename = "type")]
    pub kind: ItemType,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub guids: Vec<Guid>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}
impl Item {
    /// `Title (Year)`, unless there is no year or the title already contains it.
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) if !self.title.contains(&format!("({year})")) => format!("{} ({year})", self.title),
            _ => self.title.clone(),
        }
    }

    /// Id for `provider` (e.g. `tmdb`) among the item's guids.
    pub fn guid(&self, provider: &str) -> Option<&str> {
        self.guids.iter().find(|guid| guid.provider() == Some(provider)).and_then(Guid::value)
    }
}
