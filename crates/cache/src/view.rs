//! Merged views: the resolved attributes of one collection or metadata item,
//! flattened for template input.

use crate::entry::Entry;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Everything carried forward from an existing collection definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CollectionView {
    pub title: String,
    pub poster: Option<String>,
    pub labels: Vec<String>,
    pub movie: Vec<String>,
    pub show: Vec<String>,
    pub collection: Vec<String>,
    pub list: Vec<String>,
    pub trakt_list: Vec<String>,
    pub sort_prefix: Option<String>,
    pub sort_order: Option<String>,
    pub sort_separator: Option<String>,
}
impl CollectionView {
    /// `name` stands in for the title when there is no entry, or it has none.
    pub fn new(name: &str, entry: Option<&Entry>) -> Self {
        let Some(entry) = entry else {
            return Self { title: name.to_string(), ..Self::default() };
        };
        Self {
            title: entry.resolve_text("title").unwrap_or_else(|| name.to_string()),
            poster: entry.poster_url(),
            labels: entry.resolve_list("label"),
            movie: entry.resolve_list("movie"),
            show: entry.resolve_list("show"),
            collection: entry.resolve_list("collection"),
            list: entry.resolve_list("list"),
            trakt_list: entry.resolve_list("trakt_list"),
            sort_prefix: entry.resolve_text("sort_prefix"),
            sort_order: entry.resolve_text("sort_order"),
            sort_separator: entry.resolve_text("sort_separator"),
        }
    }
}

/// Everything carried forward from an existing metadata definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MetadataView {
    pub title: String,
    pub poster: Option<String>,
    pub labels: Vec<String>,
    pub seasons: SeasonPosters,
}
impl MetadataView {
    pub fn new(name: &str, entry: Option<&Entry>) -> Self {
        let Some(entry) = entry else {
            return Self { title: name.to_string(), ..Self::default() };
        };
        Self {
            title: entry.resolve_text("title").unwrap_or_else(|| name.to_string()),
            poster: entry.poster_url(),
            labels: entry.resolve_list("label"),
            seasons: SeasonPosters::from(entry),
        }
    }
}

/// Season number to poster URL, in document order.
///
/// Serializes as a mapping so templates can index it by season number.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeasonPosters(Vec<(String, String)>);
impl SeasonPosters {
    pub fn get(&self, season: &str) -> Option<&str> {
        self.0.iter().find(|(key, _)| key == season).map(|(_, url)| url.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, url)| (key.as_str(), url.as_str()))
    }
}
impl From<&Entry> for SeasonPosters {
    fn from(entry: &Entry) -> Self {
        Self(
            entry
                .seasons()
                .iter()
                .filter_map(|season| Some((season.key().to_string(), season.poster_url()?)))
                .collect(),
        )
    }
}
impl Serialize for SeasonPosters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (season, url) in &self.0 {
            map.serialize_entry(season, url)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> Entry {
        Entry::new("key", serde_yaml::from_str(text).unwrap()).unwrap()
    }

    #[test]
    fn test_collection_view() {
        let entry = entry(
            r#"
            template: {name: Movie, movie: '1, 2', sort_prefix: '!'}
            poster: https://example.com/p.jpg
            label: [Sci-Fi, Classics]
            trakt_list: https://trakt.tv/users/x/lists/y
            "#,
        );
        let view = CollectionView::new("Alien Collection", Some(&entry));
        assert_eq!(view.title, "Alien Collection");
        assert_eq!(view.poster.as_deref(), Some("https://example.com/p.jpg"));
        assert_eq!(view.labels, ["Sci-Fi", "Classics"]);
        assert_eq!(view.movie, ["1", "2"]);
        assert_eq!(view.trakt_list, ["https://trakt.tv/users/x/lists/y"]);
        assert_eq!(view.sort_prefix.as_deref(), Some("!"));
        assert!(view.sort_order.is_none());
        assert!(view.show.is_empty());
    }

    #[test]
    fn test_view_without_entry() {
        let view = MetadataView::new("Alien (1979)", None);
        assert_eq!(view.title, "Alien (1979)");
        assert!(view.poster.is_none());
        assert!(view.seasons.is_empty());
    }

    #[test]
    fn test_metadata_view_seasons() {
        let entry = entry("{title: The Expanse, seasons: {2: {url_poster: b}, 1: {poster: a}, 3: {title: x}}}");
        let view = MetadataView::new("Expanse", Some(&entry));
        assert_eq!(view.title, "The Expanse");
        assert_eq!(view.seasons.iter().collect::<Vec<_>>(), [("2", "b"), ("1", "a")]);
        let json = serde_json::to_string(&view.seasons).unwrap();
        assert_eq!(json, r#"{"2":"b","1":"a"}"#);
    }
}
