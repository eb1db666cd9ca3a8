//! The media server seam and a file-backed implementation of it.

use crate::error::{ErrorKind, Result};
use crate::models::{Collection, Item, Library};
use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::instrument;

/// Read-only access to a media server's libraries.
pub trait MediaServer {
    fn libraries(&self) -> Result<Vec<Library>>;
    fn collections(&self, library: &Library) -> Result<Vec<Collection>>;
    fn collection_items(&self, library: &Library, collection: &Collection) -> Result<Vec<Item>>;
    /// Every top-level item (movie, show or artist) of the library.
    fn items(&self, library: &Library) -> Result<Vec<Item>>;
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct CatalogCollection {
    #[serde(flatten)]
    collection: Collection,
    /// Keys of the items in the collection.
    #[serde(default)]
    children: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct CatalogLibrary {
    #[serde(flatten)]
    library: Library,
    #[serde(default)]
    collections: Vec<CatalogCollection>,
    #[serde(default)]
    items: Vec<Item>,
}

/// A [`MediaServer`] backed by an exported catalog file (YAML or JSON).
///
/// ```yaml
/// libraries:
///   - title: Movies
///     type: movie
///     collections:
///       - title: Alien Collection
///         children: [alien]
///     items:
///       - key: alien
///         title: Alien
///         year: 1979
///         type: movie
///         guids: ["tmdb://348"]
/// ```
///
/// Missing keys default to titles, and a collection's child count to the
/// number of its children.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CatalogSnapshot {
    libraries: Vec<CatalogLibrary>,
}
impl CatalogSnapshot {
    /// Failing to load the catalog is the equivalent of failing to connect.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let raise = || ErrorKind::Connect(path.display().to_string());
        let text = std::fs::read_to_string(path).or_raise(raise)?;
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let snapshot = match is_json {
            true => Self::from_json(&text).or_raise(raise)?,
            false => Self::from_yaml(&text).or_raise(raise)?,
        };
        tracing::info!(libraries = snapshot.libraries.len(), "Loaded catalog");
        Ok(snapshot)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let snapshot: Self =
            serde_yaml::from_str(text).or_raise(|| ErrorKind::Connect("malformed YAML catalog".into()))?;
        Ok(snapshot.normalized())
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(text).or_raise(|| ErrorKind::Connect("malformed JSON catalog".into()))?;
        Ok(snapshot.normalized())
    }

    fn normalized(mut self) -> Self {
        for library in &mut self.libraries {
            if library.library.key.is_empty() {
                library.library.key = library.library.title.clone();
            }
            for item in &mut library.items {
                if item.key.is_empty() {
                    item.key = item.display_title();
                }
            }
            for collection in &mut library.collections {
                if collection.collection.key.is_empty() {
                    collection.collection.key = collection.collection.title.clone();
                }
                if collection.collection.child_count == 0 {
                    collection.collection.child_count = collection.children.len();
                }
            }
        }
        self
    }

    fn library(&self, library: &Library) -> Result<&CatalogLibrary> {
        self.libraries
            .iter()
            .find(|l| l.library.key == library.key)
            .ok_or_raise(|| ErrorKind::Query(format!("library '{}' not in catalog", library.title)))
    }
}
impl MediaServer for CatalogSnapshot {
    fn libraries(&self) -> Result<Vec<Library>> {
        Ok(self.libraries.iter().map(|l| l.library.clone()).collect())
    }

    fn collections(&self, library: &Library) -> Result<Vec<Collection>> {
        Ok(self.library(library)?.collections.iter().map(|c| c.collection.clone()).collect())
    }

    fn collection_items(&self, library: &Library, collection: &Collection) -> Result<Vec<Item>> {
        let catalog = self.library(library)?;
        let entry = catalog
            .collections
            .iter()
            .find(|c| c.collection.key == collection.key)
            .ok_or_raise(|| ErrorKind::Query(format!("collection '{}' not in catalog", collection.title)))?;
        entry
            .children
            .iter()
            .map(|key| {
                catalog
                    .items
                    .iter()
                    .find(|item| &item.key == key)
                    .cloned()
                    .ok_or_raise(|| {
                        ErrorKind::Query(format!("collection '{}' refers to unknown item '{key}'", collection.title))
                    })
            })
            .collect()
    }

    fn items(&self, library: &Library) -> Result<Vec<Item>> {
        Ok(self.library(library)?.items.clone())
    }
}

/// Libraries to process: the configured ones by name, or every movie and show
/// library sorted by title.
pub fn select_libraries(server: &impl MediaServer, names: Option<&[String]>) -> Result<Vec<Library>> {
    let available = server.libraries()?;
    let Some(names) = names else {
        let mut discovered: Vec<Library> = available.into_iter().filter(|l| l.kind.is_discoverable()).collect();
        discovered.sort_by(|a, b| a.title.cmp(&b.title));
        return Ok(discovered);
    };
    names
        .iter()
        .map(|name| {
            available
                .iter()
                .find(|l| l.title == *name)
                .cloned()
                .ok_or_raise(|| ErrorKind::Query(format!("library '{name}' not found")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LibraryType;

    const CATALOG: &str = r#"
libraries:
  - title: TV Shows
    type: show
    items:
      - {title: The Expanse, year: 2015, type: show, seasons: [{index: 1, title: Season 1}]}
  - title: Photos
    type: photo
  - title: Movies
    type: movie
    collections:
      - title: Alien Collection
        labels: [Sci-Fi]
        children: [alien, aliens]
      - title: Empty
    items:
      - {key: alien, title: Alien, year: 1979, type: movie, guids: ["tmdb://348"]}
      - {key: aliens, title: Aliens, year: 1986, type: movie}
      - {title: Heat, year: 1995, type: movie}
"#;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::from_yaml(CATALOG).unwrap()
    }

    #[test]
    fn test_discovery_sorts_movie_and_show_libraries() {
        let libraries = select_libraries(&catalog(), None).unwrap();
        let titles: Vec<&str> = libraries.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["Movies", "TV Shows"]);
    }

    #[test]
    fn test_explicit_libraries() {
        let names = vec!["Photos".to_string()];
        let libraries = select_libraries(&catalog(), Some(names.as_slice())).unwrap();
        assert_eq!(libraries[0].kind, LibraryType::Photo);

        let names = vec!["Music".to_string()];
        let err = select_libraries(&catalog(), Some(names.as_slice())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Query(_)));
    }

    #[test]
    fn test_collection_items() {
        let catalog = catalog();
        let movies = select_libraries(&catalog, Some(&["Movies".to_string()][..])).unwrap().remove(0);
        let collections = catalog.collections(&movies).unwrap();
        assert_eq!(collections[0].child_count, 2);
        assert_eq!(collections[1].child_count, 0);
        let children = catalog.collection_items(&movies, &collections[0]).unwrap();
        let titles: Vec<&str> = children.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Alien", "Aliens"]);
    }

    #[test]
    fn test_missing_keys_default_to_titles() {
        let catalog = catalog();
        let movies = select_libraries(&catalog, Some(&["Movies".to_string()][..])).unwrap().remove(0);
        assert_eq!(movies.key, "Movies");
        let items = catalog.items(&movies).unwrap();
        assert_eq!(items[2].key, "Heat (1995)");
    }

    #[test]
    fn test_malformed_catalog_cannot_connect() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = CatalogSnapshot::load(&path).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Connect(_)));
    }
}
