//! ThePosterDB search links for collections, items and seasons.

use crate::models::{Item, ItemType, Season};
use pmmgen_config::PosterDatabase;

/// What a search link is for.
#[derive(Clone, Copy, Debug)]
pub enum SearchTarget<'a> {
    Collection(&'a str),
    Item(&'a Item),
    Season(&'a Item, &'a Season),
}

/// Search URL for `target`.
///
/// The basic search only carries the title. The pro search adds a category,
/// an exact year filter for movies and shows, and any known TMDb, IMDb and
/// TVDB ids.
pub fn search_url(settings: &PosterDatabase, target: SearchTarget<'_>) -> String {
    let pro = settings.enable_pro;
    let mut params: Vec<(&str, String)> = Vec::new();
    match target {
        SearchTarget::Collection(title) => {
            params.push(("term", title.to_string()));
            if pro {
                params.push(("category", "Collections".into()));
            }
        },
        SearchTarget::Item(item) => {
            params.push(("term", item.title.clone()));
            if pro {
                let category = match item.kind {
                    ItemType::Movie => Some("Movies"),
                    ItemType::Show => Some("Shows"),
                    ItemType::Artist => None,
                };
                if let Some(category) = category {
                    params.push(("category", category.into()));
                    if let Some(year) = item.year {
                        params.push(("year_filter", "equals".into()));
                        params.push(("yone", year.to_string()));
                    }
                }
                for (provider, param) in [("tmdb", "tmdb_id"), ("imdb", "imdb_id"), ("tvdb", "tvdb_id")] {
                    if let Some(id) = item.guid(provider) {
                        params.push((param, id.to_string()));
                    }
                }
            }
        },
        SearchTarget::Season(show, season) => {
            let term = match pro {
                true => format!("{} {}", show.title, season.title),
                false => show.title.clone(),
            };
            params.push(("term", term));
            if pro {
                params.push(("category", "Shows".into()));
            }
        },
    }

    let base = match pro {
        true => settings.search_url_pro.trim(),
        false => settings.search_url.trim(),
    };
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}
