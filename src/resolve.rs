//! Turns a caller-supplied mix of identifiers into one canonical reference into
//! the metadata catalog.
//!
//! Precedence is fixed: numeric catalog id, then external (IMDb) id via the
//! catalog's find endpoint, then a title search whose first hit is taken as-is.
//! Missing input fails before any network call is made.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::tmdb::{MediaKind, TmdbApi};

#[derive(Debug, Clone, Default)]
pub struct MovieLookup {
    pub tmdb_id: Option<u64>,
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MovieKey {
    TmdbId(u64),
    ImdbId(String),
    Title { title: String, year: Option<i32> },
}

impl MovieLookup {
    pub fn key(&self) -> Result<MovieKey> {
        if let Some(id) = self.tmdb_id {
            return Ok(MovieKey::TmdbId(id));
        }
        if let Some(imdb) = non_blank(self.imdb_id.as_deref()) {
            return Ok(MovieKey::ImdbId(imdb.to_string()));
        }
        if let Some(title) = non_blank(self.title.as_deref()) {
            return Ok(MovieKey::Title {
                title: title.to_string(),
                year: self.year,
            });
        }
        Err(at_least_one(&["tmdbId", "imdbId", "title"]))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeriesLookup {
    pub tmdb_id: Option<u64>,
    pub title: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesKey {
    TmdbId(u64),
    Title { title: String, year: Option<i32> },
}

impl SeriesLookup {
    pub fn key(&self) -> Result<SeriesKey> {
        if let Some(id) = self.tmdb_id {
            return Ok(SeriesKey::TmdbId(id));
        }
        if let Some(title) = non_blank(self.title.as_deref()) {
            return Ok(SeriesKey::Title {
                title: title.to_string(),
                year: self.year,
            });
        }
        Err(at_least_one(&["tmdbId", "title"]))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieReference {
    pub tmdb_id: u64,
    pub imdb_id: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesReference {
    pub tmdb_id: u64,
    pub name: String,
}

pub async fn resolve_movie(tmdb: &dyn TmdbApi, lookup: &MovieLookup) -> Result<MovieReference> {
    match lookup.key()? {
        MovieKey::TmdbId(id) => {
            let details = tmdb.movie_details(id).await?;
            Ok(MovieReference {
                tmdb_id: details.id,
                imdb_id: details.imdb_id,
                title: details.title,
            })
        }
        MovieKey::ImdbId(imdb) => {
            let hit = tmdb
                .find_by_imdb(&imdb)
                .await?
                .ok_or_else(|| Error::not_found(format!("Movie not found for IMDb ID: {imdb}")))?;
            debug!(imdb = %imdb, tmdb_id = hit.id, "Resolved movie via external id");
            Ok(MovieReference {
                tmdb_id: hit.id,
                imdb_id: Some(imdb),
                title: hit.title,
            })
        }
        MovieKey::Title { title, year } => {
            let page = tmdb.search_movies(&title, year, None).await?;
            let hit = page.results.into_iter().next().ok_or_else(|| {
                Error::not_found(format!("No movies found matching title: {title}"))
            })?;
            debug!(title = %title, tmdb_id = hit.id, "Resolved movie via title search");
            Ok(MovieReference {
                tmdb_id: hit.id,
                imdb_id: None,
                title: hit.title,
            })
        }
    }
}

pub async fn resolve_series(
    tmdb: &dyn TmdbApi,
    lookup: &SeriesLookup,
) -> Result<SeriesReference> {
    match lookup.key()? {
        SeriesKey::TmdbId(id) => {
            let details = tmdb.tv_details(id).await?;
            Ok(SeriesReference {
                tmdb_id: details.id,
                name: details.name,
            })
        }
        SeriesKey::Title { title, year } => {
            let page = tmdb.search_tv(&title, year, None).await?;
            let hit = page.results.into_iter().next().ok_or_else(|| {
                Error::not_found(format!("No TV series found matching title: {title}"))
            })?;
            debug!(title = %title, tmdb_id = hit.id, "Resolved series via title search");
            Ok(SeriesReference {
                tmdb_id: hit.id,
                name: hit.name,
            })
        }
    }
}

/// Picks between a movie id and a TV id; the movie id wins when both are given.
pub fn media_key(movie_id: Option<u64>, tv_id: Option<u64>) -> Result<(MediaKind, u64)> {
    match (movie_id, tv_id) {
        (Some(id), _) => Ok((MediaKind::Movie, id)),
        (None, Some(id)) => Ok((MediaKind::Tv, id)),
        (None, None) => Err(at_least_one(&["movieId", "tvId"])),
    }
}

pub fn at_least_one(fields: &[&str]) -> Error {
    let names = fields
        .iter()
        .map(|f| format!("'{f}'"))
        .collect::<Vec<_>>()
        .join(", ");
    Error::validation(format!("At least one of {names} must be provided"))
}

pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn numeric_id_takes_precedence() {
        let lookup = MovieLookup {
            tmdb_id: Some(603),
            imdb_id: Some("tt0133093".into()),
            title: Some("The Matrix".into()),
            year: Some(1999),
        };
        assert_eq!(lookup.key().unwrap(), MovieKey::TmdbId(603));
    }

    #[test]
    fn external_id_beats_title() {
        let lookup = MovieLookup {
            imdb_id: Some("tt0133093".into()),
            title: Some("The Matrix".into()),
            ..Default::default()
        };
        assert_eq!(lookup.key().unwrap(), MovieKey::ImdbId("tt0133093".into()));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let lookup = MovieLookup {
            imdb_id: Some("  ".into()),
            title: Some(" Heat ".into()),
            year: Some(1995),
            ..Default::default()
        };
        assert_eq!(
            lookup.key().unwrap(),
            MovieKey::Title {
                title: "Heat".into(),
                year: Some(1995)
            }
        );
    }

    #[test]
    fn empty_lookup_lists_accepted_fields() {
        let err = MovieLookup::default().key().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "At least one of 'tmdbId', 'imdbId', 'title' must be provided"
        );
        let err = SeriesLookup::default().key().unwrap_err();
        assert_eq!(
            err.to_string(),
            "At least one of 'tmdbId', 'title' must be provided"
        );
    }

    #[test]
    fn media_key_prefers_movie() {
        assert_eq!(media_key(Some(1), Some(2)).unwrap(), (MediaKind::Movie, 1));
        assert_eq!(media_key(None, Some(2)).unwrap(), (MediaKind::Tv, 2));
        assert!(media_key(None, None).is_err());
    }
}
