//! Ratings catalog (OMDb): aggregated ratings, plot text, awards and box office,
//! keyed by IMDb identifier.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::Result;

mod client;

pub use client::{normalize, OmdbClient};

/// Fixed page size of the ratings catalog's search endpoint.
pub const PAGE_SIZE: u32 = 10;

#[async_trait]
pub trait OmdbApi: Send + Sync {
    async fn search(
        &self,
        query: &str,
        kind: TitleKind,
        year: Option<&str>,
        page: Option<u32>,
    ) -> Result<SearchPage>;
    async fn by_id(&self, imdb_id: &str, plot: PlotLength) -> Result<TitleRecord>;
    async fn by_title(
        &self,
        title: &str,
        kind: Option<TitleKind>,
        year: Option<&str>,
        plot: PlotLength,
    ) -> Result<TitleRecord>;
    async fn episode(&self, series_id: &str, season: u32, episode: u32) -> Result<TitleRecord>;
    async fn season(&self, series_id: &str, season: u32) -> Result<SeasonRecord>;
}

/// The catalog's `Type` field. Unrecognised values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleKind {
    Movie,
    Series,
    Episode,
    Other(String),
}

impl Default for TitleKind {
    fn default() -> Self {
        TitleKind::Other(String::new())
    }
}

impl TitleKind {
    pub fn as_str(&self) -> &str {
        match self {
            TitleKind::Movie => "movie",
            TitleKind::Series => "series",
            TitleKind::Episode => "episode",
            TitleKind::Other(raw) => raw,
        }
    }
}

impl From<&str> for TitleKind {
    fn from(raw: &str) -> Self {
        match raw {
            "movie" => TitleKind::Movie,
            "series" => TitleKind::Series,
            "episode" => TitleKind::Episode,
            other => TitleKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TitleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleKind::Other(raw) if raw.is_empty() => f.write_str("unknown type"),
            kind => f.write_str(kind.as_str()),
        }
    }
}

impl Serialize for TitleKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TitleKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TitleKind::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlotLength {
    #[default]
    Short,
    Full,
}

impl PlotLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotLength::Short => "short",
            PlotLength::Full => "full",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub kind: TitleKind,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(rename = "Search", default)]
    pub results: Vec<SearchHit>,
    #[serde(rename = "totalResults", default)]
    pub total_results: String,
}

impl SearchPage {
    pub fn total_results(&self) -> u32 {
        self.total_results.trim().parse().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename(deserialize = "Source", serialize = "source"))]
    pub source: String,
    #[serde(rename(deserialize = "Value", serialize = "value"))]
    pub value: String,
}

/// One movie, series or episode as the ratings catalog describes it.
/// Fields the catalog omits for a given kind stay empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TitleRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Rated")]
    pub rated: String,
    #[serde(rename = "Released")]
    pub released: String,
    #[serde(rename = "Runtime")]
    pub runtime: String,
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Director")]
    pub director: String,
    #[serde(rename = "Writer")]
    pub writer: String,
    #[serde(rename = "Actors")]
    pub actors: String,
    #[serde(rename = "Plot")]
    pub plot: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Awards")]
    pub awards: String,
    #[serde(rename = "Poster")]
    pub poster: String,
    #[serde(rename = "Ratings")]
    pub ratings: Vec<Rating>,
    #[serde(rename = "Metascore")]
    pub metascore: String,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: String,
    #[serde(rename = "imdbVotes")]
    pub imdb_votes: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub kind: TitleKind,
    #[serde(rename = "BoxOffice")]
    pub box_office: Option<String>,
    #[serde(rename = "totalSeasons")]
    pub total_seasons: Option<String>,
    #[serde(rename = "Season")]
    pub season: Option<String>,
    #[serde(rename = "Episode")]
    pub episode: Option<String>,
    #[serde(rename = "seriesID")]
    pub series_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonEpisode {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "Episode", default)]
    pub episode: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonRecord {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Season", default)]
    pub season: String,
    #[serde(rename = "totalSeasons", default)]
    pub total_seasons: String,
    #[serde(rename = "Episodes", default)]
    pub episodes: Vec<SeasonEpisode>,
}
