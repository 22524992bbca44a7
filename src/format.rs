//! Projection of raw catalog records into the flat, bounded shapes the tools return.

use serde::Serialize;

use crate::omdb::SeasonEpisode;
use crate::tmdb::{MovieSummary, TvSummary, IMAGE_BASE};

pub const OVERVIEW_CAP: usize = 200;
pub const BIOGRAPHY_CAP: usize = 500;
pub const REVIEW_CAP: usize = 1000;
/// The metadata catalog refuses to serve pages past this one.
pub const MAX_TOTAL_PAGES: u32 = 500;

const ELLIPSIS: &str = "...";
const NOT_AVAILABLE: &str = "N/A";

/// Cuts `text` to `max` characters (not bytes) and appends an ellipsis when it was longer.
pub fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}{ELLIPSIS}", &text[..idx]),
        None => text.to_string(),
    }
}

pub fn extract_year(date: Option<&str>) -> String {
    date.and_then(|d| d.split('-').next())
        .filter(|y| !y.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

pub fn date_or_na(date: Option<&str>) -> String {
    date.filter(|d| !d.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

pub fn cap_total_pages(total: u32) -> u32 {
    total.min(MAX_TOTAL_PAGES)
}

pub fn total_pages(total_results: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_results.div_ceil(page_size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// Provider logos.
    W92,
    /// Person profiles and filmography thumbnails.
    W185,
    /// List posters.
    W342,
    /// Detail posters.
    W500,
    /// Backdrops.
    W1280,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W92 => "w92",
            ImageSize::W185 => "w185",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W1280 => "w1280",
        }
    }
}

pub fn image_url(path: Option<&str>, size: ImageSize) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE}/{}{p}", size.as_str()))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResult {
    pub tmdb_id: u64,
    pub title: String,
    pub year: String,
    pub release_date: String,
    pub overview: String,
    pub tmdb_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
    pub poster_url: Option<String>,
}

impl MovieResult {
    pub fn new(movie: &MovieSummary, include_vote_count: bool) -> Self {
        let date = movie.release_date.as_deref();
        Self {
            tmdb_id: movie.id,
            title: movie.title.clone(),
            year: extract_year(date),
            release_date: date_or_na(date),
            overview: truncate_text(movie.overview.as_deref().unwrap_or_default(), OVERVIEW_CAP),
            tmdb_rating: movie.vote_average,
            vote_count: include_vote_count.then_some(movie.vote_count),
            poster_url: image_url(movie.poster_path.as_deref(), ImageSize::W342),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TvResult {
    pub tmdb_id: u64,
    pub name: String,
    pub year: String,
    pub first_air_date: String,
    pub overview: String,
    pub tmdb_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
    pub poster_url: Option<String>,
}

impl TvResult {
    pub fn new(show: &TvSummary, include_vote_count: bool) -> Self {
        let date = show.first_air_date.as_deref();
        Self {
            tmdb_id: show.id,
            name: show.name.clone(),
            year: extract_year(date),
            first_air_date: date_or_na(date),
            overview: truncate_text(show.overview.as_deref().unwrap_or_default(), OVERVIEW_CAP),
            tmdb_rating: show.vote_average,
            vote_count: include_vote_count.then_some(show.vote_count),
            poster_url: image_url(show.poster_path.as_deref(), ImageSize::W342),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSummary {
    pub title: String,
    pub episode: String,
    pub released: String,
    pub imdb_rating: String,
    pub imdb_id: String,
}

impl From<&SeasonEpisode> for EpisodeSummary {
    fn from(ep: &SeasonEpisode) -> Self {
        Self {
            title: ep.title.clone(),
            episode: ep.episode.clone(),
            released: ep.released.clone(),
            imdb_rating: ep.imdb_rating.clone(),
            imdb_id: ep.imdb_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_text_alone() {
        let text = "a".repeat(OVERVIEW_CAP);
        assert_eq!(truncate_text(&text, OVERVIEW_CAP), text);
        assert_eq!(truncate_text("", OVERVIEW_CAP), "");
    }

    #[test]
    fn truncate_cuts_to_cap_plus_ellipsis() {
        let text = "b".repeat(OVERVIEW_CAP + 1);
        let out = truncate_text(&text, OVERVIEW_CAP);
        assert_eq!(out.chars().count(), OVERVIEW_CAP + ELLIPSIS.len());
        assert!(out.starts_with(&"b".repeat(OVERVIEW_CAP)));
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(truncate_text(&text, 4), "éééé...");
    }

    #[test]
    fn year_extraction() {
        assert_eq!(extract_year(None), "N/A");
        assert_eq!(extract_year(Some("")), "N/A");
        assert_eq!(extract_year(Some("1994-09-23")), "1994");
    }

    #[test]
    fn pagination_cap() {
        assert_eq!(cap_total_pages(10_000), 500);
        assert_eq!(cap_total_pages(3), 3);
        assert_eq!(total_pages(57, 10), 6);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn image_urls_are_null_safe() {
        assert_eq!(image_url(None, ImageSize::W342), None);
        assert_eq!(image_url(Some(""), ImageSize::W342), None);
        assert_eq!(
            image_url(Some("/abc.jpg"), ImageSize::W1280).as_deref(),
            Some("https://image.tmdb.org/t/p/w1280/abc.jpg")
        );
    }

    #[test]
    fn movie_result_formats_missing_date_and_long_overview() {
        let movie = MovieSummary {
            id: 1,
            title: "Untitled".to_string(),
            overview: Some("x".repeat(300)),
            poster_path: Some("/p.jpg".to_string()),
            vote_average: 6.5,
            vote_count: 12,
            ..Default::default()
        };
        let out = MovieResult::new(&movie, false);
        assert_eq!(out.year, "N/A");
        assert_eq!(out.release_date, "N/A");
        assert_eq!(out.overview.len(), 203);
        assert_eq!(out.vote_count, None);
        assert_eq!(
            out.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w342/p.jpg")
        );
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("voteCount").is_none());
        assert_eq!(json["tmdbId"], 1);
    }
}
