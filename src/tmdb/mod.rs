//! Metadata catalog (TMDB): structured genres, credits, images, discovery and
//! recommendations. Only the fields the tools read are modelled.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

mod client;

pub use client::{normalize, TmdbClient};

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn search_movies(
        &self,
        query: &str,
        year: Option<i32>,
        page: Option<u32>,
    ) -> Result<Paged<MovieSummary>>;
    async fn search_tv(
        &self,
        query: &str,
        year: Option<i32>,
        page: Option<u32>,
    ) -> Result<Paged<TvSummary>>;
    async fn search_person(&self, query: &str, page: Option<u32>) -> Result<Paged<PersonSummary>>;
    async fn multi_search(&self, query: &str, page: Option<u32>) -> Result<Paged<MediaItem>>;
    async fn movie_details(&self, id: u64) -> Result<MovieDetails>;
    /// First movie result of an external-id lookup, `None` if the catalog has no match.
    async fn find_by_imdb(&self, imdb_id: &str) -> Result<Option<MovieSummary>>;
    async fn movie_credits(&self, id: u64) -> Result<Credits>;
    async fn watch_providers(&self, id: u64) -> Result<WatchProviders>;
    async fn discover_movies(&self, filters: &DiscoverMovies) -> Result<Paged<MovieSummary>>;
    async fn discover_tv(&self, filters: &DiscoverTv) -> Result<Paged<TvSummary>>;
    async fn trending(
        &self,
        media: TrendingMedia,
        window: TimeWindow,
        page: Option<u32>,
    ) -> Result<Paged<MediaItem>>;
    async fn movie_recommendations(&self, id: u64, page: Option<u32>)
        -> Result<Paged<MovieSummary>>;
    async fn similar_movies(&self, id: u64, page: Option<u32>) -> Result<Paged<MovieSummary>>;
    async fn tv_details(&self, id: u64) -> Result<TvDetails>;
    async fn tv_recommendations(&self, id: u64, page: Option<u32>) -> Result<Paged<TvSummary>>;
    async fn similar_tv(&self, id: u64, page: Option<u32>) -> Result<Paged<TvSummary>>;
    async fn collection(&self, id: u64) -> Result<Collection>;
    async fn person_details(&self, id: u64) -> Result<PersonDetails>;
    async fn person_movie_credits(&self, id: u64) -> Result<PersonMovieCredits>;
    async fn reviews(&self, kind: MediaKind, id: u64, page: Option<u32>) -> Result<Paged<Review>>;
    async fn videos(&self, kind: MediaKind, id: u64) -> Result<Vec<Video>>;
    async fn now_playing(&self, region: &str, page: Option<u32>) -> Result<Paged<MovieSummary>>;
    async fn airing_today(&self, page: Option<u32>) -> Result<Paged<TvSummary>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendingMedia {
    Movie,
    Tv,
    #[default]
    All,
}

impl TrendingMedia {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingMedia::Movie => "movie",
            TrendingMedia::Tv => "tv",
            TrendingMedia::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// Filters for `discover/movie`; unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverMovies {
    pub page: Option<u32>,
    pub sort_by: Option<String>,
    pub primary_release_year: Option<i32>,
    pub with_genres: Option<String>,
    pub with_people: Option<String>,
    pub vote_average_gte: Option<f64>,
    pub vote_count_gte: Option<u32>,
    pub with_original_language: Option<String>,
}

impl DiscoverMovies {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        push(&mut q, "page", self.page);
        push(&mut q, "sort_by", self.sort_by.as_ref());
        push(&mut q, "primary_release_year", self.primary_release_year);
        push(&mut q, "with_genres", self.with_genres.as_ref());
        push(&mut q, "with_people", self.with_people.as_ref());
        push(&mut q, "vote_average.gte", self.vote_average_gte);
        push(&mut q, "vote_count.gte", self.vote_count_gte);
        push(&mut q, "with_original_language", self.with_original_language.as_ref());
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverTv {
    pub page: Option<u32>,
    pub sort_by: Option<String>,
    pub first_air_date_year: Option<i32>,
    pub with_genres: Option<String>,
    pub vote_average_gte: Option<f64>,
    pub vote_count_gte: Option<u32>,
    pub with_original_language: Option<String>,
}

impl DiscoverTv {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        push(&mut q, "page", self.page);
        push(&mut q, "sort_by", self.sort_by.as_ref());
        push(&mut q, "first_air_date_year", self.first_air_date_year);
        push(&mut q, "with_genres", self.with_genres.as_ref());
        push(&mut q, "vote_average.gte", self.vote_average_gte);
        push(&mut q, "vote_count.gte", self.vote_count_gte);
        push(&mut q, "with_original_language", self.with_original_language.as_ref());
        q
    }
}

fn push<T: ToString>(q: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<T>) {
    if let Some(v) = value {
        q.push((key, v.to_string()));
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TvSummary {
    pub id: u64,
    pub name: String,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KnownFor {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonSummary {
    pub id: u64,
    pub name: String,
    pub known_for_department: Option<String>,
    pub profile_path: Option<String>,
    pub known_for: Vec<KnownFor>,
}

/// A row of a mixed-type listing (multi search, trending). `media_type` is
/// `movie`, `tv` or `person`; only the fields of that kind are populated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaItem {
    pub id: u64,
    pub media_type: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub profile_path: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub known_for_department: Option<String>,
    pub known_for: Vec<KnownFor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Company {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovieDetails {
    pub id: u64,
    pub imdb_id: Option<String>,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub budget: u64,
    pub revenue: u64,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub genres: Vec<Genre>,
    pub production_companies: Vec<Company>,
    pub status: Option<String>,
    pub belongs_to_collection: Option<CollectionRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: String,
    pub department: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchProvider {
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchRegion {
    pub link: Option<String>,
    pub flatrate: Vec<WatchProvider>,
    pub rent: Vec<WatchProvider>,
    pub buy: Vec<WatchProvider>,
    pub free: Vec<WatchProvider>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchProviders {
    pub results: BTreeMap<String, WatchRegion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TvDetails {
    pub id: u64,
    pub name: String,
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Collection {
    pub id: u64,
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub parts: Vec<MovieSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonDetails {
    pub id: u64,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
    pub imdb_id: Option<String>,
    pub known_for_department: Option<String>,
}

/// One movie a person is credited on, either as cast (`character`) or crew (`job`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonCredit {
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub character: Option<String>,
    pub job: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonMovieCredits {
    pub cast: Vec<PersonCredit>,
    pub crew: Vec<PersonCredit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthorDetails {
    pub username: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: String,
    pub author: String,
    pub author_details: AuthorDetails,
    pub content: String,
    pub created_at: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    pub size: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub official: bool,
    pub published_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_query_skips_unset_filters() {
        let filters = DiscoverMovies {
            primary_release_year: Some(1999),
            with_genres: Some("878".to_string()),
            vote_average_gte: Some(7.5),
            vote_count_gte: Some(50),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("primary_release_year", "1999".to_string()),
                ("with_genres", "878".to_string()),
                ("vote_average.gte", "7.5".to_string()),
                ("vote_count.gte", "50".to_string()),
            ]
        );
    }

    #[test]
    fn discover_tv_uses_first_air_date_year() {
        let filters = DiscoverTv {
            first_air_date_year: Some(2008),
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("page", "2".to_string()),
                ("first_air_date_year", "2008".to_string()),
            ]
        );
    }

    #[test]
    fn movie_details_tolerates_nulls() {
        let details: MovieDetails = serde_json::from_value(serde_json::json!({
            "id": 603,
            "title": "The Matrix",
            "imdb_id": null,
            "runtime": null,
            "poster_path": null,
            "belongs_to_collection": null,
            "genres": [{ "id": 28, "name": "Action" }]
        }))
        .expect("details");
        assert_eq!(details.id, 603);
        assert!(details.imdb_id.is_none());
        assert_eq!(details.genres[0].name, "Action");
        assert_eq!(details.budget, 0);
    }
}
