use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::movies::{check_min_rating, vote_floor};
use super::{check_page, Catalogs};
use crate::error::Result;
use crate::format::{cap_total_pages, date_or_na, extract_year, image_url, truncate_text};
use crate::format::{ImageSize, TvResult, OVERVIEW_CAP};
use crate::genres::{require_genre_id, TV_GENRES};
use crate::resolve::{resolve_series, SeriesLookup};
use crate::tmdb::{DiscoverTv, Paged, TvSummary};

fn tv_results(page: &Paged<TvSummary>) -> Vec<TvResult> {
    page.results.iter().map(|s| TvResult::new(s, true)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum TvSort {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "popularity.asc")]
    PopularityAsc,
    #[serde(rename = "first_air_date.desc")]
    FirstAirDateDesc,
    #[serde(rename = "first_air_date.asc")]
    FirstAirDateAsc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "vote_average.asc")]
    VoteAverageAsc,
}

impl TvSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            TvSort::PopularityDesc => "popularity.desc",
            TvSort::PopularityAsc => "popularity.asc",
            TvSort::FirstAirDateDesc => "first_air_date.desc",
            TvSort::FirstAirDateAsc => "first_air_date.asc",
            TvSort::VoteAverageDesc => "vote_average.desc",
            TvSort::VoteAverageAsc => "vote_average.asc",
        }
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverTvInput {
    #[schemars(description = "Filter by first air date year (e.g., 2023)")]
    pub year: Option<i32>,
    #[schemars(description = "Genre name (e.g., 'drama', 'comedy', 'sci-fi', 'crime', 'documentary')")]
    pub genre: Option<String>,
    #[schemars(description = "Minimum TMDB rating (0-10)")]
    pub min_rating: Option<f64>,
    #[schemars(description = "Original language code (e.g., 'en', 'ko', 'ja', 'es')")]
    pub language: Option<String>,
    #[schemars(description = "Sort order (default: popularity.desc)")]
    pub sort_by: Option<TvSort>,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub async fn discover_tv(catalogs: &Catalogs, input: DiscoverTvInput) -> Result<Value> {
    check_page(input.page)?;
    check_min_rating(input.min_rating)?;
    let genre_id = input
        .genre
        .as_deref()
        .map(|g| require_genre_id(g, TV_GENRES))
        .transpose()?;

    let filters = DiscoverTv {
        page: input.page,
        sort_by: input.sort_by.map(|s| s.as_str().to_string()),
        first_air_date_year: input.year,
        with_genres: genre_id.map(|id| id.to_string()),
        vote_average_gte: input.min_rating,
        vote_count_gte: vote_floor(input.min_rating),
        with_original_language: input.language.clone(),
    };
    let result = catalogs.tmdb.discover_tv(&filters).await?;

    Ok(json!({
        "results": tv_results(&result),
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
        "filters": {
            "year": input.year,
            "genre": input.genre,
            "minRating": input.min_rating,
            "language": input.language,
            "sortBy": input.sort_by.unwrap_or_default(),
        },
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TvRecommendationsInput {
    #[schemars(description = "TMDB TV series ID")]
    pub tmdb_id: Option<u64>,
    #[schemars(description = "TV series title to get recommendations for")]
    pub title: Option<String>,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub async fn get_tv_recommendations(
    catalogs: &Catalogs,
    input: TvRecommendationsInput,
) -> Result<Value> {
    check_page(input.page)?;
    let lookup = SeriesLookup {
        tmdb_id: input.tmdb_id,
        title: input.title,
        year: None,
    };
    let show = resolve_series(catalogs.tmdb.as_ref(), &lookup).await?;
    let result = catalogs.tmdb.tv_recommendations(show.tmdb_id, input.page).await?;

    let recommendations: Vec<Value> = result
        .results
        .iter()
        .map(|s| {
            let date = s.first_air_date.as_deref();
            json!({
                "tmdbId": s.id,
                "title": s.name,
                "originalTitle": s.original_name,
                "year": extract_year(date),
                "firstAirDate": date_or_na(date),
                "overview": truncate_text(s.overview.as_deref().unwrap_or_default(), OVERVIEW_CAP),
                "tmdbRating": s.vote_average,
                "voteCount": s.vote_count,
                "posterUrl": image_url(s.poster_path.as_deref(), ImageSize::W342),
            })
        })
        .collect();

    Ok(json!({
        "sourceShow": {
            "tmdbId": show.tmdb_id,
            "title": show.name,
        },
        "recommendations": recommendations,
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AiringTodayInput {
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub async fn get_airing_today(catalogs: &Catalogs, input: AiringTodayInput) -> Result<Value> {
    check_page(input.page)?;
    let result = catalogs.tmdb.airing_today(input.page).await?;
    Ok(json!({
        "results": tv_results(&result),
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
    }))
}
