//! Tools that work across movies and TV: mixed-type listings and the
//! per-title extras (similar titles, reviews, videos).

use chrono::{DateTime, FixedOffset};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{check_page, Catalogs};
use crate::error::Result;
use crate::format::{cap_total_pages, date_or_na, extract_year, image_url, truncate_text};
use crate::format::{ImageSize, MovieResult, TvResult, OVERVIEW_CAP, REVIEW_CAP};
use crate::resolve::media_key;
use crate::tmdb::{MediaItem, MediaKind, Review, TimeWindow, TrendingMedia, Video};

const KNOWN_FOR_SHOWN: usize = 3;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct MultiSearchInput {
    #[schemars(description = "Search query (movie title, TV show name, or person name)")]
    pub query: String,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

fn known_for_titles(item: &MediaItem) -> Vec<String> {
    item.known_for
        .iter()
        .take(KNOWN_FOR_SHOWN)
        .filter_map(|k| k.title.clone().or_else(|| k.name.clone()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn mixed_result(item: &MediaItem) -> Value {
    match item.media_type.as_str() {
        "movie" => {
            let date = item.release_date.as_deref();
            json!({
                "tmdbId": item.id,
                "mediaType": item.media_type,
                "title": item.title,
                "year": extract_year(date),
                "releaseDate": date_or_na(date),
                "overview": truncate_text(item.overview.as_deref().unwrap_or_default(), OVERVIEW_CAP),
                "tmdbRating": item.vote_average,
                "posterUrl": image_url(item.poster_path.as_deref(), ImageSize::W342),
            })
        }
        "tv" => {
            let date = item.first_air_date.as_deref();
            json!({
                "tmdbId": item.id,
                "mediaType": item.media_type,
                "name": item.name,
                "year": extract_year(date),
                "firstAirDate": date_or_na(date),
                "overview": truncate_text(item.overview.as_deref().unwrap_or_default(), OVERVIEW_CAP),
                "tmdbRating": item.vote_average,
                "posterUrl": image_url(item.poster_path.as_deref(), ImageSize::W342),
            })
        }
        _ => json!({
            "tmdbId": item.id,
            "mediaType": item.media_type,
            "name": item.name,
            "knownFor": item.known_for_department,
            "profileImageUrl": image_url(item.profile_path.as_deref(), ImageSize::W185),
            "knownForTitles": known_for_titles(item),
        }),
    }
}

pub async fn multi_search(catalogs: &Catalogs, input: MultiSearchInput) -> Result<Value> {
    check_page(input.page)?;
    let result = catalogs.tmdb.multi_search(&input.query, input.page).await?;

    let mut by_type = Map::new();
    for (key, media_type) in [("movies", "movie"), ("tvShows", "tv"), ("people", "person")] {
        let group: Vec<Value> = result
            .results
            .iter()
            .filter(|r| r.media_type == media_type)
            .map(mixed_result)
            .collect();
        if !group.is_empty() {
            by_type.insert(key.to_string(), Value::Array(group));
        }
    }

    let results: Vec<Value> = result.results.iter().map(mixed_result).collect();
    Ok(json!({
        "query": input.query,
        "results": results,
        "byType": by_type,
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendingInput {
    #[schemars(description = "Type of content: 'movie', 'tv', or 'all' (default: 'all')")]
    pub media_type: Option<TrendingMedia>,
    #[schemars(description = "Time window: 'day' or 'week' (default: 'week')")]
    pub time_window: Option<TimeWindow>,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub async fn get_trending(catalogs: &Catalogs, input: TrendingInput) -> Result<Value> {
    check_page(input.page)?;
    let media = input.media_type.unwrap_or_default();
    let window = input.time_window.unwrap_or_default();
    let result = catalogs.tmdb.trending(media, window, input.page).await?;

    let results: Vec<Value> = result
        .results
        .iter()
        .map(|item| {
            let is_movie = item.media_type == "movie";
            let (title, date) = if is_movie {
                (item.title.as_deref(), item.release_date.as_deref())
            } else {
                (item.name.as_deref(), item.first_air_date.as_deref())
            };
            json!({
                "tmdbId": item.id,
                "mediaType": item.media_type,
                "title": title.unwrap_or("Unknown"),
                "year": extract_year(date),
                "releaseDate": date_or_na(date),
                "overview": truncate_text(item.overview.as_deref().unwrap_or_default(), OVERVIEW_CAP),
                "tmdbRating": item.vote_average,
                "voteCount": item.vote_count,
                "posterUrl": image_url(item.poster_path.as_deref(), ImageSize::W342),
            })
        })
        .collect();

    Ok(json!({
        "results": results,
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
        "filters": {
            "mediaType": media,
            "timeWindow": window,
        },
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaPageInput {
    #[schemars(description = "TMDB movie ID (use search_movies to find IDs)")]
    pub movie_id: Option<u64>,
    #[schemars(description = "TMDB TV series ID")]
    pub tv_id: Option<u64>,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub async fn get_similar(catalogs: &Catalogs, input: MediaPageInput) -> Result<Value> {
    let (kind, id) = media_key(input.movie_id, input.tv_id)?;
    check_page(input.page)?;
    let tmdb = catalogs.tmdb.as_ref();

    match kind {
        MediaKind::Movie => {
            let (similar, details) =
                tokio::try_join!(tmdb.similar_movies(id, input.page), tmdb.movie_details(id))?;
            let results: Vec<MovieResult> = similar
                .results
                .iter()
                .map(|m| MovieResult::new(m, true))
                .collect();
            Ok(json!({
                "mediaType": kind,
                "basedOn": {
                    "tmdbId": details.id,
                    "title": details.title,
                    "genres": details.genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
                },
                "similar": results,
                "totalResults": similar.total_results,
                "page": similar.page,
                "totalPages": cap_total_pages(similar.total_pages),
            }))
        }
        MediaKind::Tv => {
            let (similar, details) =
                tokio::try_join!(tmdb.similar_tv(id, input.page), tmdb.tv_details(id))?;
            let results: Vec<TvResult> = similar
                .results
                .iter()
                .map(|s| TvResult::new(s, true))
                .collect();
            Ok(json!({
                "mediaType": kind,
                "basedOn": {
                    "tmdbId": details.id,
                    "name": details.name,
                    "genres": details.genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
                },
                "similar": results,
                "totalResults": similar.total_results,
                "page": similar.page,
                "totalPages": cap_total_pages(similar.total_pages),
            }))
        }
    }
}

/// Display title of a movie or show, fetched alongside another request.
async fn media_title(catalogs: &Catalogs, kind: MediaKind, id: u64) -> Result<String> {
    match kind {
        MediaKind::Movie => Ok(catalogs.tmdb.movie_details(id).await?.title),
        MediaKind::Tv => Ok(catalogs.tmdb.tv_details(id).await?.name),
    }
}

fn review_json(review: &Review) -> Value {
    json!({
        "id": review.id,
        "author": review.author,
        "username": review.author_details.username,
        "rating": review.author_details.rating,
        "content": truncate_text(&review.content, REVIEW_CAP),
        "createdAt": review.created_at,
        "url": review.url,
    })
}

pub async fn get_reviews(catalogs: &Catalogs, input: MediaPageInput) -> Result<Value> {
    let (kind, id) = media_key(input.movie_id, input.tv_id)?;
    check_page(input.page)?;
    let (reviews, title) = tokio::try_join!(
        catalogs.tmdb.reviews(kind, id, input.page),
        media_title(catalogs, kind, id)
    )?;

    let formatted: Vec<Value> = reviews.results.iter().map(review_json).collect();
    Ok(json!({
        "mediaType": kind,
        "mediaTitle": title,
        "mediaId": id,
        "reviews": formatted,
        "totalReviews": reviews.total_results,
        "page": reviews.page,
        "totalPages": cap_total_pages(reviews.total_pages),
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum VideoType {
    Trailer,
    Teaser,
    Clip,
    #[serde(rename = "Behind the Scenes")]
    BehindTheScenes,
    Featurette,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl VideoType {
    fn matches(&self, video: &Video) -> bool {
        match self {
            VideoType::All => true,
            VideoType::Trailer => video.kind == "Trailer",
            VideoType::Teaser => video.kind == "Teaser",
            VideoType::Clip => video.kind == "Clip",
            VideoType::BehindTheScenes => video.kind == "Behind the Scenes",
            VideoType::Featurette => video.kind == "Featurette",
        }
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideosInput {
    #[schemars(description = "TMDB movie ID (use search_movies to find IDs)")]
    pub movie_id: Option<u64>,
    #[schemars(description = "TMDB TV series ID")]
    pub tv_id: Option<u64>,
    #[serde(rename = "type")]
    #[schemars(description = "Filter by video type (default: all)")]
    pub video_type: Option<VideoType>,
}

fn published(video: &Video) -> Option<DateTime<FixedOffset>> {
    video
        .published_at
        .as_deref()
        .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
}

/// Official uploads first, then newest first; undated videos sink to the end.
pub fn sort_videos(videos: &mut [Video]) {
    videos.sort_by(|a, b| {
        b.official
            .cmp(&a.official)
            .then_with(|| published(b).cmp(&published(a)))
    });
}

pub fn video_url(video: &Video) -> Option<String> {
    match video.site.as_str() {
        "YouTube" => Some(format!("https://www.youtube.com/watch?v={}", video.key)),
        "Vimeo" => Some(format!("https://vimeo.com/{}", video.key)),
        _ => None,
    }
}

pub async fn get_videos(catalogs: &Catalogs, input: VideosInput) -> Result<Value> {
    let (kind, id) = media_key(input.movie_id, input.tv_id)?;
    let filter = input.video_type.unwrap_or_default();
    let (videos, title) = tokio::try_join!(
        catalogs.tmdb.videos(kind, id),
        media_title(catalogs, kind, id)
    )?;

    let mut videos: Vec<Video> = videos.into_iter().filter(|v| filter.matches(v)).collect();
    sort_videos(&mut videos);

    let formatted: Vec<Value> = videos
        .iter()
        .map(|v| {
            json!({
                "id": v.id,
                "name": v.name,
                "type": v.kind,
                "site": v.site,
                "key": v.key,
                "url": video_url(v),
                "size": v.size,
                "official": v.official,
                "publishedAt": v.published_at,
            })
        })
        .collect();

    Ok(json!({
        "mediaType": kind,
        "mediaTitle": title,
        "mediaId": id,
        "totalVideos": formatted.len(),
        "videos": formatted,
        "filter": filter,
    }))
}
