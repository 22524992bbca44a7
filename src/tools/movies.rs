use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{check_page, Catalogs};
use crate::error::{Error, Result};
use crate::format::{cap_total_pages, date_or_na, extract_year, image_url, truncate_text};
use crate::format::{ImageSize, MovieResult, OVERVIEW_CAP};
use crate::genres::{require_genre_id, MOVIE_GENRES};
use crate::merge::merge_movie;
use crate::omdb::{PlotLength, TitleKind, TitleRecord};
use crate::resolve::{at_least_one, non_blank, resolve_movie, MovieKey, MovieLookup};
use crate::tmdb::{
    Credits, DiscoverMovies, MovieDetails, MovieSummary, Paged, TmdbApi, WatchProvider,
};

/// Listing regions are ISO 3166-1 codes; this is the default market.
pub const DEFAULT_REGION: &str = "US";
const MAX_LISTED_REGIONS: usize = 20;
/// Vote floor applied alongside a minimum rating so obscure titles don't dominate.
const MIN_RATING_VOTE_FLOOR: u32 = 50;

fn movie_results(page: &Paged<MovieSummary>, include_vote_count: bool) -> Vec<MovieResult> {
    page.results
        .iter()
        .map(|m| MovieResult::new(m, include_vote_count))
        .collect()
}

fn region_code(region: Option<&str>) -> String {
    non_blank(region).unwrap_or(DEFAULT_REGION).to_uppercase()
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SearchMoviesInput {
    #[schemars(description = "Movie title to search for")]
    pub query: String,
    #[schemars(description = "Filter results by release year (e.g., 2023)")]
    pub year: Option<i32>,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub async fn search_movies(catalogs: &Catalogs, input: SearchMoviesInput) -> Result<Value> {
    check_page(input.page)?;
    let result = catalogs
        .tmdb
        .search_movies(&input.query, input.year, input.page)
        .await?;
    Ok(json!({
        "query": input.query,
        "results": movie_results(&result, true),
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetMovieInput {
    #[schemars(description = "IMDb ID of the movie (e.g., 'tt0111161')")]
    pub imdb_id: Option<String>,
    #[schemars(description = "TMDB movie ID")]
    pub tmdb_id: Option<u64>,
    #[schemars(description = "Exact title of the movie to look up")]
    pub title: Option<String>,
    #[schemars(description = "Year of release (helps disambiguate titles)")]
    pub year: Option<String>,
    #[schemars(description = "Plot length: 'short' (default) or 'full'")]
    pub plot: Option<PlotLength>,
}

fn leading_year(year: &str) -> Option<i32> {
    year.trim().get(..4)?.parse().ok()
}

/// Ratings record for the title, combined with the metadata catalog's view of
/// it when that side can be resolved. Identifiers are taken in the resolver's
/// precedence; a numeric catalog id is used directly for the metadata side.
pub async fn get_movie(catalogs: &Catalogs, input: GetMovieInput) -> Result<Value> {
    let plot = input.plot.unwrap_or_default();
    let lookup = MovieLookup {
        tmdb_id: input.tmdb_id,
        imdb_id: input.imdb_id,
        title: input.title,
        year: input.year.as_deref().and_then(leading_year),
    };
    let mut prefetched = None;

    let record = match lookup.key()? {
        MovieKey::TmdbId(id) => {
            let details = catalogs.tmdb.movie_details(id).await?;
            let imdb = non_blank(lookup.imdb_id.as_deref())
                .or_else(|| non_blank(details.imdb_id.as_deref()))
                .map(str::to_string)
                .ok_or_else(|| Error::not_found(format!("No IMDb ID known for TMDB movie {id}")))?;
            prefetched = Some(details);
            catalogs.omdb.by_id(&imdb, plot).await?
        }
        MovieKey::ImdbId(imdb) => catalogs.omdb.by_id(&imdb, plot).await?,
        MovieKey::Title { title, .. } => {
            catalogs
                .omdb
                .by_title(&title, Some(TitleKind::Movie), input.year.as_deref(), plot)
                .await?
        }
    };

    if record.kind != TitleKind::Movie {
        return Err(Error::validation(format!(
            "The result is a {kind}, not a movie. Use the appropriate tool for {kind}.",
            kind = record.kind
        )));
    }

    let metadata = match movie_metadata(catalogs.tmdb.as_ref(), &record, prefetched).await {
        Ok(pair) => Some(pair),
        Err(e) => {
            warn!(imdb = %record.imdb_id, error = %e, "No metadata for movie, returning ratings only");
            None
        }
    };
    Ok(json!(merge_movie(record, metadata)))
}

async fn movie_metadata(
    tmdb: &dyn TmdbApi,
    record: &TitleRecord,
    prefetched: Option<MovieDetails>,
) -> Result<(MovieDetails, Credits)> {
    if let Some(details) = prefetched {
        let credits = tmdb.movie_credits(details.id).await?;
        return Ok((details, credits));
    }

    let by_id = MovieLookup {
        imdb_id: non_blank(Some(&record.imdb_id)).map(str::to_string),
        ..Default::default()
    };
    let reference = match resolve_movie(tmdb, &by_id).await {
        Ok(reference) => reference,
        Err(Error::NotFound(_)) | Err(Error::Validation(_)) => {
            debug!(title = %record.title, "Falling back to title search in metadata catalog");
            let by_title = MovieLookup {
                title: Some(record.title.clone()),
                year: leading_year(&record.year),
                ..Default::default()
            };
            resolve_movie(tmdb, &by_title).await?
        }
        Err(e) => return Err(e),
    };

    tokio::try_join!(
        tmdb.movie_details(reference.tmdb_id),
        tmdb.movie_credits(reference.tmdb_id)
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum MovieSort {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "popularity.asc")]
    PopularityAsc,
    #[serde(rename = "release_date.desc")]
    ReleaseDateDesc,
    #[serde(rename = "release_date.asc")]
    ReleaseDateAsc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "vote_average.asc")]
    VoteAverageAsc,
    #[serde(rename = "revenue.desc")]
    RevenueDesc,
    #[serde(rename = "revenue.asc")]
    RevenueAsc,
}

impl MovieSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieSort::PopularityDesc => "popularity.desc",
            MovieSort::PopularityAsc => "popularity.asc",
            MovieSort::ReleaseDateDesc => "release_date.desc",
            MovieSort::ReleaseDateAsc => "release_date.asc",
            MovieSort::VoteAverageDesc => "vote_average.desc",
            MovieSort::VoteAverageAsc => "vote_average.asc",
            MovieSort::RevenueDesc => "revenue.desc",
            MovieSort::RevenueAsc => "revenue.asc",
        }
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverMoviesInput {
    #[schemars(description = "Filter by release year (e.g., 2023)")]
    pub year: Option<i32>,
    #[schemars(description = "Genre name (e.g., 'action', 'comedy', 'sci-fi', 'thriller', 'drama')")]
    pub genre: Option<String>,
    #[schemars(description = "Minimum TMDB rating (0-10)")]
    pub min_rating: Option<f64>,
    #[schemars(description = "TMDB person ID for director (use search_person to find IDs)")]
    pub director_id: Option<u64>,
    #[schemars(description = "TMDB person ID for actor (use search_person to find IDs)")]
    pub actor_id: Option<u64>,
    #[schemars(description = "Original language code (e.g., 'en', 'fr', 'ko', 'ja', 'es')")]
    pub language: Option<String>,
    #[schemars(description = "Sort order (default: popularity.desc)")]
    pub sort_by: Option<MovieSort>,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub(crate) fn check_min_rating(min_rating: Option<f64>) -> Result<()> {
    match min_rating {
        Some(r) if !(0.0..=10.0).contains(&r) => {
            Err(Error::validation("minRating must be between 0 and 10"))
        }
        _ => Ok(()),
    }
}

pub(crate) fn vote_floor(min_rating: Option<f64>) -> Option<u32> {
    min_rating
        .filter(|r| *r > 0.0)
        .map(|_| MIN_RATING_VOTE_FLOOR)
}

pub async fn discover_movies(catalogs: &Catalogs, input: DiscoverMoviesInput) -> Result<Value> {
    check_page(input.page)?;
    check_min_rating(input.min_rating)?;
    let genre_id = input
        .genre
        .as_deref()
        .map(|g| require_genre_id(g, MOVIE_GENRES))
        .transpose()?;

    let people: Vec<String> = [input.director_id, input.actor_id]
        .into_iter()
        .flatten()
        .map(|id| id.to_string())
        .collect();

    let filters = DiscoverMovies {
        page: input.page,
        sort_by: input.sort_by.map(|s| s.as_str().to_string()),
        primary_release_year: input.year,
        with_genres: genre_id.map(|id| id.to_string()),
        with_people: (!people.is_empty()).then(|| people.join(",")),
        vote_average_gte: input.min_rating,
        vote_count_gte: vote_floor(input.min_rating),
        with_original_language: input.language.clone(),
    };
    let result = catalogs.tmdb.discover_movies(&filters).await?;

    Ok(json!({
        "results": movie_results(&result, true),
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
        "filters": {
            "year": input.year,
            "genre": input.genre,
            "minRating": input.min_rating,
            "directorId": input.director_id,
            "actorId": input.actor_id,
            "language": input.language,
            "sortBy": input.sort_by.unwrap_or_default(),
        },
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhereToWatchInput {
    #[schemars(description = "Movie title to look up")]
    pub title: Option<String>,
    #[schemars(description = "TMDB movie ID")]
    pub tmdb_id: Option<u64>,
    #[schemars(description = "IMDb ID of the movie (e.g., 'tt0111161')")]
    pub imdb_id: Option<String>,
    #[schemars(description = "ISO 3166-1 country code (e.g., 'US', 'GB', 'SE'). Defaults to US.")]
    pub region: Option<String>,
}

fn providers(list: &[WatchProvider]) -> Vec<Value> {
    list.iter()
        .map(|p| {
            json!({
                "name": p.provider_name,
                "logoUrl": image_url(p.logo_path.as_deref(), ImageSize::W92),
            })
        })
        .collect()
}

pub async fn get_where_to_watch(catalogs: &Catalogs, input: WhereToWatchInput) -> Result<Value> {
    let lookup = MovieLookup {
        tmdb_id: input.tmdb_id,
        imdb_id: input.imdb_id,
        title: input.title,
        year: None,
    };
    let movie = resolve_movie(catalogs.tmdb.as_ref(), &lookup).await?;
    let region = region_code(input.region.as_deref());
    let listing = catalogs.tmdb.watch_providers(movie.tmdb_id).await?;

    let Some(offers) = listing.results.get(&region) else {
        let available: Vec<&String> = listing.results.keys().take(MAX_LISTED_REGIONS).collect();
        return Ok(json!({
            "movieTitle": movie.title,
            "tmdbId": movie.tmdb_id,
            "region": region,
            "message": format!("No streaming/rental/purchase options available in {region}"),
            "availableRegions": available,
        }));
    };

    Ok(json!({
        "movieTitle": movie.title,
        "tmdbId": movie.tmdb_id,
        "region": region,
        "justWatchLink": offers.link,
        "streaming": providers(&offers.flatrate),
        "rent": providers(&offers.rent),
        "buy": providers(&offers.buy),
        "freeWithAds": providers(&offers.free),
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecommendationsInput {
    #[schemars(description = "TMDB movie ID (use search_movies to find IDs)")]
    pub tmdb_id: Option<u64>,
    #[schemars(description = "IMDb ID of the movie (e.g., 'tt0111161')")]
    pub imdb_id: Option<String>,
    #[schemars(description = "Movie title to get recommendations for")]
    pub title: Option<String>,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub async fn get_movie_recommendations(
    catalogs: &Catalogs,
    input: MovieRecommendationsInput,
) -> Result<Value> {
    check_page(input.page)?;
    let lookup = MovieLookup {
        tmdb_id: input.tmdb_id,
        imdb_id: input.imdb_id,
        title: input.title,
        year: None,
    };
    let movie = resolve_movie(catalogs.tmdb.as_ref(), &lookup).await?;
    let result = catalogs
        .tmdb
        .movie_recommendations(movie.tmdb_id, input.page)
        .await?;

    Ok(json!({
        "sourceMovie": {
            "tmdbId": movie.tmdb_id,
            "title": movie.title,
        },
        "recommendations": movie_results(&result, true),
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInput {
    #[schemars(description = "TMDB collection ID")]
    pub collection_id: Option<u64>,
    #[schemars(description = "TMDB ID of a movie in the collection")]
    pub movie_tmdb_id: Option<u64>,
    #[schemars(description = "Title of a movie in the collection")]
    pub movie_title: Option<String>,
}

pub async fn get_collection(catalogs: &Catalogs, input: CollectionInput) -> Result<Value> {
    let tmdb = catalogs.tmdb.as_ref();
    let collection_id = match input.collection_id {
        Some(id) => id,
        None => {
            let details = match (input.movie_tmdb_id, non_blank(input.movie_title.as_deref())) {
                (Some(id), _) => tmdb.movie_details(id).await?,
                (None, Some(title)) => {
                    let lookup = MovieLookup {
                        title: Some(title.to_string()),
                        ..Default::default()
                    };
                    let movie = resolve_movie(tmdb, &lookup).await?;
                    tmdb.movie_details(movie.tmdb_id).await?
                }
                (None, None) => {
                    return Err(at_least_one(&["collectionId", "movieTmdbId", "movieTitle"]))
                }
            };
            details
                .belongs_to_collection
                .map(|c| c.id)
                .ok_or_else(|| {
                    Error::validation(format!(
                        "\"{}\" is not part of a collection/franchise",
                        details.title
                    ))
                })?
        }
    };

    let collection = tmdb.collection(collection_id).await?;
    let mut parts = collection.parts;
    parts.sort_by(|a, b| {
        a.release_date
            .as_deref()
            .unwrap_or_default()
            .cmp(b.release_date.as_deref().unwrap_or_default())
    });

    let movies: Vec<Value> = parts
        .iter()
        .enumerate()
        .map(|(index, movie)| {
            let date = movie.release_date.as_deref();
            json!({
                "order": index + 1,
                "tmdbId": movie.id,
                "title": movie.title,
                "year": extract_year(date),
                "releaseDate": date_or_na(date),
                "overview": truncate_text(movie.overview.as_deref().unwrap_or_default(), OVERVIEW_CAP),
                "tmdbRating": movie.vote_average,
                "voteCount": movie.vote_count,
                "posterUrl": image_url(movie.poster_path.as_deref(), ImageSize::W342),
            })
        })
        .collect();

    Ok(json!({
        "collectionId": collection.id,
        "name": collection.name,
        "overview": non_blank(collection.overview.as_deref()).unwrap_or("No overview available"),
        "posterUrl": image_url(collection.poster_path.as_deref(), ImageSize::W500),
        "backdropUrl": image_url(collection.backdrop_path.as_deref(), ImageSize::W1280),
        "totalMovies": parts.len(),
        "movies": movies,
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NowPlayingInput {
    #[schemars(description = "ISO 3166-1 country code for regional results (e.g., 'US', 'GB', 'SE'). Defaults to US.")]
    pub region: Option<String>,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub async fn get_now_playing(catalogs: &Catalogs, input: NowPlayingInput) -> Result<Value> {
    check_page(input.page)?;
    let region = region_code(input.region.as_deref());
    let result = catalogs.tmdb.now_playing(&region, input.page).await?;
    Ok(json!({
        "results": movie_results(&result, true),
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
        "region": region,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_defaults_and_uppercases() {
        assert_eq!(region_code(None), "US");
        assert_eq!(region_code(Some("  ")), "US");
        assert_eq!(region_code(Some("gb")), "GB");
    }

    #[test]
    fn rating_floor_only_for_positive_minimum() {
        assert_eq!(vote_floor(None), None);
        assert_eq!(vote_floor(Some(0.0)), None);
        assert_eq!(vote_floor(Some(7.5)), Some(50));
        assert!(check_min_rating(Some(10.5)).is_err());
        assert!(check_min_rating(Some(0.0)).is_ok());
    }

    #[test]
    fn sort_order_wire_names() {
        let sort: MovieSort = serde_json::from_str("\"vote_average.desc\"").unwrap();
        assert_eq!(sort, MovieSort::VoteAverageDesc);
        assert_eq!(sort.as_str(), "vote_average.desc");
        assert_eq!(
            serde_json::to_value(MovieSort::default()).unwrap(),
            "popularity.desc"
        );
    }
}
