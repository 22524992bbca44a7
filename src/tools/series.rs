//! Series tools, served from the ratings catalog.

use futures::stream::{self, StreamExt, TryStreamExt};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{check_omdb_page, Catalogs};
use crate::error::{Catalog, Error, Result};
use crate::format::{total_pages, EpisodeSummary};
use crate::omdb::{PlotLength, SeasonRecord, TitleKind, PAGE_SIZE};
use crate::resolve::{at_least_one, non_blank};

/// Upper bound on the season count accepted from a series record.
pub const MAX_SEASONS: u32 = 100;
/// Season fetches in flight at once.
const SEASON_FETCH_CONCURRENCY: usize = 5;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SearchSeriesInput {
    #[schemars(description = "TV series title to search for")]
    pub query: String,
    #[schemars(description = "Filter results by year (e.g., '2008')")]
    pub year: Option<String>,
    #[schemars(description = "Page number for pagination (1-100, 10 results per page)")]
    pub page: Option<u32>,
}

pub async fn search_series(catalogs: &Catalogs, input: SearchSeriesInput) -> Result<Value> {
    check_omdb_page(input.page)?;
    let result = catalogs
        .omdb
        .search(
            &input.query,
            TitleKind::Series,
            non_blank(input.year.as_deref()),
            input.page,
        )
        .await?;

    let total = result.total_results();
    let hits: Vec<Value> = result
        .results
        .iter()
        .map(|hit| {
            json!({
                "title": hit.title,
                "year": hit.year,
                "imdbId": hit.imdb_id,
                "type": hit.kind,
            })
        })
        .collect();

    Ok(json!({
        "results": hits,
        "totalResults": total,
        "page": input.page.unwrap_or(1),
        "totalPages": total_pages(total, PAGE_SIZE),
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetSeriesInput {
    #[schemars(description = "IMDb ID of the series (e.g., 'tt0944947')")]
    pub imdb_id: Option<String>,
    #[schemars(description = "Exact title of the series to look up")]
    pub title: Option<String>,
    #[schemars(description = "Year the series started (helps disambiguate titles)")]
    pub year: Option<String>,
    #[schemars(description = "Plot length: 'short' (default) or 'full'")]
    pub plot: Option<PlotLength>,
}

pub async fn get_series(catalogs: &Catalogs, input: GetSeriesInput) -> Result<Value> {
    let plot = input.plot.unwrap_or_default();
    let record = match (
        non_blank(input.imdb_id.as_deref()),
        non_blank(input.title.as_deref()),
    ) {
        (Some(imdb), _) => catalogs.omdb.by_id(imdb, plot).await?,
        (None, Some(title)) => {
            catalogs
                .omdb
                .by_title(title, Some(TitleKind::Series), input.year.as_deref(), plot)
                .await?
        }
        (None, None) => return Err(at_least_one(&["imdbId", "title"])),
    };

    if record.kind != TitleKind::Series {
        return Err(Error::validation(format!(
            "The result is a {kind}, not a series. Use the appropriate tool for {kind}.",
            kind = record.kind
        )));
    }

    Ok(json!({
        "title": record.title,
        "year": record.year,
        "rated": record.rated,
        "released": record.released,
        "runtime": record.runtime,
        "genre": record.genre,
        "director": record.director,
        "writer": record.writer,
        "actors": record.actors,
        "plot": record.plot,
        "language": record.language,
        "country": record.country,
        "awards": record.awards,
        "ratings": record.ratings,
        "metascore": record.metascore,
        "imdbRating": record.imdb_rating,
        "imdbVotes": record.imdb_votes,
        "imdbId": record.imdb_id,
        "totalSeasons": record.total_seasons,
    }))
}

fn check_positive(name: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(Error::validation(format!("{name} must be at least 1")));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeInput {
    #[schemars(description = "IMDb ID of the series (e.g., 'tt0944947')")]
    pub series_id: String,
    #[schemars(description = "Season number (1 or higher)")]
    pub season: u32,
    #[schemars(description = "Episode number within the season (1 or higher)")]
    pub episode: u32,
}

pub async fn get_episode(catalogs: &Catalogs, input: EpisodeInput) -> Result<Value> {
    check_positive("season", input.season)?;
    check_positive("episode", input.episode)?;
    let record = catalogs
        .omdb
        .episode(&input.series_id, input.season, input.episode)
        .await?;

    Ok(json!({
        "title": record.title,
        "year": record.year,
        "rated": record.rated,
        "released": record.released,
        "season": record.season,
        "episode": record.episode,
        "runtime": record.runtime,
        "genre": record.genre,
        "director": record.director,
        "writer": record.writer,
        "actors": record.actors,
        "plot": record.plot,
        "language": record.language,
        "country": record.country,
        "awards": record.awards,
        "ratings": record.ratings,
        "metascore": record.metascore,
        "imdbRating": record.imdb_rating,
        "imdbVotes": record.imdb_votes,
        "imdbId": record.imdb_id,
        "seriesId": record.series_id,
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeasonInput {
    #[schemars(description = "IMDb ID of the series (e.g., 'tt0944947')")]
    pub series_id: String,
    #[schemars(description = "Season number (1 or higher)")]
    pub season: u32,
}

fn episodes(season: &SeasonRecord) -> Vec<EpisodeSummary> {
    season.episodes.iter().map(EpisodeSummary::from).collect()
}

pub async fn get_season(catalogs: &Catalogs, input: SeasonInput) -> Result<Value> {
    check_positive("season", input.season)?;
    let season = catalogs.omdb.season(&input.series_id, input.season).await?;
    Ok(json!({
        "title": season.title,
        "season": season.season,
        "totalSeasons": season.total_seasons,
        "episodes": episodes(&season),
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllEpisodesInput {
    #[schemars(description = "IMDb ID of the series (e.g., 'tt0944947')")]
    pub series_id: String,
}

/// Reads the season count from the series record, then fetches every season
/// with bounded concurrency, keeping season order. Any failed season fails the
/// whole call.
pub async fn get_all_episodes(catalogs: &Catalogs, input: AllEpisodesInput) -> Result<Value> {
    let omdb = catalogs.omdb.as_ref();
    let series = omdb.by_id(&input.series_id, PlotLength::Short).await?;
    let count: u32 = series
        .total_seasons
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| Error::Catalog {
            catalog: Catalog::Omdb,
            status: None,
            message: format!("{} does not report a season count", input.series_id),
        })?;
    if count > MAX_SEASONS {
        return Err(Error::Catalog {
            catalog: Catalog::Omdb,
            status: None,
            message: format!(
                "{} reports {count} seasons, more than the supported {MAX_SEASONS}",
                input.series_id
            ),
        });
    }
    debug!(series = %input.series_id, seasons = count, "Fetching all seasons");

    let seasons: Vec<SeasonRecord> = stream::iter(1..=count)
        .map(|n| omdb.season(&input.series_id, n))
        .buffered(SEASON_FETCH_CONCURRENCY)
        .try_collect()
        .await?;

    let listed: Vec<Value> = seasons
        .iter()
        .map(|season| {
            json!({
                "season": season.season,
                "episodeCount": season.episodes.len(),
                "episodes": episodes(season),
            })
        })
        .collect();

    let title = seasons
        .first()
        .map(|s| s.title.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or("Unknown");
    Ok(json!({
        "title": title,
        "totalSeasons": seasons.len(),
        "seasons": listed,
    }))
}
