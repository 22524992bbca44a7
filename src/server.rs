//! MCP surface: one `#[tool]` per operation, each delegating to `crate::tools`.
//! Every failure is turned into an error result here, never a protocol error.

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde_json::Value;
use tracing::{debug, warn};

use crate::tools::media::{self, MediaPageInput, MultiSearchInput, TrendingInput, VideosInput};
use crate::tools::movies::{
    self, CollectionInput, DiscoverMoviesInput, GetMovieInput, MovieRecommendationsInput,
    NowPlayingInput, SearchMoviesInput, WhereToWatchInput,
};
use crate::tools::people::{self, FilmographyInput, PersonInput, SearchPersonInput};
use crate::tools::series::{
    self, AllEpisodesInput, EpisodeInput, GetSeriesInput, SearchSeriesInput, SeasonInput,
};
use crate::tools::tv::{self, AiringTodayInput, DiscoverTvInput, TvRecommendationsInput};
use crate::tools::Catalogs;

/// Converts a tool outcome into the single-text-item result callers see.
pub fn respond(context: &str, outcome: crate::error::Result<Value>) -> CallToolResult {
    match outcome {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            CallToolResult::success(vec![Content::text(text)])
        }
        Err(e) => {
            warn!(kind = ?e.kind(), error = %e, "Tool call failed while {context}");
            CallToolResult::error(vec![Content::text(format!("Error {context}: {e}"))])
        }
    }
}

#[derive(Clone)]
pub struct CineServer {
    catalogs: Catalogs,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CineServer {
    pub fn new(catalogs: Catalogs) -> Self {
        Self {
            catalogs,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Search for movies by title. Returns TMDB IDs, release years, overviews and ratings.")]
    async fn search_movies(
        &self,
        Parameters(input): Parameters<SearchMoviesInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(query = %input.query, "search_movies");
        Ok(respond("searching movies", movies::search_movies(&self.catalogs, input).await))
    }

    #[tool(description = "Search for actors, directors and other people by name.")]
    async fn search_person(
        &self,
        Parameters(input): Parameters<SearchPersonInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(query = %input.query, "search_person");
        Ok(respond("searching person", people::search_person(&self.catalogs, input).await))
    }

    #[tool(description = "Search movies, TV shows and people in a single request, grouped by type.")]
    async fn multi_search(
        &self,
        Parameters(input): Parameters<MultiSearchInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(query = %input.query, "multi_search");
        Ok(respond("performing multi search", media::multi_search(&self.catalogs, input).await))
    }

    #[tool(description = "Get biography, birth/death dates and profile image for a person.")]
    async fn get_person_details(
        &self,
        Parameters(input): Parameters<PersonInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(person = input.person_id, "get_person_details");
        Ok(respond(
            "getting person details",
            people::get_person_details(&self.catalogs, input).await,
        ))
    }

    #[tool(description = "Get a person's movie credits, filterable by role and sortable by date, rating or title.")]
    async fn get_filmography(
        &self,
        Parameters(input): Parameters<FilmographyInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(person = input.person_id, "get_filmography");
        Ok(respond("getting filmography", people::get_filmography(&self.catalogs, input).await))
    }

    #[tool(description = "Discover movies by year, genre, minimum rating, director, actor or language.")]
    async fn discover_movies(
        &self,
        Parameters(input): Parameters<DiscoverMoviesInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "discover_movies");
        Ok(respond("discovering movies", movies::discover_movies(&self.catalogs, input).await))
    }

    #[tool(description = "Discover TV shows by first-air year, genre, minimum rating or language.")]
    async fn discover_tv(
        &self,
        Parameters(input): Parameters<DiscoverTvInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "discover_tv");
        Ok(respond("discovering TV shows", tv::discover_tv(&self.catalogs, input).await))
    }

    #[tool(description = "Find where a movie can be streamed, rented or bought in a region.")]
    async fn get_where_to_watch(
        &self,
        Parameters(input): Parameters<WhereToWatchInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_where_to_watch");
        Ok(respond(
            "getting watch providers",
            movies::get_where_to_watch(&self.catalogs, input).await,
        ))
    }

    #[tool(description = "Get trending movies, TV shows or both for the day or week.")]
    async fn get_trending(
        &self,
        Parameters(input): Parameters<TrendingInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_trending");
        Ok(respond("getting trending", media::get_trending(&self.catalogs, input).await))
    }

    #[tool(description = "Get movie recommendations based on a movie given by TMDB ID, IMDb ID or title.")]
    async fn get_movie_recommendations(
        &self,
        Parameters(input): Parameters<MovieRecommendationsInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_movie_recommendations");
        Ok(respond(
            "getting movie recommendations",
            movies::get_movie_recommendations(&self.catalogs, input).await,
        ))
    }

    #[tool(description = "Get TV show recommendations based on a show given by TMDB ID or title.")]
    async fn get_tv_recommendations(
        &self,
        Parameters(input): Parameters<TvRecommendationsInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_tv_recommendations");
        Ok(respond(
            "getting TV recommendations",
            tv::get_tv_recommendations(&self.catalogs, input).await,
        ))
    }

    #[tool(description = "Get movies or TV shows similar to a given title.")]
    async fn get_similar(
        &self,
        Parameters(input): Parameters<MediaPageInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_similar");
        Ok(respond("getting similar content", media::get_similar(&self.catalogs, input).await))
    }

    #[tool(description = "Get all movies of a franchise/collection in release order.")]
    async fn get_collection(
        &self,
        Parameters(input): Parameters<CollectionInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_collection");
        Ok(respond("getting collection", movies::get_collection(&self.catalogs, input).await))
    }

    #[tool(description = "Get community reviews for a movie or TV show.")]
    async fn get_reviews(
        &self,
        Parameters(input): Parameters<MediaPageInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_reviews");
        Ok(respond("getting reviews", media::get_reviews(&self.catalogs, input).await))
    }

    #[tool(description = "Get trailers, teasers, clips and featurettes for a movie or TV show, with YouTube/Vimeo links.")]
    async fn get_videos(
        &self,
        Parameters(input): Parameters<VideosInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_videos");
        Ok(respond("getting videos", media::get_videos(&self.catalogs, input).await))
    }

    #[tool(description = "Get movies currently in theaters in a region.")]
    async fn get_now_playing(
        &self,
        Parameters(input): Parameters<NowPlayingInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_now_playing");
        Ok(respond(
            "getting now playing movies",
            movies::get_now_playing(&self.catalogs, input).await,
        ))
    }

    #[tool(description = "Get TV shows with an episode airing today.")]
    async fn get_airing_today(
        &self,
        Parameters(input): Parameters<AiringTodayInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_airing_today");
        Ok(respond(
            "getting TV shows airing today",
            tv::get_airing_today(&self.catalogs, input).await,
        ))
    }

    #[tool(description = "Get full details for a movie by IMDb ID, TMDB ID or title: OMDb ratings, awards and box office combined with TMDB budget, genres, images and credits.")]
    async fn get_movie(
        &self,
        Parameters(input): Parameters<GetMovieInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_movie");
        Ok(respond("getting movie details", movies::get_movie(&self.catalogs, input).await))
    }

    #[tool(description = "Search for TV series by title. Returns IMDb IDs usable with the other series tools.")]
    async fn search_series(
        &self,
        Parameters(input): Parameters<SearchSeriesInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(query = %input.query, "search_series");
        Ok(respond("searching series", series::search_series(&self.catalogs, input).await))
    }

    #[tool(description = "Get details for a TV series by IMDb ID or title, including the number of seasons.")]
    async fn get_series(
        &self,
        Parameters(input): Parameters<GetSeriesInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_series");
        Ok(respond("getting series details", series::get_series(&self.catalogs, input).await))
    }

    #[tool(description = "Get details for one episode of a series by season and episode number.")]
    async fn get_episode(
        &self,
        Parameters(input): Parameters<EpisodeInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_episode");
        Ok(respond("getting episode details", series::get_episode(&self.catalogs, input).await))
    }

    #[tool(description = "List the episodes of one season of a series.")]
    async fn get_season(
        &self,
        Parameters(input): Parameters<SeasonInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_season");
        Ok(respond("getting season", series::get_season(&self.catalogs, input).await))
    }

    #[tool(description = "List every episode of every season of a series.")]
    async fn get_all_episodes(
        &self,
        Parameters(input): Parameters<AllEpisodesInput>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!(?input, "get_all_episodes");
        Ok(respond("getting all episodes", series::get_all_episodes(&self.catalogs, input).await))
    }
}

#[tool_handler]
impl ServerHandler for CineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Movie and TV lookup backed by OMDb (ratings, awards, episodes) and TMDB \
                 (search, discovery, credits, images, recommendations, streaming availability)."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[test]
    fn success_is_pretty_json() {
        let result = respond("searching movies", Ok(json!({ "page": 1 })));
        assert_ne!(result.is_error, Some(true));
        assert_eq!(text(&result), "{\n  \"page\": 1\n}");
    }

    #[test]
    fn failure_is_prefixed_with_context() {
        let result = respond(
            "getting movie details",
            Err(Error::not_found("Movie not found for IMDb ID: tt0000000")),
        );
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            text(&result),
            "Error getting movie details: Movie not found for IMDb ID: tt0000000"
        );
    }
}
