use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{
    Collection, Credits, DiscoverMovies, DiscoverTv, MediaItem, MediaKind, MovieDetails,
    MovieSummary, Paged, PersonDetails, PersonMovieCredits, PersonSummary, Review, TimeWindow,
    TmdbApi, TrendingMedia, TvDetails, TvSummary, Video, WatchProviders,
};
use crate::config::Settings;
use crate::error::{Catalog, Error, Result};
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: HttpClient,
    base_url: String,
    token: String,
}

impl TmdbClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = HttpClient::new(Catalog::Tmdb, settings.timeout, settings.retry)?;
        Ok(Self::new(
            http,
            settings.tmdb_base_url.clone(),
            settings.tmdb_api_key.clone(),
        ))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let res = self.http.get(&url, params, Some(&self.token)).await?;
        normalize(res.status, &res.body)
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str, page: Option<u32>) -> Result<T> {
        let params = page_param(page);
        self.get_json(path, &params).await
    }
}

fn page_param(page: Option<u32>) -> Vec<(&'static str, String)> {
    page.map(|p| vec![("page", p.to_string())])
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct ErrorBody {
    status_message: Option<String>,
}

/// Maps the metadata catalog's HTTP status + `success` flag convention onto [`Error`].
pub fn normalize<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.status_message)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {}", status.as_u16())
                } else {
                    format!("HTTP {}: {}", status.as_u16(), trimmed)
                }
            });
        return Err(Error::Catalog {
            catalog: Catalog::Tmdb,
            status: Some(status.as_u16()),
            message,
        });
    }

    let value: Value = serde_json::from_str(body).map_err(|source| Error::Decode {
        catalog: Catalog::Tmdb,
        source,
    })?;
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("status_message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown TMDB error")
            .to_string();
        return Err(Error::Catalog {
            catalog: Catalog::Tmdb,
            status: Some(status.as_u16()),
            message,
        });
    }
    serde_json::from_value(value).map_err(|source| Error::Decode {
        catalog: Catalog::Tmdb,
        source,
    })
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn search_movies(
        &self,
        query: &str,
        year: Option<i32>,
        page: Option<u32>,
    ) -> Result<Paged<MovieSummary>> {
        debug!(query, ?year, ?page, "TMDB movie search");
        let mut params = vec![("query", query.to_string())];
        params.extend(page_param(page));
        if let Some(y) = year {
            params.push(("year", y.to_string()));
        }
        self.get_json("search/movie", &params).await
    }

    async fn search_tv(
        &self,
        query: &str,
        year: Option<i32>,
        page: Option<u32>,
    ) -> Result<Paged<TvSummary>> {
        debug!(query, ?year, ?page, "TMDB TV search");
        let mut params = vec![("query", query.to_string())];
        params.extend(page_param(page));
        if let Some(y) = year {
            params.push(("first_air_date_year", y.to_string()));
        }
        self.get_json("search/tv", &params).await
    }

    async fn search_person(&self, query: &str, page: Option<u32>) -> Result<Paged<PersonSummary>> {
        let mut params = vec![("query", query.to_string())];
        params.extend(page_param(page));
        self.get_json("search/person", &params).await
    }

    async fn multi_search(&self, query: &str, page: Option<u32>) -> Result<Paged<MediaItem>> {
        let mut params = vec![("query", query.to_string())];
        params.extend(page_param(page));
        self.get_json("search/multi", &params).await
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails> {
        self.get_json(&format!("movie/{id}"), &[]).await
    }

    async fn find_by_imdb(&self, imdb_id: &str) -> Result<Option<MovieSummary>> {
        #[derive(Deserialize)]
        struct FindResponse {
            #[serde(default)]
            movie_results: Vec<MovieSummary>,
        }

        let path = format!("find/{}", urlencoding::encode(imdb_id));
        let data: FindResponse = self
            .get_json(&path, &[("external_source", "imdb_id".to_string())])
            .await?;
        Ok(data.movie_results.into_iter().next())
    }

    async fn movie_credits(&self, id: u64) -> Result<Credits> {
        self.get_json(&format!("movie/{id}/credits"), &[]).await
    }

    async fn watch_providers(&self, id: u64) -> Result<WatchProviders> {
        self.get_json(&format!("movie/{id}/watch/providers"), &[])
            .await
    }

    async fn discover_movies(&self, filters: &DiscoverMovies) -> Result<Paged<MovieSummary>> {
        self.get_json("discover/movie", &filters.to_query()).await
    }

    async fn discover_tv(&self, filters: &DiscoverTv) -> Result<Paged<TvSummary>> {
        self.get_json("discover/tv", &filters.to_query()).await
    }

    async fn trending(
        &self,
        media: TrendingMedia,
        window: TimeWindow,
        page: Option<u32>,
    ) -> Result<Paged<MediaItem>> {
        let path = format!("trending/{}/{}", media.as_str(), window.as_str());
        self.get_page(&path, page).await
    }

    async fn movie_recommendations(
        &self,
        id: u64,
        page: Option<u32>,
    ) -> Result<Paged<MovieSummary>> {
        self.get_page(&format!("movie/{id}/recommendations"), page)
            .await
    }

    async fn similar_movies(&self, id: u64, page: Option<u32>) -> Result<Paged<MovieSummary>> {
        self.get_page(&format!("movie/{id}/similar"), page).await
    }

    async fn tv_details(&self, id: u64) -> Result<TvDetails> {
        self.get_json(&format!("tv/{id}"), &[]).await
    }

    async fn tv_recommendations(&self, id: u64, page: Option<u32>) -> Result<Paged<TvSummary>> {
        self.get_page(&format!("tv/{id}/recommendations"), page)
            .await
    }

    async fn similar_tv(&self, id: u64, page: Option<u32>) -> Result<Paged<TvSummary>> {
        self.get_page(&format!("tv/{id}/similar"), page).await
    }

    async fn collection(&self, id: u64) -> Result<Collection> {
        self.get_json(&format!("collection/{id}"), &[]).await
    }

    async fn person_details(&self, id: u64) -> Result<PersonDetails> {
        self.get_json(&format!("person/{id}"), &[]).await
    }

    async fn person_movie_credits(&self, id: u64) -> Result<PersonMovieCredits> {
        self.get_json(&format!("person/{id}/movie_credits"), &[])
            .await
    }

    async fn reviews(&self, kind: MediaKind, id: u64, page: Option<u32>) -> Result<Paged<Review>> {
        self.get_page(&format!("{}/{id}/reviews", kind.as_str()), page)
            .await
    }

    async fn videos(&self, kind: MediaKind, id: u64) -> Result<Vec<Video>> {
        #[derive(Deserialize)]
        struct VideosResponse {
            #[serde(default)]
            results: Vec<Video>,
        }

        let data: VideosResponse = self
            .get_json(&format!("{}/{id}/videos", kind.as_str()), &[])
            .await?;
        Ok(data.results)
    }

    async fn now_playing(&self, region: &str, page: Option<u32>) -> Result<Paged<MovieSummary>> {
        let mut params = page_param(page);
        params.push(("region", region.to_string()));
        self.get_json("movie/now_playing", &params).await
    }

    async fn airing_today(&self, page: Option<u32>) -> Result<Paged<TvSummary>> {
        self.get_page("tv/airing_today", page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn not_found_status_uses_status_message() {
        let err = normalize::<MovieDetails>(
            StatusCode::NOT_FOUND,
            r#"{"success":false,"status_code":34,"status_message":"The resource you requested could not be found."}"#,
        )
        .unwrap_err();
        match err {
            Error::Catalog {
                catalog,
                status,
                message,
            } => {
                assert_eq!(catalog, Catalog::Tmdb);
                assert_eq!(status, Some(404));
                assert_eq!(message, "The resource you requested could not be found.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn success_false_on_ok_status_is_still_an_error() {
        let err = normalize::<MovieDetails>(
            StatusCode::OK,
            r#"{"success":false,"status_message":"Invalid API key"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Catalog);
    }

    #[test]
    fn malformed_body_is_transport_kind() {
        let err = normalize::<MovieDetails>(StatusCode::OK, "not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn page_param_omits_missing_page() {
        assert!(page_param(None).is_empty());
        assert_eq!(page_param(Some(3)), vec![("page", "3".to_string())]);
    }
}
