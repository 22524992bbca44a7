use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{OmdbApi, PlotLength, SearchPage, SeasonRecord, TitleKind, TitleRecord};
use crate::config::Settings;
use crate::error::{Catalog, Error, Result};
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct OmdbClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = HttpClient::new(Catalog::Omdb, settings.timeout, settings.retry)?;
        Ok(Self::new(
            http,
            settings.omdb_base_url.clone(),
            settings.omdb_api_key.clone(),
        ))
    }

    async fn get_json<T: DeserializeOwned>(&self, mut params: Vec<(&str, String)>) -> Result<T> {
        params.insert(0, ("apikey", self.api_key.clone()));
        let res = self.http.get(&self.base_url, &params, None).await?;
        normalize(res.status, &res.body)
    }
}

/// Maps the ratings catalog's `Response: "True"/"False"` convention onto [`Error`].
/// The catalog reports most failures (unknown title, bad key) inside the JSON body,
/// sometimes with a 200 status and sometimes without.
pub fn normalize<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(source) => {
            if !status.is_success() {
                return Err(Error::Catalog {
                    catalog: Catalog::Omdb,
                    status: Some(status.as_u16()),
                    message: format!("HTTP {}: {}", status.as_u16(), body.trim()),
                });
            }
            return Err(Error::Decode {
                catalog: Catalog::Omdb,
                source,
            });
        }
    };

    if value.get("Response").and_then(Value::as_str) == Some("False") {
        let message = value
            .get("Error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown OMDb error")
            .to_string();
        return Err(Error::Catalog {
            catalog: Catalog::Omdb,
            status: (!status.is_success()).then(|| status.as_u16()),
            message,
        });
    }
    if !status.is_success() {
        return Err(Error::Catalog {
            catalog: Catalog::Omdb,
            status: Some(status.as_u16()),
            message: format!("HTTP {}", status.as_u16()),
        });
    }

    serde_json::from_value(value).map_err(|source| Error::Decode {
        catalog: Catalog::Omdb,
        source,
    })
}

#[async_trait]
impl OmdbApi for OmdbClient {
    async fn search(
        &self,
        query: &str,
        kind: TitleKind,
        year: Option<&str>,
        page: Option<u32>,
    ) -> Result<SearchPage> {
        debug!(query, kind = %kind, ?year, ?page, "OMDb search");
        let mut params = vec![("s", query.to_string()), ("type", kind.as_str().to_string())];
        if let Some(y) = year {
            params.push(("y", y.to_string()));
        }
        if let Some(p) = page {
            params.push(("page", p.to_string()));
        }
        self.get_json(params).await
    }

    async fn by_id(&self, imdb_id: &str, plot: PlotLength) -> Result<TitleRecord> {
        self.get_json(vec![
            ("i", imdb_id.to_string()),
            ("plot", plot.as_str().to_string()),
        ])
        .await
    }

    async fn by_title(
        &self,
        title: &str,
        kind: Option<TitleKind>,
        year: Option<&str>,
        plot: PlotLength,
    ) -> Result<TitleRecord> {
        let mut params = vec![("t", title.to_string()), ("plot", plot.as_str().to_string())];
        if let Some(k) = kind {
            params.push(("type", k.as_str().to_string()));
        }
        if let Some(y) = year {
            params.push(("y", y.to_string()));
        }
        self.get_json(params).await
    }

    async fn episode(&self, series_id: &str, season: u32, episode: u32) -> Result<TitleRecord> {
        self.get_json(vec![
            ("i", series_id.to_string()),
            ("Season", season.to_string()),
            ("Episode", episode.to_string()),
        ])
        .await
    }

    async fn season(&self, series_id: &str, season: u32) -> Result<SeasonRecord> {
        self.get_json(vec![
            ("i", series_id.to_string()),
            ("Season", season.to_string()),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn response_false_becomes_catalog_error() {
        let err = normalize::<TitleRecord>(
            StatusCode::OK,
            r#"{"Response":"False","Error":"Movie not found!"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Catalog);
        assert_eq!(err.to_string(), "Movie not found!");
    }

    #[test]
    fn invalid_key_keeps_http_status() {
        let err = normalize::<TitleRecord>(
            StatusCode::UNAUTHORIZED,
            r#"{"Response":"False","Error":"Invalid API key!"}"#,
        )
        .unwrap_err();
        match err {
            Error::Catalog {
                status, message, ..
            } => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Invalid API key!");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parses_search_page() {
        let page: SearchPage = normalize(
            StatusCode::OK,
            r#"{"Search":[{"Title":"Lost","Year":"2004–2010","imdbID":"tt0411008","Type":"series","Poster":"N/A"}],"totalResults":"57","Response":"True"}"#,
        )
        .expect("search page");
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].kind, TitleKind::Series);
        assert_eq!(page.total_results(), 57);
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let record: TitleRecord = normalize(
            StatusCode::OK,
            r#"{"Title":"Some Game","Type":"game","imdbID":"tt1","Response":"True"}"#,
        )
        .expect("record");
        assert_eq!(record.kind, TitleKind::Other("game".into()));
        assert_eq!(record.kind.to_string(), "game");
    }

    #[test]
    fn non_json_server_error_is_catalog_error() {
        let err =
            normalize::<TitleRecord>(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Catalog);
    }
}
