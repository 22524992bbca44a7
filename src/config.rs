use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

use crate::http::RetryPolicy;

pub const DEFAULT_OMDB_BASE: &str = "https://www.omdbapi.com/";
pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Process-wide configuration, fixed at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub omdb_api_key: String,
    pub tmdb_api_key: String,
    pub omdb_base_url: String,
    pub tmdb_base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup so tests don't have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let omdb_api_key = get("OMDB_API_KEY").ok_or_else(|| {
            anyhow!(
                "OMDB_API_KEY environment variable is required. \
                 Get your API key from https://www.omdbapi.com/apikey.aspx"
            )
        })?;
        let tmdb_api_key = get("TMDB_API_KEY").ok_or_else(|| {
            anyhow!(
                "TMDB_API_KEY environment variable is required. \
                 Get your API read access token from https://www.themoviedb.org/settings/api"
            )
        })?;

        let timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("HTTP_TIMEOUT_SECS must be a number, got '{raw}'"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let mut retry = RetryPolicy::default();
        if let Some(raw) = get("HTTP_MAX_RETRIES") {
            retry.max_retries = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("HTTP_MAX_RETRIES must be a number, got '{raw}'"))?;
        }

        Ok(Self {
            omdb_api_key,
            tmdb_api_key,
            omdb_base_url: get("OMDB_BASE_URL").unwrap_or_else(|| DEFAULT_OMDB_BASE.to_string()),
            tmdb_base_url: get("TMDB_BASE_URL").unwrap_or_else(|| DEFAULT_TMDB_BASE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_omdb_key_points_to_signup_page() {
        let err = Settings::from_lookup(lookup(&[("TMDB_API_KEY", "t")])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("OMDB_API_KEY"));
        assert!(msg.contains("omdbapi.com/apikey.aspx"));
    }

    #[test]
    fn blank_tmdb_key_counts_as_missing() {
        let err = Settings::from_lookup(lookup(&[("OMDB_API_KEY", "o"), ("TMDB_API_KEY", "  ")]))
            .unwrap_err();
        assert!(err.to_string().contains("TMDB_API_KEY"));
    }

    #[test]
    fn defaults_apply_when_only_keys_are_set() {
        let settings =
            Settings::from_lookup(lookup(&[("OMDB_API_KEY", "o"), ("TMDB_API_KEY", "t")]))
                .expect("settings");
        assert_eq!(settings.omdb_base_url, DEFAULT_OMDB_BASE);
        assert_eq!(settings.tmdb_base_url, DEFAULT_TMDB_BASE);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.retry.max_retries, 2);
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = Settings::from_lookup(lookup(&[
            ("OMDB_API_KEY", "o"),
            ("TMDB_API_KEY", "t"),
            ("HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("HTTP_TIMEOUT_SECS"));
    }
}
