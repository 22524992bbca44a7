//! Tool bodies. Each takes a typed input, talks to one or both catalogs and
//! returns the JSON payload the caller sees. The MCP adapter in `server.rs`
//! only wires these up and converts errors.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::omdb::OmdbApi;
use crate::tmdb::TmdbApi;

pub mod media;
pub mod movies;
pub mod people;
pub mod series;
pub mod tv;

/// The one piece of process-wide state: a handle to each catalog.
#[derive(Clone)]
pub struct Catalogs {
    pub omdb: Arc<dyn OmdbApi>,
    pub tmdb: Arc<dyn TmdbApi>,
}

impl Catalogs {
    pub fn new(omdb: Arc<dyn OmdbApi>, tmdb: Arc<dyn TmdbApi>) -> Self {
        Self { omdb, tmdb }
    }
}

/// Highest page the ratings catalog will serve for a search.
pub const OMDB_MAX_PAGE: u32 = 100;

pub(crate) fn check_page(page: Option<u32>) -> Result<()> {
    match page {
        Some(0) => Err(Error::validation("page must be at least 1")),
        _ => Ok(()),
    }
}

pub(crate) fn check_omdb_page(page: Option<u32>) -> Result<()> {
    check_page(page)?;
    match page {
        Some(p) if p > OMDB_MAX_PAGE => Err(Error::validation(format!(
            "page must be between 1 and {OMDB_MAX_PAGE}"
        ))),
        _ => Ok(()),
    }
}
