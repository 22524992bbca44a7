use std::fmt;

/// Which external catalog produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Omdb,
    Tmdb,
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Catalog::Omdb => f.write_str("OMDb"),
            Catalog::Tmdb => f.write_str("TMDB"),
        }
    }
}

/// Coarse classification used by the tool boundary and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Catalog,
    Transport,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Catalog {
        catalog: Catalog,
        status: Option<u16>,
        message: String,
    },

    #[error("{catalog} request failed: {source}")]
    Transport {
        catalog: Catalog,
        #[source]
        source: reqwest::Error,
    },

    #[error("{catalog} request timed out")]
    Timeout { catalog: Catalog },

    #[error("{catalog} returned an unexpected response: {source}")]
    Decode {
        catalog: Catalog,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::NotFound(_) => ErrorKind::Validation,
            Error::Catalog { .. } => ErrorKind::Catalog,
            Error::Transport { .. } | Error::Timeout { .. } | Error::Decode { .. } => {
                ErrorKind::Transport
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_validation_style() {
        let err = Error::not_found("Movie not found for IMDb ID: tt0000001");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Movie not found for IMDb ID: tt0000001");
    }

    #[test]
    fn catalog_error_displays_catalog_message() {
        let err = Error::Catalog {
            catalog: Catalog::Omdb,
            status: None,
            message: "Movie not found!".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Catalog);
        assert_eq!(err.to_string(), "Movie not found!");
    }
}
