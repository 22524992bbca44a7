//! Fixed genre name -> catalog id tables. Movie and TV genres are separate
//! tables in the metadata catalog and assign different ids to overlapping names.

use crate::error::{Error, Result};

pub type GenreTable = &'static [(&'static str, u32)];

pub const MOVIE_GENRES: GenreTable = &[
    ("action", 28),
    ("adventure", 12),
    ("animation", 16),
    ("comedy", 35),
    ("crime", 80),
    ("documentary", 99),
    ("drama", 18),
    ("family", 10751),
    ("fantasy", 14),
    ("history", 36),
    ("horror", 27),
    ("music", 10402),
    ("mystery", 9648),
    ("romance", 10749),
    ("science fiction", 878),
    ("sci-fi", 878),
    ("tv movie", 10770),
    ("thriller", 53),
    ("war", 10752),
    ("western", 37),
];

pub const TV_GENRES: GenreTable = &[
    ("action & adventure", 10759),
    ("action", 10759),
    ("adventure", 10759),
    ("animation", 16),
    ("comedy", 35),
    ("crime", 80),
    ("documentary", 99),
    ("drama", 18),
    ("family", 10751),
    ("kids", 10762),
    ("mystery", 9648),
    ("news", 10763),
    ("reality", 10764),
    ("sci-fi & fantasy", 10765),
    ("sci-fi", 10765),
    ("science fiction", 10765),
    ("fantasy", 10765),
    ("soap", 10766),
    ("talk", 10767),
    ("war & politics", 10768),
    ("war", 10768),
    ("politics", 10768),
    ("western", 37),
];

/// Case-insensitive, whitespace-trimmed lookup.
pub fn genre_id(name: &str, table: GenreTable) -> Option<u32> {
    let key = name.trim().to_lowercase();
    table
        .iter()
        .find(|(genre, _)| *genre == key)
        .map(|(_, id)| *id)
}

/// Like [`genre_id`] but an unknown name becomes a validation error listing the valid names.
pub fn require_genre_id(name: &str, table: GenreTable) -> Result<u32> {
    genre_id(name, table).ok_or_else(|| {
        Error::validation(format!(
            "Unknown genre '{}'. Available genres: {}",
            name,
            genre_names(table).join(", ")
        ))
    })
}

pub fn genre_names(table: GenreTable) -> Vec<&'static str> {
    table.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn lookup_trims_and_ignores_case() {
        assert_eq!(genre_id("  Sci-Fi ", MOVIE_GENRES), Some(878));
        assert_eq!(genre_id("HORROR", MOVIE_GENRES), Some(27));
    }

    #[test]
    fn tables_differ_for_overlapping_names() {
        assert_eq!(genre_id("sci-fi", TV_GENRES), Some(10765));
        assert_eq!(genre_id("action", TV_GENRES), Some(10759));
        assert_eq!(genre_id("action", MOVIE_GENRES), Some(28));
    }

    #[test]
    fn unknown_genre_lists_valid_names() {
        let err = require_genre_id("telenovela", MOVIE_GENRES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let msg = err.to_string();
        assert!(msg.contains("Unknown genre 'telenovela'"));
        for name in genre_names(MOVIE_GENRES) {
            assert!(msg.contains(name), "missing {name}");
        }
    }
}
