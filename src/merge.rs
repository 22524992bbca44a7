//! Combined movie view: one record from each catalog, interleaved by source
//! precedence, plus a credit list deduplicated by person.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

use crate::format::{image_url, ImageSize};
use crate::omdb::{Rating, TitleRecord};
use crate::tmdb::{Credits, MovieDetails};

/// Cast rows taken from the metadata catalog's billing order.
pub const CAST_LIMIT: usize = 10;

const PRODUCING_JOBS: [&str; 2] = ["Producer", "Executive Producer"];
const NAMED_CREW_JOBS: [&str; 2] = ["Original Music Composer", "Director of Photography"];

/// Accumulates role labels per key, keeping first-seen order of both keys and labels.
#[derive(Debug)]
pub struct RoleFolder<K, V> {
    entries: Vec<(V, Vec<String>)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash, V> Default for RoleFolder<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> RoleFolder<K, V> {
    pub fn add(&mut self, key: K, role: String, make: impl FnOnce() -> V) {
        match self.index.get(&key) {
            Some(&pos) => {
                let roles = &mut self.entries[pos].1;
                if !roles.contains(&role) {
                    roles.push(role);
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((make(), vec![role]));
            }
        }
    }

    pub fn into_entries(self) -> Vec<(V, Vec<String>)> {
        self.entries
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditEntry {
    pub person_id: u64,
    pub name: String,
    pub roles: Vec<String>,
    pub profile_url: Option<String>,
}

pub fn cast_label(character: Option<&str>) -> String {
    match character.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => format!("Actor ({c})"),
        None => "Actor (N/A)".to_string(),
    }
}

fn is_featured_crew(job: &str, department: &str) -> bool {
    job == "Director"
        || department == "Writing"
        || PRODUCING_JOBS.contains(&job)
        || NAMED_CREW_JOBS.contains(&job)
}

/// Folds billed cast and key crew rows into one entry per person.
pub fn fold_credits(credits: &Credits, cast_limit: usize) -> Vec<CreditEntry> {
    let mut folder: RoleFolder<u64, (u64, String, Option<String>)> = RoleFolder::default();

    let mut cast: Vec<_> = credits.cast.iter().collect();
    cast.sort_by_key(|c| c.order);
    for member in cast.into_iter().take(cast_limit) {
        folder.add(member.id, cast_label(member.character.as_deref()), || {
            (member.id, member.name.clone(), member.profile_path.clone())
        });
    }

    for member in credits
        .crew
        .iter()
        .filter(|c| is_featured_crew(&c.job, &c.department))
    {
        folder.add(member.id, member.job.clone(), || {
            (member.id, member.name.clone(), member.profile_path.clone())
        });
    }

    folder
        .into_entries()
        .into_iter()
        .map(|((person_id, name, profile), roles)| CreditEntry {
            person_id,
            name,
            roles,
            profile_url: image_url(profile.as_deref(), ImageSize::W185),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub tmdb_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieView {
    pub title: String,
    pub year: String,
    pub rated: String,
    pub released: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub writer: String,
    pub actors: String,
    pub plot: String,
    pub language: String,
    pub country: String,
    pub awards: String,
    pub ratings: Vec<Rating>,
    pub metascore: String,
    pub imdb_rating: String,
    pub imdb_votes: String,
    pub imdb_id: String,
    pub box_office: Option<String>,

    pub tmdb_id: Option<u64>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    pub genres: Option<Vec<String>>,
    pub production_companies: Option<Vec<String>>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub tmdb_rating: Option<f64>,
    pub tmdb_vote_count: Option<u64>,
    pub collection: Option<CollectionSummary>,
    pub credits: Option<Vec<CreditEntry>>,
}

/// Ratings, awards, box office and the free-text people fields come from the
/// ratings record; structured and image fields only from the metadata pair.
pub fn merge_movie(record: TitleRecord, metadata: Option<(MovieDetails, Credits)>) -> MovieView {
    let mut view = MovieView {
        title: record.title,
        year: record.year,
        rated: record.rated,
        released: record.released,
        runtime: record.runtime,
        genre: record.genre,
        director: record.director,
        writer: record.writer,
        actors: record.actors,
        plot: record.plot,
        language: record.language,
        country: record.country,
        awards: record.awards,
        ratings: record.ratings,
        metascore: record.metascore,
        imdb_rating: record.imdb_rating,
        imdb_votes: record.imdb_votes,
        imdb_id: record.imdb_id,
        box_office: record.box_office.filter(|b| b != "N/A"),
        tmdb_id: None,
        tagline: None,
        overview: None,
        budget: None,
        revenue: None,
        genres: None,
        production_companies: None,
        poster_url: None,
        backdrop_url: None,
        tmdb_rating: None,
        tmdb_vote_count: None,
        collection: None,
        credits: None,
    };

    if let Some((details, credits)) = metadata {
        view.tmdb_id = Some(details.id);
        view.tagline = details.tagline.filter(|t| !t.is_empty());
        view.overview = details.overview.filter(|o| !o.is_empty());
        // The catalog reports unknown financials as 0.
        view.budget = Some(details.budget).filter(|b| *b > 0);
        view.revenue = Some(details.revenue).filter(|r| *r > 0);
        view.genres = Some(details.genres.into_iter().map(|g| g.name).collect());
        view.production_companies = Some(
            details
                .production_companies
                .into_iter()
                .map(|c| c.name)
                .collect(),
        );
        view.poster_url = image_url(details.poster_path.as_deref(), ImageSize::W500);
        view.backdrop_url = image_url(details.backdrop_path.as_deref(), ImageSize::W1280);
        view.tmdb_rating = Some(details.vote_average);
        view.tmdb_vote_count = Some(details.vote_count);
        view.collection = details.belongs_to_collection.map(|c| CollectionSummary {
            tmdb_id: c.id,
            name: c.name,
        });
        view.credits = Some(fold_credits(&credits, CAST_LIMIT));
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::{CastMember, CrewMember, Genre};

    fn cast(id: u64, name: &str, character: &str, order: u32) -> CastMember {
        CastMember {
            id,
            name: name.to_string(),
            character: Some(character.to_string()),
            profile_path: None,
            order,
        }
    }

    fn crew(id: u64, name: &str, job: &str, department: &str) -> CrewMember {
        CrewMember {
            id,
            name: name.to_string(),
            job: job.to_string(),
            department: department.to_string(),
            profile_path: Some(format!("/{id}.jpg")),
        }
    }

    #[test]
    fn actor_who_also_wrote_gets_one_entry() {
        let credits = Credits {
            cast: vec![cast(7, "Jane Doe", "X", 0)],
            crew: vec![crew(7, "Jane Doe", "Screenplay", "Writing")],
        };
        let folded = fold_credits(&credits, CAST_LIMIT);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].person_id, 7);
        assert_eq!(folded[0].roles, vec!["Actor (X)", "Screenplay"]);
    }

    #[test]
    fn missing_character_is_labelled_na() {
        assert_eq!(cast_label(None), "Actor (N/A)");
        assert_eq!(cast_label(Some("  ")), "Actor (N/A)");
        assert_eq!(cast_label(Some("Neo")), "Actor (Neo)");
    }

    #[test]
    fn repeated_job_is_not_duplicated() {
        let credits = Credits {
            cast: vec![],
            crew: vec![
                crew(1, "A", "Director", "Directing"),
                crew(1, "A", "Director", "Directing"),
                crew(1, "A", "Producer", "Production"),
            ],
        };
        let folded = fold_credits(&credits, CAST_LIMIT);
        assert_eq!(folded[0].roles, vec!["Director", "Producer"]);
        assert_eq!(
            folded[0].profile_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w185/1.jpg")
        );
    }

    #[test]
    fn minor_crew_is_filtered_and_cast_is_capped_by_order() {
        let credits = Credits {
            cast: vec![cast(3, "Third", "C", 2), cast(1, "First", "A", 0), cast(2, "Second", "B", 1)],
            crew: vec![
                crew(9, "Grip", "Key Grip", "Crew"),
                crew(10, "Composer", "Original Music Composer", "Sound"),
                crew(11, "DoP", "Director of Photography", "Camera"),
            ],
        };
        let folded = fold_credits(&credits, 2);
        let names: Vec<_> = folded.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Composer", "DoP"]);
    }

    #[test]
    fn ratings_only_view_leaves_metadata_fields_empty() {
        let record = TitleRecord {
            title: "Obscure".into(),
            imdb_id: "tt9999999".into(),
            box_office: Some("N/A".into()),
            ..Default::default()
        };
        let view = merge_movie(record, None);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "Obscure");
        assert!(json["budget"].is_null());
        assert!(json["genres"].is_null());
        assert!(json["posterUrl"].is_null());
        assert!(json["credits"].is_null());
        assert!(json["boxOffice"].is_null());
    }

    #[test]
    fn metadata_fills_structured_fields() {
        let record = TitleRecord {
            title: "The Matrix".into(),
            director: "Lana Wachowski, Lilly Wachowski".into(),
            box_office: Some("$172,076,928".into()),
            ..Default::default()
        };
        let details = MovieDetails {
            id: 603,
            title: "The Matrix".into(),
            budget: 63_000_000,
            revenue: 0,
            genres: vec![Genre {
                id: 28,
                name: "Action".into(),
            }],
            poster_path: Some("/m.jpg".into()),
            ..Default::default()
        };
        let view = merge_movie(record, Some((details, Credits::default())));
        assert_eq!(view.tmdb_id, Some(603));
        assert_eq!(view.budget, Some(63_000_000));
        assert_eq!(view.revenue, None);
        assert_eq!(view.genres, Some(vec!["Action".to_string()]));
        assert_eq!(view.box_office.as_deref(), Some("$172,076,928"));
        assert_eq!(view.director, "Lana Wachowski, Lilly Wachowski");
        assert_eq!(
            view.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/m.jpg")
        );
    }
}
