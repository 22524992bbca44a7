use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cmp::Ordering;

use super::{check_page, Catalogs};
use crate::error::{Error, Result};
use crate::format::{cap_total_pages, extract_year, image_url, truncate_text};
use crate::format::{ImageSize, BIOGRAPHY_CAP};
use crate::merge::{cast_label, RoleFolder};
use crate::resolve::non_blank;
use crate::tmdb::{PersonCredit, PersonMovieCredits};

pub const DEFAULT_FILMOGRAPHY_LIMIT: u32 = 50;
pub const MAX_FILMOGRAPHY_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SearchPersonInput {
    #[schemars(description = "Person name to search for")]
    pub query: String,
    #[schemars(description = "Page number for pagination (20 results per page)")]
    pub page: Option<u32>,
}

pub async fn search_person(catalogs: &Catalogs, input: SearchPersonInput) -> Result<Value> {
    check_page(input.page)?;
    let result = catalogs.tmdb.search_person(&input.query, input.page).await?;

    let people: Vec<Value> = result
        .results
        .iter()
        .map(|person| {
            let known_for: Vec<Value> = person
                .known_for
                .iter()
                .take(3)
                .map(|k| {
                    json!({
                        "title": k.title.as_ref().or(k.name.as_ref()),
                        "year": extract_year(k.release_date.as_deref().or(k.first_air_date.as_deref())),
                        "tmdbId": k.id,
                    })
                })
                .collect();
            json!({
                "tmdbId": person.id,
                "name": person.name,
                "knownForDepartment": person.known_for_department,
                "profileImageUrl": image_url(person.profile_path.as_deref(), ImageSize::W185),
                "knownFor": known_for,
            })
        })
        .collect();

    Ok(json!({
        "results": people,
        "totalResults": result.total_results,
        "page": result.page,
        "totalPages": cap_total_pages(result.total_pages),
    }))
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    #[schemars(description = "TMDB person ID (use search_person to find this)")]
    pub person_id: u64,
}

pub async fn get_person_details(catalogs: &Catalogs, input: PersonInput) -> Result<Value> {
    let person = catalogs.tmdb.person_details(input.person_id).await?;
    Ok(json!({
        "tmdbId": person.id,
        "name": person.name,
        "knownFor": person.known_for_department,
        "biography": non_blank(person.biography.as_deref()).unwrap_or("No biography available."),
        "birthday": person.birthday,
        "deathday": person.deathday,
        "placeOfBirth": person.place_of_birth,
        "imdbId": person.imdb_id,
        "profileImageUrl": image_url(person.profile_path.as_deref(), ImageSize::W500),
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CreditRole {
    Director,
    Actor,
    Writer,
    Producer,
    #[default]
    All,
}

impl CreditRole {
    fn includes(&self, role: CreditRole) -> bool {
        *self == CreditRole::All || *self == role
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilmographySort {
    #[default]
    Date,
    Rating,
    Title,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilmographyInput {
    #[schemars(description = "TMDB person ID (use search_person to find this)")]
    pub person_id: u64,
    #[schemars(description = "Filter by role: 'director', 'actor', 'writer', 'producer', or 'all' (default)")]
    pub role: Option<CreditRole>,
    #[schemars(description = "Sort by 'date' (newest first, default), 'rating', or 'title'")]
    pub sort_by: Option<FilmographySort>,
    #[schemars(description = "Maximum number of credits to return (1-100, default 50)")]
    pub limit: Option<u32>,
}

fn is_writing(credit: &PersonCredit) -> bool {
    matches!(
        credit.job.as_deref(),
        Some("Writer" | "Screenplay" | "Story")
    ) || credit.department.as_deref() == Some("Writing")
}

fn is_producing(credit: &PersonCredit) -> bool {
    matches!(
        credit.job.as_deref(),
        Some("Producer" | "Executive Producer")
    )
}

/// One row per movie, carrying every label the person holds on it.
pub fn fold_filmography(
    credits: &PersonMovieCredits,
    role: CreditRole,
) -> Vec<(PersonCredit, Vec<String>)> {
    let mut folder: RoleFolder<u64, PersonCredit> = RoleFolder::default();

    if role.includes(CreditRole::Actor) {
        for credit in &credits.cast {
            folder.add(credit.id, cast_label(credit.character.as_deref()), || {
                credit.clone()
            });
        }
    }

    let mut add_crew = |filter: fn(&PersonCredit) -> bool| {
        for credit in credits.crew.iter().filter(|c| filter(c)) {
            let label = credit.job.clone().unwrap_or_else(|| "Unknown".to_string());
            folder.add(credit.id, label, || credit.clone());
        }
    };
    if role.includes(CreditRole::Director) {
        add_crew(|c| c.job.as_deref() == Some("Director"));
    }
    if role.includes(CreditRole::Writer) {
        add_crew(is_writing);
    }
    if role.includes(CreditRole::Producer) {
        add_crew(is_producing);
    }

    folder.into_entries()
}

pub fn sort_filmography(rows: &mut [(PersonCredit, Vec<String>)], sort: FilmographySort) {
    match sort {
        FilmographySort::Date => rows.sort_by(|(a, _), (b, _)| {
            let a = a.release_date.as_deref().filter(|d| !d.is_empty()).unwrap_or("0000");
            let b = b.release_date.as_deref().filter(|d| !d.is_empty()).unwrap_or("0000");
            b.cmp(a)
        }),
        FilmographySort::Rating => rows.sort_by(|(a, _), (b, _)| {
            b.vote_average
                .partial_cmp(&a.vote_average)
                .unwrap_or(Ordering::Equal)
        }),
        FilmographySort::Title => {
            rows.sort_by_key(|(credit, _)| credit.title.to_lowercase())
        }
    }
}

pub async fn get_filmography(catalogs: &Catalogs, input: FilmographyInput) -> Result<Value> {
    let limit = input.limit.unwrap_or(DEFAULT_FILMOGRAPHY_LIMIT);
    if !(1..=MAX_FILMOGRAPHY_LIMIT).contains(&limit) {
        return Err(Error::validation(format!(
            "limit must be between 1 and {MAX_FILMOGRAPHY_LIMIT}"
        )));
    }
    let role = input.role.unwrap_or_default();
    let sort = input.sort_by.unwrap_or_default();

    let tmdb = catalogs.tmdb.as_ref();
    let (person, credits) = tokio::try_join!(
        tmdb.person_details(input.person_id),
        tmdb.person_movie_credits(input.person_id)
    )?;

    let mut rows = fold_filmography(&credits, role);
    let total = rows.len();
    sort_filmography(&mut rows, sort);

    let filmography: Vec<Value> = rows
        .iter()
        .take(limit as usize)
        .map(|(credit, roles)| {
            json!({
                "tmdbId": credit.id,
                "title": credit.title,
                "year": extract_year(credit.release_date.as_deref()),
                "roles": roles,
                "tmdbRating": credit.vote_average,
                "voteCount": credit.vote_count,
                "posterUrl": image_url(credit.poster_path.as_deref(), ImageSize::W185),
            })
        })
        .collect();

    Ok(json!({
        "person": {
            "tmdbId": person.id,
            "name": person.name,
            "knownFor": person.known_for_department,
            "birthday": person.birthday,
            "deathday": person.deathday,
            "placeOfBirth": person.place_of_birth,
            "biography": truncate_text(person.biography.as_deref().unwrap_or_default(), BIOGRAPHY_CAP),
            "profileImageUrl": image_url(person.profile_path.as_deref(), ImageSize::W185),
            "imdbId": person.imdb_id,
        },
        "filmography": filmography,
        "totalCredits": total,
        "filters": {
            "role": role,
            "sortBy": sort,
            "limit": limit,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit(id: u64, title: &str, date: &str) -> PersonCredit {
        PersonCredit {
            id,
            title: title.to_string(),
            release_date: Some(date.to_string()),
            ..Default::default()
        }
    }

    fn sample() -> PersonMovieCredits {
        PersonMovieCredits {
            cast: vec![PersonCredit {
                character: Some("Himself".into()),
                ..credit(1, "Doc", "2001-01-01")
            }],
            crew: vec![
                PersonCredit {
                    job: Some("Director".into()),
                    department: Some("Directing".into()),
                    ..credit(1, "Doc", "2001-01-01")
                },
                PersonCredit {
                    job: Some("Screenplay".into()),
                    department: Some("Writing".into()),
                    ..credit(2, "Drama", "2010-05-05")
                },
                PersonCredit {
                    job: Some("Executive Producer".into()),
                    department: Some("Production".into()),
                    ..credit(3, "Action", "")
                },
            ],
        }
    }

    #[test]
    fn same_movie_folds_into_one_row() {
        let rows = fold_filmography(&sample(), CreditRole::All);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].0.id, 1);
        assert_eq!(rows[0].1, vec!["Actor (Himself)", "Director"]);
    }

    #[test]
    fn role_filter_limits_rows() {
        let rows = fold_filmography(&sample(), CreditRole::Writer);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, vec!["Screenplay"]);
        assert!(fold_filmography(&sample(), CreditRole::Actor)
            .iter()
            .all(|(_, roles)| roles.iter().all(|r| r.starts_with("Actor"))));
    }

    #[test]
    fn date_sort_puts_undated_last() {
        let mut rows = fold_filmography(&sample(), CreditRole::All);
        sort_filmography(&mut rows, FilmographySort::Date);
        let ids: Vec<_> = rows.iter().map(|(c, _)| c.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        sort_filmography(&mut rows, FilmographySort::Title);
        let titles: Vec<_> = rows.iter().map(|(c, _)| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Action", "Doc", "Drama"]);
    }
}
