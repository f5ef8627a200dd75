//! Wire shapes of the catalog API.
//!
//! The service omits or nulls fields freely, so every field is optional and
//! unknown fields are ignored. Turning these into domain types is the
//! repository's job.

use serde::{Deserialize, Deserializer};

/// Lists may arrive as `null` as well as being left out.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

/// A page of movies from `/movie` or `/movie/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieListDto {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub docs: Vec<MovieDto>,
    pub total: Option<i64>,
    pub page: Option<i64>,
    pub pages: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub alternative_name: Option<String>,
    pub en_name: Option<String>,
    pub poster: Option<PosterDto>,
    pub movie_length: Option<i32>,
    pub premiere: Option<PremiereDto>,
    pub year: Option<i32>,
    pub genres: Option<Vec<GenreDto>>,
    pub rating: Option<ScoreDto>,
    pub votes: Option<VotesDto>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub persons: Option<Vec<MoviePersonDto>>,
    pub videos: Option<VideosDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterDto {
    pub url: Option<String>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PremiereDto {
    pub world: Option<String>,
    pub russia: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreDto {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreDto {
    pub kp: Option<f64>,
    pub imdb: Option<f64>,
}

/// Vote counts. The service sometimes sends these as floats.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VotesDto {
    pub kp: Option<f64>,
    pub imdb: Option<f64>,
}

/// A person as embedded in a movie record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePersonDto {
    pub id: Option<i64>,
    pub photo: Option<String>,
    pub name: Option<String>,
    pub en_name: Option<String>,
    pub profession: Option<String>,
    pub en_profession: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideosDto {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trailers: Vec<TrailerDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrailerDto {
    pub url: Option<String>,
    pub name: Option<String>,
    pub site: Option<String>,
}

// ---------------------------------------------------------------------------
// Persons
// ---------------------------------------------------------------------------

/// A page of people from `/person`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonListDto {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub docs: Vec<PersonDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub en_name: Option<String>,
    pub photo: Option<String>,
    pub profession: Option<Vec<ProfessionDto>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfessionDto {
    pub value: Option<String>,
}
