//! Catalog DTOs to domain types.
//!
//! Absent fields become empty values. Records without an id have no natural
//! key and are dropped. Duplicates within one response collapse onto the
//! first occurrence.

use std::collections::HashSet;

use mq_catalog::dto::{
    GenreDto, MovieDto, MovieListDto, MoviePersonDto, PersonDto, PersonListDto,
};
use mq_core::{Genre, Movie, MovieId, Person, PersonId, Rating};

/// Map a list response, dropping id-less records and repeated ids.
pub fn movies_from_list(list: MovieListDto) -> Vec<Movie> {
    let mut seen = HashSet::new();
    let mut movies = Vec::with_capacity(list.docs.len());
    for dto in list.docs {
        match movie_from_dto(dto) {
            Some(movie) if seen.insert(movie.id) => movies.push(movie),
            Some(movie) => tracing::debug!(id = %movie.id, "Duplicate movie in response"),
            None => tracing::warn!("Skipping catalog movie without an id"),
        }
    }
    movies
}

pub fn movie_from_dto(dto: MovieDto) -> Option<Movie> {
    let mut movie = Movie::new(MovieId::from(dto.id?));

    movie.name = dto.name.unwrap_or_default();
    movie.alternative_name = dto.alternative_name.unwrap_or_default();
    movie.en_name = dto.en_name.unwrap_or_default();
    if let Some(poster) = dto.poster {
        movie.poster_url = poster.url.unwrap_or_default();
        movie.poster_preview_url = poster.preview_url.unwrap_or_default();
    }
    movie.runtime_minutes = dto.movie_length.unwrap_or_default();
    movie.premiere = dto
        .premiere
        .and_then(|p| p.world.or(p.russia))
        .unwrap_or_default();
    movie.year = dto.year.unwrap_or_default();
    movie.genres = genres(dto.genres.unwrap_or_default());
    movie.rating = Rating {
        value: dto
            .rating
            .and_then(|r| r.kp.or(r.imdb))
            .unwrap_or_default(),
        votes: dto
            .votes
            .and_then(|v| v.kp.or(v.imdb))
            .map(|v| v as i64)
            .unwrap_or_default(),
    };
    movie.description = dto.description.unwrap_or_default();
    movie.short_description = dto.short_description.unwrap_or_default();
    movie.persons = dedupe_persons(
        dto.persons
            .unwrap_or_default()
            .into_iter()
            .filter_map(person_from_movie_dto),
    );
    movie.trailer_url = dto
        .videos
        .and_then(|v| v.trailers.into_iter().find_map(|t| t.url.filter(|u| !u.is_empty())))
        .unwrap_or_default();

    Some(movie)
}

fn genres(dtos: Vec<GenreDto>) -> Vec<Genre> {
    let mut seen = HashSet::new();
    dtos.into_iter()
        .filter_map(|g| g.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .map(Genre::new)
        .collect()
}

fn dedupe_persons(persons: impl Iterator<Item = Person>) -> Vec<Person> {
    let mut seen = HashSet::new();
    persons.filter(|p| seen.insert(p.id)).collect()
}

/// A person embedded in a movie record.
pub fn person_from_movie_dto(dto: MoviePersonDto) -> Option<Person> {
    Some(Person {
        id: PersonId::from(dto.id?),
        name: dto.name.unwrap_or_default(),
        en_name: dto.en_name.unwrap_or_default(),
        photo_url: dto.photo.unwrap_or_default(),
        profession: dto.profession.or(dto.en_profession).unwrap_or_default(),
    })
}

/// A person from the `/person` endpoint. Multiple professions are joined.
pub fn person_from_dto(dto: PersonDto) -> Option<Person> {
    let profession = dto
        .profession
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.value)
        .collect::<Vec<_>>()
        .join(", ");
    Some(Person {
        id: PersonId::from(dto.id?),
        name: dto.name.unwrap_or_default(),
        en_name: dto.en_name.unwrap_or_default(),
        photo_url: dto.photo.unwrap_or_default(),
        profession,
    })
}

pub fn persons_from_list(list: PersonListDto) -> Vec<Person> {
    dedupe_persons(list.docs.into_iter().filter_map(person_from_dto))
}
