//! Movie upsert and lookup, including the genre and person sets.
//!
//! [`upsert_movie`] touches several tables and must run inside a
//! transaction; [`LocalStore`](crate::store::LocalStore) takes care of that.

use chrono::Utc;
use rusqlite::Connection;
use mq_core::{Error, Movie, MovieId, Result};

use crate::models::{FromRow, MovieRow, MOVIE_COLS};
use crate::queries::{genres, persons};

/// Insert a movie or update the existing one in place.
///
/// Genres and persons are resolved by natural key and the movie's
/// relationship sets are replaced with the new ones, so associations from a
/// previous version of the movie are dropped. Viewer flags on `movie` are
/// ignored.
pub fn upsert_movie(conn: &Connection, movie: &Movie) -> Result<MovieId> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO movies (id, name, alternative_name, en_name, poster_url,
            poster_preview_url, runtime_minutes, premiere, year, rating_value,
            rating_votes, description, short_description, trailer_url,
            created_at, updated_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?15)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            alternative_name = excluded.alternative_name,
            en_name = excluded.en_name,
            poster_url = excluded.poster_url,
            poster_preview_url = excluded.poster_preview_url,
            runtime_minutes = excluded.runtime_minutes,
            premiere = excluded.premiere,
            year = excluded.year,
            rating_value = excluded.rating_value,
            rating_votes = excluded.rating_votes,
            description = excluded.description,
            short_description = excluded.short_description,
            trailer_url = excluded.trailer_url,
            updated_at = excluded.updated_at",
        rusqlite::params![
            movie.id.get(),
            &movie.name,
            &movie.alternative_name,
            &movie.en_name,
            &movie.poster_url,
            &movie.poster_preview_url,
            movie.runtime_minutes,
            &movie.premiere,
            movie.year,
            movie.rating.value,
            movie.rating.votes,
            &movie.description,
            &movie.short_description,
            &movie.trailer_url,
            &now,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    genres::replace_movie_genres(conn, movie.id, &movie.genres)?;
    persons::replace_movie_persons(conn, movie.id, &movie.persons)?;

    Ok(movie.id)
}

/// Get a movie with its genres and persons. Viewer flags are cleared.
pub fn get_movie(conn: &Connection, id: MovieId) -> Result<Option<Movie>> {
    let q = format!("SELECT {MOVIE_COLS} FROM movies WHERE id = ?1");
    let row = match conn.query_row(&q, [id.get()], MovieRow::from_row) {
        Ok(r) => r,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(Error::database(e.to_string())),
    };
    let genres = genres::genres_for_movie(conn, id)?;
    let persons = persons::persons_for_movie(conn, id)?;
    Ok(Some(row.into_movie(genres, persons)))
}

/// Whether a movie with this catalog id is stored.
pub fn movie_exists(conn: &Connection, id: MovieId) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM movies WHERE id = ?1",
        [id.get()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Load several movies, keeping the order of `ids` and skipping unknown ones.
pub fn get_movies(conn: &Connection, ids: &[MovieId]) -> Result<Vec<Movie>> {
    let mut movies = Vec::with_capacity(ids.len());
    for &id in ids {
        if let Some(movie) = get_movie(conn, id)? {
            movies.push(movie);
        }
    }
    Ok(movies)
}
