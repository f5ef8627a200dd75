//! Genre look-up-or-create and the movie <-> genre join.

use rusqlite::Connection;
use mq_core::{Error, Genre, MovieId, Result};

use crate::models::FromRow;

/// Return the row id of the genre named `name`, creating it if absent.
pub fn resolve_genre(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO genres (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        [name],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    conn.query_row("SELECT id FROM genres WHERE name = ?1", [name], |row| {
        row.get(0)
    })
    .map_err(|e| Error::database(e.to_string()))
}

/// Replace the genre set of a movie with `genres`, preserving their order.
///
/// Duplicate names collapse onto the first occurrence.
pub fn replace_movie_genres(conn: &Connection, movie_id: MovieId, genres: &[Genre]) -> Result<()> {
    conn.execute(
        "DELETE FROM movie_genres WHERE movie_id = ?1",
        [movie_id.get()],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    for (position, genre) in genres.iter().enumerate() {
        let genre_id = resolve_genre(conn, &genre.name)?;
        conn.execute(
            "INSERT OR IGNORE INTO movie_genres (movie_id, genre_id, position)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![movie_id.get(), genre_id, position as i64],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    }
    Ok(())
}

/// Genres of a movie in their stored order.
pub fn genres_for_movie(conn: &Connection, movie_id: MovieId) -> Result<Vec<Genre>> {
    let mut stmt = conn
        .prepare(
            "SELECT g.name FROM movie_genres mg
             JOIN genres g ON g.id = mg.genre_id
             WHERE mg.movie_id = ?1
             ORDER BY mg.position ASC",
        )
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([movie_id.get()], Genre::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Every stored genre, alphabetically.
pub fn list_genres(conn: &Connection) -> Result<Vec<Genre>> {
    let mut stmt = conn
        .prepare("SELECT name FROM genres ORDER BY name ASC")
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Genre::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}
