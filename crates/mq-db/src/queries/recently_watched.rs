//! Recently-watched operations.
//!
//! Each row carries a per-table sequence number so the list can be returned
//! most recent first. Re-adding a movie moves it to the front instead of
//! duplicating it.

use chrono::Utc;
use rusqlite::Connection;
use mq_core::{Error, MovieId, Result, UserId};

/// Record that a user watched a movie.
pub fn add_recently_watched(conn: &Connection, user_id: UserId, movie_id: MovieId) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO recently_watched (user_id, movie_id, watched_at, seq)
         VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(seq), 0) + 1 FROM recently_watched))
         ON CONFLICT(user_id, movie_id) DO UPDATE SET
            watched_at = excluded.watched_at,
            seq = excluded.seq",
        rusqlite::params![user_id.to_string(), movie_id.get(), &now],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Remove a movie from a user's recently watched. Returns true if removed.
pub fn remove_recently_watched(
    conn: &Connection,
    user_id: UserId,
    movie_id: MovieId,
) -> Result<bool> {
    let n = conn
        .execute(
            "DELETE FROM recently_watched WHERE user_id = ?1 AND movie_id = ?2",
            rusqlite::params![user_id.to_string(), movie_id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Check if a movie is in a user's recently watched.
pub fn is_recently_watched(conn: &Connection, user_id: UserId, movie_id: MovieId) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM recently_watched WHERE user_id = ?1 AND movie_id = ?2",
        rusqlite::params![user_id.to_string(), movie_id.get()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Ids of a user's recently watched movies, most recent first.
pub fn list_recently_watched_ids(conn: &Connection, user_id: UserId) -> Result<Vec<MovieId>> {
    let mut stmt = conn
        .prepare("SELECT movie_id FROM recently_watched WHERE user_id = ?1 ORDER BY seq DESC")
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([user_id.to_string()], |row| {
            row.get::<_, i64>(0).map(MovieId::from)
        })
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}
