//! Favorite operations.

use chrono::Utc;
use rusqlite::Connection;
use mq_core::{Error, MovieId, Result, UserId};

/// Add a movie to a user's favorites. No-op if already favorited.
pub fn add_favorite(conn: &Connection, user_id: UserId, movie_id: MovieId) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR IGNORE INTO favorites (user_id, movie_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id.to_string(), movie_id.get(), &now],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Remove a movie from a user's favorites. Returns true if removed.
pub fn remove_favorite(conn: &Connection, user_id: UserId, movie_id: MovieId) -> Result<bool> {
    let n = conn
        .execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND movie_id = ?2",
            rusqlite::params![user_id.to_string(), movie_id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Flip membership and return the new state.
///
/// Not atomic on its own; callers run it inside a write transaction.
pub fn toggle_favorite(conn: &Connection, user_id: UserId, movie_id: MovieId) -> Result<bool> {
    if remove_favorite(conn, user_id, movie_id)? {
        Ok(false)
    } else {
        add_favorite(conn, user_id, movie_id)?;
        Ok(true)
    }
}

/// Check if a movie is in a user's favorites.
pub fn is_favorite(conn: &Connection, user_id: UserId, movie_id: MovieId) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM favorites WHERE user_id = ?1 AND movie_id = ?2",
        rusqlite::params![user_id.to_string(), movie_id.get()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Ids of a user's favorites, most recently added first.
pub fn list_favorite_ids(conn: &Connection, user_id: UserId) -> Result<Vec<MovieId>> {
    let mut stmt = conn
        .prepare(
            "SELECT movie_id FROM favorites WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC",
        )
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{init_memory_pool, PooledConnection};
    use crate::queries::{movies, users};
    use mq_core::{Movie, User};

    fn setup() -> (PooledConnection, UserId, MovieId) {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user = User {
            id: UserId::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: "fav@example.com".into(),
            password_hash: "h".into(),
            avatar: None,
            notes: None,
            onboarding_completed: true,
        };
        let uid = users::upsert_user(&conn, &user).unwrap();
        let mid = movies::upsert_movie(&conn, &Movie::new(MovieId::from(435))).unwrap();
        (conn, uid, mid)
    }

    #[test]
    fn add_and_remove() {
        let (conn, uid, mid) = setup();
        add_favorite(&conn, uid, mid).unwrap();
        // Duplicate add is a no-op.
        add_favorite(&conn, uid, mid).unwrap();
        assert_eq!(list_favorite_ids(&conn, uid).unwrap(), vec![mid]);

        assert!(remove_favorite(&conn, uid, mid).unwrap());
        assert!(!remove_favorite(&conn, uid, mid).unwrap());
        assert!(!is_favorite(&conn, uid, mid).unwrap());
    }

    #[test]
    fn toggle_flips_membership() {
        let (conn, uid, mid) = setup();
        assert!(toggle_favorite(&conn, uid, mid).unwrap());
        assert!(is_favorite(&conn, uid, mid).unwrap());
        assert!(!toggle_favorite(&conn, uid, mid).unwrap());
        assert!(!is_favorite(&conn, uid, mid).unwrap());
    }

    #[test]
    fn list_most_recent_first() {
        let (conn, uid, first) = setup();
        let second = movies::upsert_movie(&conn, &Movie::new(MovieId::from(436))).unwrap();
        add_favorite(&conn, uid, first).unwrap();
        add_favorite(&conn, uid, second).unwrap();
        assert_eq!(list_favorite_ids(&conn, uid).unwrap(), vec![second, first]);
    }
}
