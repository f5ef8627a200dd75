//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use rusqlite::Connection;
use mq_core::{Error, Result};

/// V1: catalog graph, users and favorites.
const V1_INITIAL: &str = r#"
-- Users
CREATE TABLE users (
    id                   TEXT PRIMARY KEY,
    email                TEXT UNIQUE NOT NULL,
    first_name           TEXT NOT NULL DEFAULT '',
    last_name            TEXT NOT NULL DEFAULT '',
    password_hash        TEXT NOT NULL,
    avatar               BLOB,
    notes                TEXT,
    onboarding_completed INTEGER NOT NULL DEFAULT 0,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL
);

-- Movies, keyed by catalog id
CREATE TABLE movies (
    id                 INTEGER PRIMARY KEY,
    name               TEXT NOT NULL DEFAULT '',
    alternative_name   TEXT NOT NULL DEFAULT '',
    en_name            TEXT NOT NULL DEFAULT '',
    poster_url         TEXT NOT NULL DEFAULT '',
    poster_preview_url TEXT NOT NULL DEFAULT '',
    runtime_minutes    INTEGER NOT NULL DEFAULT 0,
    premiere           TEXT NOT NULL DEFAULT '',
    year               INTEGER NOT NULL DEFAULT 0,
    rating_value       REAL NOT NULL DEFAULT 0.0,
    rating_votes       INTEGER NOT NULL DEFAULT 0,
    description        TEXT NOT NULL DEFAULT '',
    short_description  TEXT NOT NULL DEFAULT '',
    trailer_url        TEXT NOT NULL DEFAULT '',
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

-- Shared genre and person entities
CREATE TABLE genres (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL
);

CREATE TABLE persons (
    id         INTEGER PRIMARY KEY,
    name       TEXT NOT NULL DEFAULT '',
    en_name    TEXT NOT NULL DEFAULT '',
    photo_url  TEXT NOT NULL DEFAULT '',
    profession TEXT NOT NULL DEFAULT ''
);

-- Movie <-> Genre, Movie <-> Person
CREATE TABLE movie_genres (
    movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
    genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    PRIMARY KEY (movie_id, genre_id)
);

CREATE TABLE movie_persons (
    movie_id  INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
    person_id INTEGER NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
    position  INTEGER NOT NULL,
    PRIMARY KEY (movie_id, person_id)
);

-- User <-> Movie favorites
CREATE TABLE favorites (
    user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    movie_id   INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, movie_id)
);

-- Indexes
CREATE INDEX idx_movie_genres_genre  ON movie_genres(genre_id);
CREATE INDEX idx_movie_persons_person ON movie_persons(person_id);
CREATE INDEX idx_favorites_user      ON favorites(user_id);
CREATE INDEX idx_favorites_movie     ON favorites(movie_id);
"#;

/// V2: recently-watched relation (ordered) and the app-state singleton.
const V2_RECENTS_AND_APP_STATE: &str = r#"
CREATE TABLE recently_watched (
    user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    movie_id   INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
    watched_at TEXT NOT NULL,
    seq        INTEGER NOT NULL,
    PRIMARY KEY (user_id, movie_id)
);
CREATE INDEX idx_recently_watched_user ON recently_watched(user_id, seq);

CREATE TABLE app_state (
    id              INTEGER PRIMARY KEY CHECK (id = 1),
    theme           TEXT NOT NULL DEFAULT 'light',
    language        TEXT NOT NULL DEFAULT 'en',
    current_user_id TEXT REFERENCES users(id) ON DELETE SET NULL,
    updated_at      TEXT NOT NULL
);
"#;

/// Ordered list of (version, sql) pairs.
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL), (2, V2_RECENTS_AND_APP_STATE)];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;
        tracing::debug!(version, "applied migration");
    }

    Ok(())
}
