//! User upsert and lookup. The email column is the natural key.

use chrono::Utc;
use rusqlite::Connection;
use mq_core::{Error, Result, User, UserId};

use crate::models::{FromRow, USER_COLS};

/// Insert a user, or overwrite every field of the user with the same email.
///
/// An existing row keeps its id; the returned id is the stored one.
pub fn upsert_user(conn: &Connection, user: &User) -> Result<UserId> {
    if user.email.trim().is_empty() {
        return Err(Error::Validation("user email is required".into()));
    }
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO users (id, email, first_name, last_name, password_hash, avatar,
            notes, onboarding_completed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
         ON CONFLICT(email) DO UPDATE SET
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            password_hash = excluded.password_hash,
            avatar = excluded.avatar,
            notes = excluded.notes,
            onboarding_completed = excluded.onboarding_completed,
            updated_at = excluded.updated_at",
        rusqlite::params![
            user.id.to_string(),
            &user.email,
            &user.first_name,
            &user.last_name,
            &user.password_hash,
            &user.avatar,
            &user.notes,
            user.onboarding_completed as i32,
            &now,
        ],
    )
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed: users.id") {
            Error::Conflict(format!("User id {} already belongs to another email", user.id))
        } else {
            Error::database(e.to_string())
        }
    })?;

    let id: String = conn
        .query_row("SELECT id FROM users WHERE email = ?1", [&user.email], |row| {
            row.get(0)
        })
        .map_err(|e| Error::database(e.to_string()))?;
    id.parse()
        .map_err(|e: uuid::Error| Error::database(e.to_string()))
}

/// Get a user by email.
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let q = format!("SELECT {USER_COLS} FROM users WHERE email = ?1");
    match conn.query_row(&q, [email], User::from_row) {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get a user by primary key.
pub fn get_user_by_id(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let q = format!("SELECT {USER_COLS} FROM users WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], User::from_row) {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Whether a user row with this id exists.
pub fn user_exists(conn: &Connection, id: UserId) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE id = ?1",
        [id.to_string()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}
