//! The `app_state` singleton row.

use chrono::Utc;
use rusqlite::Connection;
use mq_core::{Error, Language, Result, Theme, UserId};

use crate::models::{AppStateRow, FromRow};

const COLS: &str = "theme, language, current_user_id, updated_at";

/// Return the app state, creating the default row on first access.
pub fn get_or_create_app_state(conn: &Connection) -> Result<AppStateRow> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR IGNORE INTO app_state (id, theme, language, current_user_id, updated_at)
         VALUES (1, ?1, ?2, NULL, ?3)",
        rusqlite::params![Theme::default().to_string(), Language::default().code(), &now],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    let q = format!("SELECT {COLS} FROM app_state WHERE id = 1");
    conn.query_row(&q, [], AppStateRow::from_row)
        .map_err(|e| Error::database(e.to_string()))
}

/// Overwrite every field of the app state.
pub fn update_app_state(
    conn: &Connection,
    theme: Theme,
    language: Language,
    current_user_id: Option<UserId>,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO app_state (id, theme, language, current_user_id, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            theme = excluded.theme,
            language = excluded.language,
            current_user_id = excluded.current_user_id,
            updated_at = excluded.updated_at",
        rusqlite::params![
            theme.to_string(),
            language.code(),
            current_user_id.map(|id| id.to_string()),
            &now,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn default_created_once() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let row = get_or_create_app_state(&conn).unwrap();
        assert_eq!(row.theme, "light");
        assert_eq!(row.language, "en");
        assert!(row.current_user_id.is_none());

        get_or_create_app_state(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM app_state", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn update_overwrites() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        update_app_state(&conn, Theme::Dark, Language::Russian, None).unwrap();
        let row = get_or_create_app_state(&conn).unwrap();
        assert_eq!(row.theme, "dark");
        assert_eq!(row.language, "ru");
    }

    #[test]
    fn dangling_user_reference_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let result = update_app_state(&conn, Theme::Light, Language::English, Some(UserId::new()));
        assert!(result.is_err());
    }
}
