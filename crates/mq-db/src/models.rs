//! Row models and their mapping to domain types.
//!
//! Domain types that map one-to-one onto a table implement [`FromRow`].
//! Movies need their genre and person sets joined in, so the bare table row
//! is [`MovieRow`] and is completed by [`MovieRow::into_movie`].

use mq_core::{Genre, Movie, MovieId, Person, PersonId, Rating, User, UserId};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Build a value from a `rusqlite::Row` selected with the matching column list.
pub trait FromRow: Sized {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self>;
}

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(T::from(uuid))
}

fn parse_opt_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<T>> {
    let s: Option<String> = row.get(idx)?;
    match s {
        Some(v) => {
            let uuid = Uuid::parse_str(&v).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            Ok(Some(T::from(uuid)))
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Column list matching [`User::from_row`].
pub const USER_COLS: &str =
    "id, email, first_name, last_name, password_hash, avatar, notes, onboarding_completed";

impl FromRow for User {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            password_hash: row.get(4)?,
            avatar: row.get(5)?,
            notes: row.get(6)?,
            onboarding_completed: row.get::<_, i32>(7)? != 0,
        })
    }
}

// ---------------------------------------------------------------------------
// Genre / Person
// ---------------------------------------------------------------------------

impl FromRow for Genre {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self { name: row.get(0)? })
    }
}

/// Column list matching [`Person::from_row`], qualified for joins.
pub const PERSON_COLS: &str = "p.id, p.name, p.en_name, p.photo_url, p.profession";

impl FromRow for Person {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: PersonId::from(row.get::<_, i64>(0)?),
            name: row.get(1)?,
            en_name: row.get(2)?,
            photo_url: row.get(3)?,
            profession: row.get(4)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Movie
// ---------------------------------------------------------------------------

/// Column list matching [`MovieRow::from_row`].
pub const MOVIE_COLS: &str = "id, name, alternative_name, en_name, poster_url,
    poster_preview_url, runtime_minutes, premiere, year, rating_value,
    rating_votes, description, short_description, trailer_url";

/// A `movies` row before its relationship sets are attached.
#[derive(Debug, Clone)]
pub struct MovieRow {
    pub id: MovieId,
    pub name: String,
    pub alternative_name: String,
    pub en_name: String,
    pub poster_url: String,
    pub poster_preview_url: String,
    pub runtime_minutes: i32,
    pub premiere: String,
    pub year: i32,
    pub rating_value: f64,
    pub rating_votes: i64,
    pub description: String,
    pub short_description: String,
    pub trailer_url: String,
}

impl FromRow for MovieRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: MovieId::from(row.get::<_, i64>(0)?),
            name: row.get(1)?,
            alternative_name: row.get(2)?,
            en_name: row.get(3)?,
            poster_url: row.get(4)?,
            poster_preview_url: row.get(5)?,
            runtime_minutes: row.get(6)?,
            premiere: row.get(7)?,
            year: row.get(8)?,
            rating_value: row.get(9)?,
            rating_votes: row.get(10)?,
            description: row.get(11)?,
            short_description: row.get(12)?,
            trailer_url: row.get(13)?,
        })
    }
}

impl MovieRow {
    /// Attach the relationship sets. Viewer flags start cleared.
    pub fn into_movie(self, genres: Vec<Genre>, persons: Vec<Person>) -> Movie {
        Movie {
            id: self.id,
            name: self.name,
            alternative_name: self.alternative_name,
            en_name: self.en_name,
            poster_url: self.poster_url,
            poster_preview_url: self.poster_preview_url,
            runtime_minutes: self.runtime_minutes,
            premiere: self.premiere,
            year: self.year,
            genres,
            rating: Rating {
                value: self.rating_value,
                votes: self.rating_votes,
            },
            description: self.description,
            short_description: self.short_description,
            persons,
            trailer_url: self.trailer_url,
            is_favorite: false,
            is_recent: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The `app_state` singleton row. The current user is a bare reference.
#[derive(Debug, Clone)]
pub struct AppStateRow {
    pub theme: String,
    pub language: String,
    pub current_user_id: Option<UserId>,
    pub updated_at: String,
}

impl FromRow for AppStateRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            theme: row.get(0)?,
            language: row.get(1)?,
            current_user_id: parse_opt_id(row, 2)?,
            updated_at: row.get(3)?,
        })
    }
}
