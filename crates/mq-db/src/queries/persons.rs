//! Person upsert and the movie <-> person join.

use std::collections::HashSet;

use rusqlite::Connection;
use mq_core::{Error, MovieId, Person, PersonId, Result};

use crate::models::{FromRow, PERSON_COLS};

/// Insert a person or refresh the fields of the existing one.
pub fn upsert_person(conn: &Connection, person: &Person) -> Result<()> {
    conn.execute(
        "INSERT INTO persons (id, name, en_name, photo_url, profession)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            en_name = excluded.en_name,
            photo_url = excluded.photo_url,
            profession = excluded.profession",
        rusqlite::params![
            person.id.get(),
            &person.name,
            &person.en_name,
            &person.photo_url,
            &person.profession,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Get a person by catalog id.
pub fn get_person(conn: &Connection, id: PersonId) -> Result<Option<Person>> {
    let q = format!("SELECT {PERSON_COLS} FROM persons p WHERE p.id = ?1");
    match conn.query_row(&q, [id.get()], Person::from_row) {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Replace the person set of a movie with `persons`, preserving their order.
///
/// Duplicate ids collapse onto the first occurrence.
pub fn replace_movie_persons(
    conn: &Connection,
    movie_id: MovieId,
    persons: &[Person],
) -> Result<()> {
    conn.execute(
        "DELETE FROM movie_persons WHERE movie_id = ?1",
        [movie_id.get()],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    let mut seen = HashSet::new();
    for (position, person) in persons.iter().enumerate() {
        if !seen.insert(person.id) {
            continue;
        }
        upsert_person(conn, person)?;
        conn.execute(
            "INSERT OR IGNORE INTO movie_persons (movie_id, person_id, position)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![movie_id.get(), person.id.get(), position as i64],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    }
    Ok(())
}

/// Persons of a movie in their stored order.
pub fn persons_for_movie(conn: &Connection, movie_id: MovieId) -> Result<Vec<Person>> {
    let q = format!(
        "SELECT {PERSON_COLS} FROM movie_persons mp
         JOIN persons p ON p.id = mp.person_id
         WHERE mp.movie_id = ?1
         ORDER BY mp.position ASC"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([movie_id.get()], Person::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}
