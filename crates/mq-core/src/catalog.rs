//! Catalog domain types: movies and the genres and people they share.
//!
//! A [`Movie`] as handed to callers is the canonical stored record plus two
//! per-viewer flags. The flags are relationship facts about the current user
//! and are never part of what gets persisted.

use serde::{Deserialize, Serialize};

use crate::ids::{MovieId, PersonId};

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// Aggregate audience rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average score, typically 0.0 - 10.0.
    pub value: f64,
    /// Number of votes behind `value`.
    pub votes: i64,
}

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

/// A genre label. The name is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

/// A cast or crew member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub en_name: String,
    pub photo_url: String,
    pub profession: String,
}

impl Person {
    /// Localised name, falling back to the English one.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.en_name
        } else {
            &self.name
        }
    }
}

// ---------------------------------------------------------------------------
// Movie
// ---------------------------------------------------------------------------

/// A catalog movie.
///
/// Absent catalog fields are represented by their empty value (empty string,
/// zero, empty list) so callers never branch on presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub name: String,
    pub alternative_name: String,
    pub en_name: String,
    pub poster_url: String,
    pub poster_preview_url: String,
    pub runtime_minutes: i32,
    pub premiere: String,
    pub year: i32,
    pub genres: Vec<Genre>,
    pub rating: Rating,
    pub description: String,
    pub short_description: String,
    pub persons: Vec<Person>,
    pub trailer_url: String,
    /// Whether the current viewer has this movie in their favorites.
    #[serde(default)]
    pub is_favorite: bool,
    /// Whether the current viewer has this movie in their recently watched.
    #[serde(default)]
    pub is_recent: bool,
}

impl Movie {
    /// A movie carrying only its id; every other field holds its default.
    pub fn new(id: MovieId) -> Self {
        Self {
            id,
            name: String::new(),
            alternative_name: String::new(),
            en_name: String::new(),
            poster_url: String::new(),
            poster_preview_url: String::new(),
            runtime_minutes: 0,
            premiere: String::new(),
            year: 0,
            genres: Vec::new(),
            rating: Rating::default(),
            description: String::new(),
            short_description: String::new(),
            persons: Vec::new(),
            trailer_url: String::new(),
            is_favorite: false,
            is_recent: false,
        }
    }

    /// First non-empty title among the localised, alternative and English names.
    pub fn display_title(&self) -> &str {
        [&self.name, &self.alternative_name, &self.en_name]
            .into_iter()
            .find(|t| !t.is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Best poster URL to show: full size if known, else the preview.
    pub fn best_poster_url(&self) -> Option<&str> {
        [&self.poster_url, &self.poster_preview_url]
            .into_iter()
            .find(|u| !u.is_empty())
            .map(String::as_str)
    }

    /// The viewer-agnostic form of this movie, as it is stored.
    #[must_use]
    pub fn canonical(mut self) -> Self {
        self.is_favorite = false;
        self.is_recent = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_title_falls_back() {
        let mut movie = Movie::new(MovieId::from(1));
        assert_eq!(movie.display_title(), "");

        movie.en_name = "The Green Mile".into();
        assert_eq!(movie.display_title(), "The Green Mile");

        movie.name = "Зелёная миля".into();
        assert_eq!(movie.display_title(), "Зелёная миля");
    }

    #[test]
    fn best_poster_prefers_full_size() {
        let mut movie = Movie::new(MovieId::from(1));
        assert_eq!(movie.best_poster_url(), None);

        movie.poster_preview_url = "https://img/preview.jpg".into();
        assert_eq!(movie.best_poster_url(), Some("https://img/preview.jpg"));

        movie.poster_url = "https://img/full.jpg".into();
        assert_eq!(movie.best_poster_url(), Some("https://img/full.jpg"));
    }

    #[test]
    fn canonical_clears_viewer_flags() {
        let mut movie = Movie::new(MovieId::from(7));
        movie.is_favorite = true;
        movie.is_recent = true;
        let canonical = movie.canonical();
        assert!(!canonical.is_favorite);
        assert!(!canonical.is_recent);
    }

    #[test]
    fn person_display_name() {
        let person = Person {
            id: PersonId::from(9144),
            name: String::new(),
            en_name: "Tom Hanks".into(),
            photo_url: String::new(),
            profession: "actor".into(),
        };
        assert_eq!(person.display_name(), "Tom Hanks");
    }
}
