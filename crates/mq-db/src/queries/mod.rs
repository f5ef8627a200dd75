//! Database query modules.

pub mod app_state;
pub mod favorites;
pub mod genres;
pub mod movies;
pub mod persons;
pub mod recently_watched;
pub mod users;
