//! Marquee - client-side data layer for a movie catalog
//!
//! This library crate exposes the repository, session, configuration and
//! image cache used by the `marquee` binary and by integration tests.

pub mod config;
pub mod images;
pub mod repository;
pub mod session;
