//! Poster and photo bytes.
//!
//! The cache is the only image storage: bytes live in memory for the
//! lifetime of the process and are re-downloaded after a restart.

mod cache;

pub use cache::{ImageCache, DEFAULT_CAPACITY_BYTES};
