//! mq-core: shared types, IDs, and errors.
//!
//! This crate is the foundational dependency for the other mq-* crates,
//! providing type-safe identifiers, a unified store error type, and the
//! catalog and account domain types.

pub mod account;
pub mod catalog;
pub mod error;
pub mod ids;

// Re-export the most commonly used items at the crate root.
pub use account::*;
pub use catalog::*;
pub use error::{Error, Result};
pub use ids::*;
