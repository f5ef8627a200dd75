//! mq-db: local store for the catalog entity graph.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, row models, per-table query modules, and the
//! [`LocalStore`](store::LocalStore) façade that serializes mutations.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod store;

pub use store::LocalStore;
