//! mq-catalog: HTTP client for the remote movie catalog.
//!
//! Transport only. Every call is a single attempt; failures are reported as
//! [`NetError`] and it is up to the caller whether to try again.

pub mod client;
pub mod dto;
pub mod error;

pub use client::{CatalogClient, CatalogClientConfig, HttpCatalogClient};
pub use error::NetError;
