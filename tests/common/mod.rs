//! Shared test harness for integration tests.
//!
//! Provides [`StubCatalog`], an in-process [`CatalogClient`] that serves
//! canned responses and counts calls, and [`TestHarness`], which wires it to
//! an in-memory store into a full [`Repository`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use marquee::images::ImageCache;
use marquee::repository::Repository;
use marquee::session::{NewAccount, Session};
use mq_catalog::dto::{MovieDto, MovieListDto, PersonDto, PersonListDto, PosterDto};
use mq_catalog::{CatalogClient, NetError};
use mq_core::{MovieId, User};
use mq_db::LocalStore;

/// bcrypt cost used by tests; the minimum bcrypt accepts.
pub const TEST_BCRYPT_COST: u32 = 4;

// ---------------------------------------------------------------------------
// Stub catalog
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StubCatalog {
    pub movies: Mutex<Vec<MovieDto>>,
    pub persons: Mutex<Vec<PersonDto>>,
    pub images: Mutex<HashMap<String, Bytes>>,
    /// When set, every call fails with a timeout-like error.
    pub offline: Mutex<bool>,
    /// Artificial latency for downloads.
    pub download_delay: Mutex<Option<Duration>>,
    pub fetch_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub last_query: Mutex<Option<String>>,
}

impl StubCatalog {
    pub fn with_movies(movies: Vec<MovieDto>) -> Self {
        let stub = Self::default();
        *stub.movies.lock() = movies;
        stub
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), NetError> {
        if *self.offline.lock() {
            Err(NetError::InvalidData("catalog offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn fetch_movies(&self, query: Option<&str>) -> Result<MovieListDto, NetError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock() = query.map(str::to_string);
        self.check_online()?;
        Ok(MovieListDto {
            docs: self.movies.lock().clone(),
            ..Default::default()
        })
    }

    async fn fetch_persons_by_movie(&self, _movie_id: MovieId) -> Result<PersonListDto, NetError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(PersonListDto {
            docs: self.persons.lock().clone(),
        })
    }

    async fn download_bytes(&self, url: &str) -> Result<Bytes, NetError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let delay = *self.download_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.images
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| NetError::InvalidData(format!("unexpected status 404 Not Found from {url}")))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A catalog record with a title, a poster, and the given genres.
pub fn movie_dto(id: i64, title: &str, genres: &[&str]) -> MovieDto {
    MovieDto {
        id: Some(id),
        name: Some(title.to_string()),
        year: Some(1994),
        poster: Some(PosterDto {
            url: Some(poster_url(id)),
            preview_url: None,
        }),
        genres: Some(
            genres
                .iter()
                .map(|g| mq_catalog::dto::GenreDto {
                    name: Some(g.to_string()),
                })
                .collect(),
        ),
        ..Default::default()
    }
}

pub fn poster_url(id: i64) -> String {
    format!("https://img.example/{id}.jpg")
}

pub fn account(email: &str) -> NewAccount {
    NewAccount {
        first_name: "Test".into(),
        last_name: "User".into(),
        email: email.into(),
        password: "password123".into(),
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct TestHarness {
    pub repo: Arc<Repository>,
    pub store: Arc<LocalStore>,
    pub catalog: Arc<StubCatalog>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_catalog(StubCatalog::default())
    }

    pub fn with_catalog(catalog: StubCatalog) -> Self {
        let store = Arc::new(LocalStore::open_in_memory().expect("failed to open store"));
        Self::with_store(store, catalog)
    }

    pub fn with_store(store: Arc<LocalStore>, catalog: StubCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let session =
            Session::new(Arc::clone(&store), TEST_BCRYPT_COST).expect("failed to load session");
        let repo = Repository::new(
            Arc::clone(&store),
            Arc::clone(&catalog) as Arc<dyn CatalogClient>,
            Arc::new(ImageCache::new(1024 * 1024)),
            session,
        );
        Self {
            repo: Arc::new(repo),
            store,
            catalog,
        }
    }

    /// Register an account and leave it logged in.
    pub fn register(&self, email: &str) -> User {
        self.repo
            .session()
            .register(account(email))
            .expect("failed to register")
    }
}
