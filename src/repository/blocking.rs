//! Synchronous front for [`Repository`].
//!
//! Owns a multi-threaded tokio runtime and drives the async operations with
//! `block_on`. Only the calling thread blocks. Calls made from a thread that
//! is already inside a runtime are refused with
//! [`RepoError::BlockingInAsyncContext`] instead of panicking.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use mq_core::{Genre, Movie, MovieId, Person, User};
use tokio::runtime::{Handle, Runtime};

use super::{RepoError, Repository, Result};
use crate::session::{AuthError, Session};

pub struct BlockingRepository {
    runtime: Runtime,
    inner: Arc<Repository>,
}

impl BlockingRepository {
    pub fn new(repository: Repository) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("marquee-io")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            inner: Arc::new(repository),
        })
    }

    /// The async repository behind this handle.
    pub fn inner(&self) -> &Arc<Repository> {
        &self.inner
    }

    pub fn session(&self) -> &Session {
        self.inner.session()
    }

    fn block_on<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        if Handle::try_current().is_ok() {
            return Err(RepoError::BlockingInAsyncContext);
        }
        self.runtime.block_on(fut)
    }

    pub fn get_popular_movies(&self) -> Result<Vec<Movie>> {
        self.block_on(self.inner.get_popular_movies())
    }

    pub fn search_movies(&self, query: &str) -> Result<Vec<Movie>> {
        self.block_on(self.inner.search_movies(query))
    }

    pub fn load_persons(&self, movie: &Movie) -> Result<Vec<Person>> {
        self.block_on(self.inner.load_persons(movie))
    }

    pub fn load_image(&self, url: &str) -> Result<Bytes> {
        self.block_on(self.inner.load_image(url))
    }

    pub fn get_movie(&self, id: MovieId) -> Result<Movie> {
        self.inner.get_movie(id)
    }

    pub fn list_genres(&self) -> Result<Vec<Genre>> {
        self.inner.list_genres()
    }

    pub fn get_favorite_movies(&self) -> Result<Vec<Movie>> {
        self.inner.get_favorite_movies()
    }

    pub fn toggle_favorite(&self, movie: &Movie) -> Result<bool> {
        self.inner.toggle_favorite(movie)
    }

    pub fn is_favorite(&self, movie: &Movie) -> Result<bool> {
        self.inner.is_favorite(movie)
    }

    pub fn get_recently_watched_movies(&self) -> Result<Vec<Movie>> {
        self.inner.get_recently_watched_movies()
    }

    pub fn add_to_recently_watched(&self, movie: &Movie) -> Result<()> {
        self.inner.add_to_recently_watched(movie)
    }

    pub fn remove_from_recently_watched(&self, movie: &Movie) -> Result<bool> {
        self.inner.remove_from_recently_watched(movie)
    }

    pub fn is_recently_watched(&self, movie: &Movie) -> Result<bool> {
        self.inner.is_recently_watched(movie)
    }

    pub fn login(&self, email: &str, password: &str) -> std::result::Result<User, AuthError> {
        self.inner.login(email, password)
    }

    pub fn logout(&self) -> std::result::Result<(), AuthError> {
        self.inner.logout()
    }
}
