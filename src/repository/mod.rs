//! The repository façade.
//!
//! [`Repository`] reconciles the remote catalog with the local store.
//! Catalog results are upserted first and then read back, so callers always
//! receive the stored version of a movie with viewer flags for the current
//! user attached. Per-user operations require a logged-in [`Session`].

mod blocking;
mod error;
pub mod mapping;

pub use blocking::BlockingRepository;
pub use error::RepoError;

use std::sync::Arc;

use bytes::Bytes;
use mq_catalog::dto::MovieListDto;
use mq_catalog::CatalogClient;
use mq_core::{Genre, Movie, MovieId, Person, User, UserId};
use mq_db::LocalStore;
use tracing::{debug, info};

use crate::images::ImageCache;
use crate::session::{AuthError, Session};

pub type Result<T> = std::result::Result<T, RepoError>;

pub struct Repository {
    store: Arc<LocalStore>,
    catalog: Arc<dyn CatalogClient>,
    images: Arc<ImageCache>,
    session: Session,
}

impl Repository {
    pub fn new(
        store: Arc<LocalStore>,
        catalog: Arc<dyn CatalogClient>,
        images: Arc<ImageCache>,
        session: Session,
    ) -> Self {
        Self {
            store,
            catalog,
            images,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    /// Popular movies from the catalog. Works without a session.
    pub async fn get_popular_movies(&self) -> Result<Vec<Movie>> {
        let list = self.catalog.fetch_movies(None).await?;
        self.ingest(list)
    }

    /// Text search. A blank query returns nothing without a request.
    pub async fn search_movies(&self, query: &str) -> Result<Vec<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let list = self.catalog.fetch_movies(Some(query)).await?;
        self.ingest(list)
    }

    /// Fetch the cast and crew of `movie` and store them as its person set.
    pub async fn load_persons(&self, movie: &Movie) -> Result<Vec<Person>> {
        let list = self.catalog.fetch_persons_by_movie(movie.id).await?;
        let persons = mapping::persons_from_list(list);

        self.ensure_stored(movie)?;
        self.store
            .replace_movie_persons(movie.id, &persons)
            .map_err(RepoError::save)?;
        debug!(movie = %movie.id, count = persons.len(), "Stored persons");

        let stored = self
            .store
            .get_movie(movie.id)?
            .ok_or_else(|| RepoError::SaveError(format!("movie {} vanished", movie.id)))?;
        Ok(stored.persons)
    }

    /// Image bytes for `url`, from the cache or downloaded and cached.
    pub async fn load_image(&self, url: &str) -> Result<Bytes> {
        let bytes = self
            .images
            .get_or_fetch(url, || self.catalog.download_bytes(url))
            .await?;
        Ok(bytes)
    }

    /// Upsert every movie of a catalog response and read them back.
    fn ingest(&self, list: MovieListDto) -> Result<Vec<Movie>> {
        let movies = mapping::movies_from_list(list);
        let ids = self.store.upsert_movies(&movies).map_err(RepoError::save)?;
        info!(count = ids.len(), "Ingested catalog movies");

        let viewer = self.session.current_user_id();
        ids.into_iter()
            .map(|id| -> Result<Movie> {
                let movie = self
                    .store
                    .get_movie(id)?
                    .ok_or_else(|| RepoError::SaveError(format!("movie {id} missing after upsert")))?;
                Ok(self.store.with_viewer_flags(viewer, movie)?)
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Local reads
    // -----------------------------------------------------------------------

    /// A stored movie with viewer flags.
    pub fn get_movie(&self, id: MovieId) -> Result<Movie> {
        let movie = self
            .store
            .get_movie(id)?
            .ok_or_else(|| RepoError::DataNotFound(format!("movie {id}")))?;
        Ok(self
            .store
            .with_viewer_flags(self.session.current_user_id(), movie)?)
    }

    pub fn list_genres(&self) -> Result<Vec<Genre>> {
        Ok(self.store.list_genres()?)
    }

    // -----------------------------------------------------------------------
    // Favorites
    // -----------------------------------------------------------------------

    pub fn get_favorite_movies(&self) -> Result<Vec<Movie>> {
        let user_id = self.require_user()?;
        Ok(self.store.favorite_movies(user_id)?)
    }

    /// Flip `movie` in the current user's favorites; returns the new state.
    pub fn toggle_favorite(&self, movie: &Movie) -> Result<bool> {
        let user_id = self.require_user()?;
        self.ensure_stored(movie)?;
        let now = self
            .store
            .toggle_favorite(user_id, movie.id)
            .map_err(RepoError::save)?;
        debug!(movie = %movie.id, favorite = now, "Toggled favorite");
        Ok(now)
    }

    /// False for movies that were never stored.
    pub fn is_favorite(&self, movie: &Movie) -> Result<bool> {
        let user_id = self.require_user()?;
        Ok(self.store.is_favorite(user_id, movie.id)?)
    }

    // -----------------------------------------------------------------------
    // Recently watched
    // -----------------------------------------------------------------------

    /// Most recently watched first.
    pub fn get_recently_watched_movies(&self) -> Result<Vec<Movie>> {
        let user_id = self.require_user()?;
        Ok(self.store.recently_watched_movies(user_id)?)
    }

    pub fn add_to_recently_watched(&self, movie: &Movie) -> Result<()> {
        let user_id = self.require_user()?;
        self.ensure_stored(movie)?;
        self.store
            .add_recently_watched(user_id, movie.id)
            .map_err(RepoError::save)
    }

    /// Returns whether the movie was in the list.
    pub fn remove_from_recently_watched(&self, movie: &Movie) -> Result<bool> {
        let user_id = self.require_user()?;
        if self.store.get_movie(movie.id)?.is_none() {
            return Ok(false);
        }
        self.store
            .remove_recently_watched(user_id, movie.id)
            .map_err(RepoError::save)
    }

    pub fn is_recently_watched(&self, movie: &Movie) -> Result<bool> {
        let user_id = self.require_user()?;
        Ok(self.store.is_recently_watched(user_id, movie.id)?)
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Log in and drop cached images of the previous session.
    pub fn login(&self, email: &str, password: &str) -> std::result::Result<User, AuthError> {
        let user = self.session.login(email, password)?;
        self.images.clear();
        Ok(user)
    }

    pub fn logout(&self) -> std::result::Result<(), AuthError> {
        self.session.logout()?;
        self.images.clear();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // helpers
    // -----------------------------------------------------------------------

    fn require_user(&self) -> Result<UserId> {
        self.session
            .current_user_id()
            .ok_or(RepoError::UserNotAuthenticated)
    }

    /// Store `movie` if it is not known locally yet.
    fn ensure_stored(&self, movie: &Movie) -> Result<()> {
        if self.store.get_movie(movie.id)?.is_none() {
            self.store
                .upsert_movie(&movie.clone().canonical())
                .map_err(RepoError::save)?;
        }
        Ok(())
    }
}
