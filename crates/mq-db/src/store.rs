//! The [`LocalStore`] façade over the pool and query modules.
//!
//! Every mutation takes the store's write lock and runs in an `IMMEDIATE`
//! transaction, so a multi-table upsert either lands completely or not at
//! all and two concurrent toggles on the same pair can never interleave.
//!
//! File stores read through WAL snapshots without the lock. The in-memory
//! store shares one cache between its connections and has no snapshots, so
//! its reads take the write lock as well.

use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};
use mq_core::{
    AppState, Error, Genre, Language, Movie, MovieId, Person, Result, Theme, User, UserId,
};

use crate::pool::{self, DbPool, PooledConnection};
use crate::queries::{app_state, favorites, genres, movies, persons, recently_watched, users};

/// Handle to the persisted entity graph.
pub struct LocalStore {
    pool: DbPool,
    write_lock: Mutex<()>,
    /// Reads also take `write_lock`.
    serialize_reads: bool,
}

impl LocalStore {
    /// Wrap an already-migrated file-backed pool.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
            serialize_reads: false,
        }
    }

    /// Open (or create) a file-backed store.
    pub fn open(db_path: &str) -> Result<Self> {
        tracing::debug!(path = db_path, "Opening local store");
        Ok(Self::new(pool::init_pool(db_path)?))
    }

    /// A private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            serialize_reads: true,
            ..Self::new(pool::init_memory_pool()?)
        })
    }

    fn conn(&self) -> Result<PooledConnection> {
        pool::get_conn(&self.pool)
    }

    /// Run `f` against a pooled connection.
    fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let _guard = self.serialize_reads.then(|| self.write_lock.lock());
        let conn = self.conn()?;
        f(&conn)
    }

    /// Run `f` inside a serialized write transaction.
    fn write<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock();
        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| Error::database(e.to_string()))?;
        let out = f(&tx)?;
        tx.commit().map_err(|e| Error::database(e.to_string()))?;
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Create or overwrite the user with this email. Returns the stored id.
    pub fn upsert_user(&self, user: &User) -> Result<UserId> {
        self.write(|conn| users::upsert_user(conn, user))
    }

    pub fn get_user(&self, email: &str) -> Result<Option<User>> {
        self.read(|conn| users::get_user_by_email(conn, email))
    }

    pub fn get_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        self.read(|conn| users::get_user_by_id(conn, id))
    }

    // -----------------------------------------------------------------------
    // Movies
    // -----------------------------------------------------------------------

    /// Create or update a movie by catalog id, replacing its genre and person
    /// sets.
    pub fn upsert_movie(&self, movie: &Movie) -> Result<MovieId> {
        self.write(|conn| movies::upsert_movie(conn, movie))
    }

    /// Upsert a batch of movies in one transaction.
    pub fn upsert_movies(&self, batch: &[Movie]) -> Result<Vec<MovieId>> {
        let ids = self.write(|conn| {
            batch
                .iter()
                .map(|movie| movies::upsert_movie(conn, movie))
                .collect::<Result<Vec<_>>>()
        })?;
        tracing::debug!(count = ids.len(), "Upserted movies");
        Ok(ids)
    }

    /// Canonical stored movie; viewer flags are false.
    pub fn get_movie(&self, id: MovieId) -> Result<Option<Movie>> {
        self.read(|conn| movies::get_movie(conn, id))
    }

    /// Replace the person set of a stored movie.
    pub fn replace_movie_persons(&self, movie_id: MovieId, crew: &[Person]) -> Result<()> {
        self.write(|conn| {
            if !movies::movie_exists(conn, movie_id)? {
                return Err(Error::not_found("movie", movie_id));
            }
            persons::replace_movie_persons(conn, movie_id, crew)
        })
    }

    /// Every stored genre, alphabetical.
    pub fn list_genres(&self) -> Result<Vec<Genre>> {
        self.read(genres::list_genres)
    }

    // -----------------------------------------------------------------------
    // Favorites
    // -----------------------------------------------------------------------

    /// Flip membership of `movie_id` in the user's favorites; returns the new
    /// state.
    pub fn toggle_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        self.write(|conn| {
            ensure_pair(conn, user_id, movie_id)?;
            favorites::toggle_favorite(conn, user_id, movie_id)
        })
    }

    pub fn is_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        self.read(|conn| favorites::is_favorite(conn, user_id, movie_id))
    }

    /// The user's favorites, most recently added first, with viewer flags.
    pub fn favorite_movies(&self, user_id: UserId) -> Result<Vec<Movie>> {
        self.read(|conn| {
            let ids = favorites::list_favorite_ids(conn, user_id)?;
            flagged(conn, user_id, movies::get_movies(conn, &ids)?)
        })
    }

    // -----------------------------------------------------------------------
    // Recently watched
    // -----------------------------------------------------------------------

    /// Record a watch, moving the movie to the front of the list.
    pub fn add_recently_watched(&self, user_id: UserId, movie_id: MovieId) -> Result<()> {
        self.write(|conn| {
            ensure_pair(conn, user_id, movie_id)?;
            recently_watched::add_recently_watched(conn, user_id, movie_id)
        })
    }

    /// Returns true if the movie was in the list.
    pub fn remove_recently_watched(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        self.write(|conn| {
            ensure_pair(conn, user_id, movie_id)?;
            recently_watched::remove_recently_watched(conn, user_id, movie_id)
        })
    }

    pub fn is_recently_watched(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        self.read(|conn| recently_watched::is_recently_watched(conn, user_id, movie_id))
    }

    /// The user's recently watched movies, most recent first, with viewer
    /// flags.
    pub fn recently_watched_movies(&self, user_id: UserId) -> Result<Vec<Movie>> {
        self.read(|conn| {
            let ids = recently_watched::list_recently_watched_ids(conn, user_id)?;
            flagged(conn, user_id, movies::get_movies(conn, &ids)?)
        })
    }

    /// Attach the viewer flags of `viewer` to `movie`. With no viewer both
    /// flags are false.
    pub fn with_viewer_flags(&self, viewer: Option<UserId>, movie: Movie) -> Result<Movie> {
        let movie = movie.canonical();
        match viewer {
            Some(user_id) => self.read(|conn| set_flags(conn, user_id, movie)),
            None => Ok(movie),
        }
    }

    // -----------------------------------------------------------------------
    // App state
    // -----------------------------------------------------------------------

    /// The persisted app state, created with defaults on first access.
    pub fn get_app_state(&self) -> Result<AppState> {
        let row = self.write(app_state::get_or_create_app_state)?;
        let current_user = match row.current_user_id {
            Some(id) => self.get_user_by_id(id)?,
            None => None,
        };
        Ok(AppState {
            // Unknown stored values fall back to the defaults.
            theme: row.theme.parse::<Theme>().unwrap_or_default(),
            language: row.language.parse::<Language>().unwrap_or_default(),
            current_user,
        })
    }

    /// Persist theme, language and the current user. A current user that is
    /// not stored yet is upserted in the same transaction.
    pub fn update_app_state(&self, state: &AppState) -> Result<()> {
        self.write(|conn| {
            let current = match &state.current_user {
                Some(user) => Some(users::upsert_user(conn, user)?),
                None => None,
            };
            app_state::update_app_state(conn, state.theme, state.language, current)
        })
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn ensure_pair(conn: &Connection, user_id: UserId, movie_id: MovieId) -> Result<()> {
    if !users::user_exists(conn, user_id)? {
        return Err(Error::not_found("user", user_id));
    }
    if !movies::movie_exists(conn, movie_id)? {
        return Err(Error::not_found("movie", movie_id));
    }
    Ok(())
}

fn set_flags(conn: &Connection, user_id: UserId, mut movie: Movie) -> Result<Movie> {
    movie.is_favorite = favorites::is_favorite(conn, user_id, movie.id)?;
    movie.is_recent = recently_watched::is_recently_watched(conn, user_id, movie.id)?;
    Ok(movie)
}

fn flagged(conn: &Connection, user_id: UserId, list: Vec<Movie>) -> Result<Vec<Movie>> {
    list.into_iter()
        .map(|movie| set_flags(conn, user_id, movie))
        .collect()
}
