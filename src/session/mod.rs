//! Credential store and the current session.
//!
//! [`Session`] owns the in-process copy of the persisted [`AppState`]: UI
//! preferences plus the logged-in user. Every change is written through to
//! the local store before the cached copy is updated, so the session
//! survives a restart.

use std::sync::Arc;

use mq_core::{AppState, Language, Theme, User, UserId};
use mq_db::LocalStore;
use parking_lot::RwLock;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No account with this email")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// The operation needs a logged-in user.
    #[error("No user is logged in")]
    NotLoggedIn,

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Storage error: {0}")]
    Storage(#[from] mq_core::Error),
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Fields for [`Session::register`].
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Profile fields a user may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<Vec<u8>>,
    pub notes: Option<String>,
}

/// Trim and lowercase an email so lookups match regardless of input casing.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::InvalidEmail(email.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    store: Arc<LocalStore>,
    state: RwLock<AppState>,
    bcrypt_cost: u32,
}

impl Session {
    /// Load the persisted app state.
    pub fn new(store: Arc<LocalStore>, bcrypt_cost: u32) -> Result<Self, AuthError> {
        let state = store.get_app_state()?;
        if let Some(user) = &state.current_user {
            tracing::debug!(email = %user.email, "Restored session");
        }
        Ok(Self {
            store,
            state: RwLock::new(state),
            bcrypt_cost,
        })
    }

    pub fn app_state(&self) -> AppState {
        self.state.read().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.read().current_user.clone()
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.state.read().current_user.as_ref().map(|u| u.id)
    }

    /// Create an account and log it in.
    pub fn register(&self, account: NewAccount) -> Result<User, AuthError> {
        let email = normalize_email(&account.email);
        validate_email(&email)?;
        if self.store.get_user(&email)?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = bcrypt::hash(&account.password, self.bcrypt_cost)?;
        let mut user = User {
            id: UserId::new(),
            first_name: account.first_name.trim().to_string(),
            last_name: account.last_name.trim().to_string(),
            email,
            password_hash,
            avatar: None,
            notes: None,
            onboarding_completed: false,
        };
        user.id = self.store.upsert_user(&user)?;
        tracing::info!(email = %user.email, "Registered user");

        self.set_current_user(Some(user.clone()))?;
        Ok(user)
    }

    /// Verify credentials and make the user current.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);
        let user = self
            .store
            .get_user(&email)?
            .ok_or(AuthError::UserNotFound)?;

        if !bcrypt::verify(password, &user.password_hash)? {
            tracing::debug!(email = %email, "Rejected login");
            return Err(AuthError::InvalidPassword);
        }

        tracing::info!(email = %email, "Logged in");
        self.set_current_user(Some(user.clone()))?;
        Ok(user)
    }

    /// Clear the current user. A no-op when nobody is logged in.
    pub fn logout(&self) -> Result<(), AuthError> {
        if let Some(user) = self.current_user() {
            tracing::info!(email = %user.email, "Logged out");
        }
        self.set_current_user(None)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), AuthError> {
        self.update(|state| state.theme = theme)
    }

    pub fn set_language(&self, language: Language) -> Result<(), AuthError> {
        self.update(|state| state.language = language)
    }

    /// Mark onboarding as done for the current user.
    pub fn complete_onboarding(&self) -> Result<User, AuthError> {
        self.update_user(|user| user.onboarding_completed = true)
    }

    pub fn update_profile(&self, update: ProfileUpdate) -> Result<User, AuthError> {
        self.update_user(|user| {
            if let Some(first_name) = update.first_name {
                user.first_name = first_name;
            }
            if let Some(last_name) = update.last_name {
                user.last_name = last_name;
            }
            if let Some(avatar) = update.avatar {
                user.avatar = Some(avatar);
            }
            if let Some(notes) = update.notes {
                user.notes = Some(notes);
            }
        })
    }

    fn update_user(&self, f: impl FnOnce(&mut User)) -> Result<User, AuthError> {
        let mut user = self.current_user().ok_or(AuthError::NotLoggedIn)?;
        f(&mut user);
        self.store.upsert_user(&user)?;
        self.set_current_user(Some(user.clone()))?;
        Ok(user)
    }

    fn set_current_user(&self, user: Option<User>) -> Result<(), AuthError> {
        self.update(|state| state.current_user = user)
    }

    /// Apply `f` to a copy of the state, persist it, then publish it.
    fn update(&self, f: impl FnOnce(&mut AppState)) -> Result<(), AuthError> {
        let mut state = self.state.write();
        let mut next = state.clone();
        f(&mut next);
        self.store.update_app_state(&next)?;
        *state = next;
        Ok(())
    }
}
