//! Account domain types: users, UI preferences, and the persisted app state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::ids::UserId;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A local user account. The email is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// bcrypt hash; the plaintext password is never stored.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub avatar: Option<Vec<u8>>,
    pub notes: Option<String>,
    pub onboarding_completed: bool,
}

impl User {
    /// Full name for display, trimmed when either part is empty.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// UI colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(Error::Validation(format!("unknown theme: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// UI language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ru")]
    Russian,
}

impl Language {
    /// ISO-639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Russian => "ru",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "ru" | "russian" => Ok(Self::Russian),
            other => Err(Error::Validation(format!("unknown language: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Process-wide persisted state: preferences plus the session user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub theme: Theme,
    pub language: Language,
    pub current_user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parse_and_display() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(Theme::Light.to_string(), "light");
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn language_parse_and_display() {
        assert_eq!("ru".parse::<Language>().unwrap(), Language::Russian);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!(Language::Russian.to_string(), "ru");
        assert!("xx".parse::<Language>().is_err());
    }

    #[test]
    fn default_app_state() {
        let state = AppState::default();
        assert_eq!(state.theme, Theme::Light);
        assert_eq!(state.language, Language::English);
        assert!(state.current_user.is_none());
    }

    #[test]
    fn password_hash_not_serialized() {
        let user = User {
            id: UserId::new(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$2b$04$secret".into(),
            avatar: None,
            notes: None,
            onboarding_completed: false,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert_eq!(user.full_name(), "Ada Lovelace");
    }
}
