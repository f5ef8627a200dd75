use clap::{Parser, Subcommand};
use mq_core::{Language, MovieId, Theme};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about = "Movie catalog browser with local favorites")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print movies as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List popular movies from the catalog
    Popular,

    /// Search the catalog by title
    Search {
        /// Search text
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Show a stored movie
    Show { id: MovieId },

    /// Fetch and list the cast and crew of a stored movie
    Crew { id: MovieId },

    /// List your favorites
    Favorites,

    /// Toggle a stored movie in your favorites
    Favorite { id: MovieId },

    /// List your recently watched movies
    Recent,

    /// Mark a stored movie as watched
    Watched {
        id: MovieId,

        /// Remove the movie from the list instead
        #[arg(long)]
        remove: bool,
    },

    /// Create an account and log in
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },

    /// Log in
    Login {
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Log out
    Logout,

    /// Show the current user and preferences
    Whoami,

    /// Set the UI theme (light, dark)
    Theme { theme: Theme },

    /// Set the UI language (en, ru)
    Language { language: Language },

    /// List every genre seen so far
    Genres,

    /// Download the poster of a stored movie
    Poster {
        id: MovieId,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
