mod cli;

use marquee::config::{self, Config};
use marquee::images::ImageCache;
use marquee::repository::{BlockingRepository, Repository};
use marquee::session::{NewAccount, Session};
use mq_catalog::HttpCatalogClient;
use mq_core::Movie;
use mq_db::LocalStore;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "marquee=debug,mq_catalog=debug,mq_db=debug".to_string()
        } else {
            "marquee=warn,mq_catalog=warn,mq_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            config: config_path,
        } => validate_config(config_path.or(cli.config).as_deref()),
        command => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let repo = open_repository(&config)?;
            run(&repo, command, cli.json)
        }
    }
}

fn run(repo: &BlockingRepository, command: Commands, json: bool) -> Result<()> {
    let print_movies = |movies: &[Movie]| -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(movies)?);
        } else {
            print_movie_list(movies);
        }
        Ok(())
    };

    match command {
        Commands::Popular => print_movies(&repo.get_popular_movies()?)?,
        Commands::Search { query } => print_movies(&repo.search_movies(&query.join(" "))?)?,
        Commands::Show { id } => {
            let movie = repo.get_movie(id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&movie)?);
            } else {
                print_movie_details(&movie);
            }
        }
        Commands::Crew { id } => {
            let movie = repo.get_movie(id)?;
            for person in repo.load_persons(&movie)? {
                println!(
                    "{:>9}  {}  ({})",
                    person.id,
                    person.display_name(),
                    person.profession
                );
            }
        }
        Commands::Favorites => print_movies(&repo.get_favorite_movies()?)?,
        Commands::Favorite { id } => {
            let movie = repo.get_movie(id)?;
            if repo.toggle_favorite(&movie)? {
                println!("Added \"{}\" to favorites", movie.display_title());
            } else {
                println!("Removed \"{}\" from favorites", movie.display_title());
            }
        }
        Commands::Recent => print_movies(&repo.get_recently_watched_movies()?)?,
        Commands::Watched { id, remove } => {
            let movie = repo.get_movie(id)?;
            if remove {
                if !repo.remove_from_recently_watched(&movie)? {
                    println!("\"{}\" was not in your list", movie.display_title());
                }
            } else {
                repo.add_to_recently_watched(&movie)?;
            }
        }
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let user = repo.session().register(NewAccount {
                first_name,
                last_name,
                email,
                password,
            })?;
            println!("Registered and logged in as {}", user.email);
        }
        Commands::Login { email, password } => {
            let user = repo.login(&email, &password)?;
            println!("Logged in as {}", user.email);
        }
        Commands::Logout => {
            repo.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => {
            let state = repo.session().app_state();
            match state.current_user {
                Some(user) => println!("{} <{}>", user.full_name(), user.email),
                None => println!("Not logged in"),
            }
            println!("Theme: {}", state.theme);
            println!("Language: {}", state.language);
        }
        Commands::Theme { theme } => repo.session().set_theme(theme)?,
        Commands::Language { language } => repo.session().set_language(language)?,
        Commands::Genres => {
            for genre in repo.inner().list_genres()? {
                println!("{}", genre.name);
            }
        }
        Commands::Poster { id, out } => {
            let movie = repo.get_movie(id)?;
            let url = movie
                .best_poster_url()
                .with_context(|| format!("Movie {id} has no poster"))?;
            let bytes = repo.load_image(url)?;
            std::fs::write(&out, &bytes)
                .with_context(|| format!("Failed to write poster to {:?}", out))?;
            println!("Wrote {} bytes to {}", bytes.len(), out.display());
        }
        Commands::Validate { config } => validate_config(config.as_deref())?,
    }

    Ok(())
}

fn open_repository(config: &Config) -> Result<BlockingRepository> {
    let db_path = config.store.db_path.to_string_lossy();
    let store = Arc::new(
        LocalStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {db_path}"))?,
    );
    let catalog = Arc::new(
        HttpCatalogClient::new(config.catalog.client_config())
            .context("Failed to create catalog client")?,
    );
    let images = Arc::new(ImageCache::new(config.images.capacity_bytes));
    let session = Session::new(Arc::clone(&store), config.session.bcrypt_cost)?;

    let repository = Repository::new(store, catalog, images, session);
    BlockingRepository::new(repository).context("Failed to start async runtime")
}

fn print_movie_list(movies: &[Movie]) {
    if movies.is_empty() {
        println!("No movies.");
        return;
    }
    for movie in movies {
        let mut flags = String::new();
        if movie.is_favorite {
            flags.push_str(" [favorite]");
        }
        if movie.is_recent {
            flags.push_str(" [watched]");
        }
        println!(
            "{:>9}  {} ({})  {:.1}{}",
            movie.id,
            movie.display_title(),
            movie.year,
            movie.rating.value,
            flags
        );
    }
}

fn print_movie_details(movie: &Movie) {
    println!("{} ({})", movie.display_title(), movie.year);
    if !movie.alternative_name.is_empty() && movie.alternative_name != movie.display_title() {
        println!("  Also known as: {}", movie.alternative_name);
    }
    println!(
        "  Rating: {:.1} ({} votes)",
        movie.rating.value, movie.rating.votes
    );
    if movie.runtime_minutes > 0 {
        println!("  Runtime: {} min", movie.runtime_minutes);
    }
    if !movie.genres.is_empty() {
        let names: Vec<&str> = movie.genres.iter().map(|g| g.name.as_str()).collect();
        println!("  Genres: {}", names.join(", "));
    }
    if !movie.premiere.is_empty() {
        println!("  Premiere: {}", movie.premiere);
    }
    if !movie.trailer_url.is_empty() {
        println!("  Trailer: {}", movie.trailer_url);
    }
    println!("  Favorite: {}", movie.is_favorite);
    println!("  Watched: {}", movie.is_recent);
    if !movie.description.is_empty() {
        println!("\n{}", movie.description);
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::load_config_or_default(None)?;
            config::validate_config(&config)?;
            print_config(&config);
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("  Catalog: {}", config.catalog.base_url);
    println!(
        "  API key: {}",
        if config.catalog.api_key.is_empty() {
            "not set"
        } else {
            "set"
        }
    );
    println!("  Database: {}", config.store.db_path.display());
    println!("  Image cache: {} bytes", config.images.capacity_bytes);
}
