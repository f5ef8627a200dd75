mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable that overrides `catalog.api_key`.
pub const API_KEY_ENV: &str = "MARQUEE_API_KEY";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./marquee.toml", "~/.config/marquee/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env(&mut config);
    Ok(config)
}

fn apply_env(config: &mut Config) {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            config.catalog.api_key = key;
        }
    }
    let expanded = shellexpand::tilde(&config.store.db_path.to_string_lossy()).into_owned();
    config.store.db_path = expanded.into();
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.catalog.base_url.trim().is_empty() {
        anyhow::bail!("catalog.base_url cannot be empty");
    }
    if config.catalog.timeout_secs == 0 {
        anyhow::bail!("catalog.timeout_secs cannot be 0");
    }
    if config.catalog.page_size == 0 {
        anyhow::bail!("catalog.page_size cannot be 0");
    }
    if config.catalog.api_key.is_empty() {
        tracing::warn!(
            "No catalog API key configured; set catalog.api_key or {}",
            API_KEY_ENV
        );
    }

    if config.images.capacity_bytes == 0 {
        anyhow::bail!("images.capacity_bytes cannot be 0");
    }

    // bcrypt accepts costs 4..=31
    if !(4..=31).contains(&config.session.bcrypt_cost) {
        anyhow::bail!(
            "session.bcrypt_cost must be between 4 and 31, got {}",
            config.session.bcrypt_cost
        );
    }

    Ok(())
}
