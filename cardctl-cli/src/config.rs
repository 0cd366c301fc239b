//! Connection configuration loading for the cardctl CLI
//!
//! Resolution order (later wins):
//! 1. `StoreConfig` defaults
//! 2. `~/.cardctl/config.toml`, or the file given with `--config`
//! 3. `.env` in the current directory, then `~/.cardctl/.env`
//! 4. `CARDCTL_DB_*` environment variables

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cardctl_store::StoreConfig;
use serde::Deserialize;
use tracing::debug;

pub const ENV_HOST: &str = "CARDCTL_DB_HOST";
pub const ENV_PORT: &str = "CARDCTL_DB_PORT";
pub const ENV_NAME: &str = "CARDCTL_DB_NAME";
pub const ENV_USER: &str = "CARDCTL_DB_USER";
pub const ENV_PASSWORD: &str = "CARDCTL_DB_PASSWORD";

/// On-disk layout: connection settings live under `[postgresql]`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    postgresql: StoreConfig,
}

/// Get the cardctl config directory path (~/.cardctl)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cardctl"))
}

/// Get the default config file path (~/.cardctl/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve the store configuration.
///
/// An explicit path must exist; the default path is optional.
pub fn load(explicit: Option<&Path>) -> Result<StoreConfig> {
    load_dotenv();

    let mut config = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config not found at {}", path.display());
            }
            read_file(path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_file(&path)?,
            _ => {
                debug!("no config file, using defaults");
                StoreConfig::default()
            }
        },
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    debug!(db = %config.display_target(), "configuration resolved");
    Ok(config)
}

fn read_file(path: &Path) -> Result<StoreConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Parse a config file body. A file without `[postgresql]` yields defaults.
pub fn parse(content: &str) -> Result<StoreConfig> {
    let file: ConfigFile = toml::from_str(content).context("Failed to parse config (invalid TOML)")?;
    Ok(file.postgresql)
}

/// Overlay `CARDCTL_DB_*` variables onto `config`.
///
/// Takes a lookup function so tests need not touch the process environment.
pub fn apply_env<F>(config: &mut StoreConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(ENV_HOST) {
        config.host = host;
    }
    if let Some(port) = lookup(ENV_PORT) {
        config.port = port
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid port: {:?}", ENV_PORT, port))?;
    }
    if let Some(database) = lookup(ENV_NAME) {
        config.database = database;
    }
    if let Some(user) = lookup(ENV_USER) {
        config.user = user;
    }
    if let Some(password) = lookup(ENV_PASSWORD) {
        config.password = Some(password);
    }
    Ok(())
}

/// Load environment variables from .env files.
///
/// dotenvy never overwrites variables that are already set, so the current
/// directory wins over ~/.cardctl/.env, and the real environment wins over both.
fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded .env from current directory: {}", path.display());
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => debug!("Loaded .env from {}", env_file.display()),
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }
}
