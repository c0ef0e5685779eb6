//! Configuration management for sporltag.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, server settings, and the
//! location of the local database.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, sync::OnceLock};

use crate::error::{AppError, Result};

const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-read-private user-library-read user-library-modify user-read-playback-state";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory structure if it doesn't exist and loads variables
/// from `sporltag/.env` below the platform-specific local data directory:
/// - Linux: `~/.local/share/sporltag/.env`
/// - macOS: `~/Library/Application Support/sporltag/.env`
/// - Windows: `%LOCALAPPDATA%/sporltag/.env`
///
/// A `.env` in the working directory (or one of its parents) is read
/// afterwards. Variables that are already set are never overwritten, so the
/// process environment wins over the data directory, which wins over the
/// working directory. A missing `.env` file is not an error.
///
/// # Errors
///
/// Returns an error string if the parent directory cannot be created or the
/// `.env` file exists but cannot be parsed.
pub async fn load_env() -> std::result::Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }

    match dotenv::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Returns the application's local data directory (`<data_local_dir>/sporltag`).
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporltag");
    path
}

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| AppError::Config(format!("{} must be set", key)))
}

fn optional(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Returns the address the local HTTP server binds to.
///
/// Used by the OAuth callback server during `sporltag auth` and by the JSON
/// API during `sporltag serve`.
///
/// # Example
///
/// ```
/// let addr = server_addr()?; // e.g., "127.0.0.1:5000"
/// ```
pub fn server_addr() -> Result<String> {
    required("SERVER_ADDRESS")
}

/// Returns the Spotify API client ID for authentication.
///
/// # Errors
///
/// Fails with [`AppError::Config`] if `SPOTIFY_API_AUTH_CLIENT_ID` is not set.
pub fn spotify_client_id() -> Result<String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify OAuth redirect URI.
///
/// This must match the redirect URI registered in the Spotify application
/// settings, e.g. `http://127.0.0.1:5000/callback`.
pub fn spotify_redirect_uri() -> Result<String> {
    required("SPOTIFY_API_REDIRECT_URI")
}

/// Returns the Spotify API scope permissions requested during login.
pub fn spotify_scope() -> String {
    optional("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

/// Returns the Spotify OAuth authorization URL.
pub fn spotify_apiauth_url() -> String {
    optional(
        "SPOTIFY_API_AUTH_URL",
        "https://accounts.spotify.com/authorize",
    )
}

/// Returns the Spotify Web API base URL.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", "https://api.spotify.com/v1")
}

/// Returns the Spotify OAuth token exchange URL.
pub fn spotify_apitoken_url() -> String {
    optional(
        "SPOTIFY_API_TOKEN_URL",
        "https://accounts.spotify.com/api/token",
    )
}

/// Returns the base URL of the audio-features service.
pub fn reccobeats_apiurl() -> String {
    optional("RECCOBEATS_API_URL", "https://api.reccobeats.com/v1")
}

/// Returns the path of the SQLite database holding tracks and tags.
///
/// Defaults to `sporltag.db` in the local data directory unless
/// `SPORLTAG_DATABASE` is set.
pub fn database_path() -> PathBuf {
    match env::var("SPORLTAG_DATABASE") {
        Ok(path) => PathBuf::from(path),
        Err(_) => data_dir().join("sporltag.db"),
    }
}

/// Whether debug output is enabled (`SPORLTAG_DEBUG` set to anything but `0`).
pub fn debug_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        env::var("SPORLTAG_DEBUG")
            .map(|v| !v.is_empty() && v != "0")
            .unwrap_or(false)
    })
}
