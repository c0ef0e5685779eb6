//! Spotify Liked Songs Tagger Library
//!
//! This library lets a user tag their Spotify liked songs with custom
//! attributes and tags, search and filter them from an in-memory snapshot, and
//! create or refresh "smart" playlists whose criteria travel inside the
//! playlist description.
//!
//! # Modules
//!
//! - `api` - JSON endpoints served by the local HTTP server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared across the crate
//! - `management` - Token handling, liked-songs cache and build coordination
//! - `server` - Local HTTP servers (OAuth callback and JSON API)
//! - `smart` - Smart playlist criteria codec and playlist synchronization
//! - `spotify` - Spotify Web API client implementation
//! - `store` - SQLite persistence for tracks and tags
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use sporltag::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> sporltag::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod smart;
pub mod spotify;
pub mod store;
pub mod types;
pub mod utils;

/// A convenient Result type alias for top-level glue that may fail.
///
/// Uses a boxed dynamic error trait object with Send + Sync bounds so that
/// errors from the configuration layer, the store and the async runtime can
/// be propagated together. Library code returns [`error::Result`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Starting authentication process...");
/// info!("Found {} smart playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Added {} songs", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for unrecoverable errors in CLI and startup paths. Library and server
/// code returns [`error::AppError`] instead.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues such as a rejected playlist description or a
/// failed batch that is reported in a summary.
///
/// # Example
///
/// ```
/// warning!("Cache file not found, will create new one");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a dimmed debug message when `SPORLTAG_DEBUG` is set.
///
/// # Example
///
/// ```
/// debug!("Using cache key: {}", key);
/// ```
#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => ({
    if $crate::config::debug_enabled() {
      use colored::Colorize;
      println!("[{}] {}", "·".dimmed(), std::format_args!($($arg)*));
    }
  })
}
