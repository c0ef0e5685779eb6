//! # CLI Module
//!
//! Command implementations behind the `sporltag` binary. Every command opens
//! its own session: it loads the persisted token, resolves the user, opens
//! the SQLite store and, where needed, builds a fresh liked-songs snapshot
//! for the lifetime of the process.
//!
//! ## Commands
//!
//! - [`auth`] - Spotify login via OAuth 2.0 PKCE
//! - [`serve`] - Run the JSON API for the web front-end
//! - [`cache`] - Build the liked-songs snapshot and print its counts
//! - [`search`] - Search liked songs by name or artist
//! - [`tags`] - List tags, most recent first
//! - [`smart_list`], [`smart_create`], [`smart_refresh`] - Smart playlists
//! - [`import`] - Save the tracks of playlists to liked songs
//!
//! ## Usage
//!
//! ```bash
//! sporltag auth
//! sporltag search "daft punk"
//! sporltag smart create --name "Calm" --tempo-max 2 --include 3
//! sporltag smart refresh --all
//! ```
//!
//! Failures print a red marker and exit with status 1; partial results are
//! reported as warnings.

mod auth;
mod import;
mod library;
mod serve;
mod session;
mod smart;

pub use auth::auth;
pub use import::import;
pub use library::{cache, search, tags};
pub use serve::serve;
pub use smart::CreateArgs as SmartCreateArgs;
pub use smart::create as smart_create;
pub use smart::list as smart_list;
pub use smart::refresh as smart_refresh;
