//! # Spotify Integration Module
//!
//! This module is the integration layer between sporltag and the remote
//! services it depends on. It handles all HTTP communication, the OAuth login
//! flow, rate limiting and the translation of wire payloads into the values
//! the core works with.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, HTTP API)
//!          ↓
//! Core (management, smart)
//!          ↓
//! Catalog trait
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 PKCE)
//!     ├── Client (liked songs, playlists)
//!     └── Audio features (ReccoBeats)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Core Modules
//!
//! - [`catalog`] - The [`catalog::Catalog`] trait the core is written
//!   against, plus the page and batch sizes of the remote API.
//! - [`client`] - [`client::SpotifyClient`], the reqwest-backed implementation
//!   with retry handling for 429 Too Many Requests and 502 Bad Gateway.
//! - [`auth`] - PKCE login: verifier and challenge, local callback server,
//!   browser launch, token exchange and refresh.
//! - [`features`] - On-demand tempo/energy/valence lookup.
//!
//! ## API Coverage
//!
//! - `GET /me` - Current user id
//! - `GET /me/tracks` - Liked songs, 50 per page
//! - `GET /me/tracks/contains` - Liked-songs membership, 50 ids per call
//! - `PUT /me/tracks` - Save to liked songs, 50 ids per call
//! - `GET /me/playlists` - Playlists, 50 per page
//! - `GET /playlists/{id}` and `GET /playlists/{id}/tracks` - Details and track ids
//! - `POST /users/{user_id}/playlists` - Create playlist
//! - `POST /playlists/{id}/tracks` - Add tracks, 100 URIs per call
//! - `POST /api/token` - Token exchange and refresh
//!
//! ## Error Types
//!
//! Everything returns [`crate::error::Result`]. A 401 from Spotify becomes
//! [`crate::error::AppError::AuthRequired`] and a 404 becomes
//! [`crate::error::AppError::NotFound`]; other transport and status failures
//! become [`crate::error::AppError::RemoteUnavailable`].

pub mod auth;
pub mod catalog;
pub mod client;
pub mod features;

pub use catalog::Catalog;
pub use client::SpotifyClient;
