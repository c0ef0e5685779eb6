//! # API Module
//!
//! JSON endpoints of the local sporltag server plus the OAuth callback used
//! during login.
//!
//! ## Endpoints
//!
//! ### Authentication and monitoring
//!
//! - [`callback`] - Completes the PKCE flow by trading the authorization code
//!   for a token.
//! - [`health`] - Liveness probe with the crate version.
//!
//! ### Liked songs ([`library`])
//!
//! - `POST /cache?force=` - Build or reuse the liked-songs snapshot
//! - `GET /cache/progress` - Songs cached so far by a running build
//! - `GET /songs/search?q=` - Substring search over name and artist
//! - `GET /songs/filter` - Tracks matching attribute ranges and tag sets
//! - `GET /songs/at?position=` - The record at an exact position
//! - `GET /songs/next`, `GET /songs/previous` - Navigation by position
//! - `POST /liked/import` - Save the tracks of playlists (or `all` owned ones)
//!   to liked songs
//! - `GET /playlists/count` - Number of playlists an import of all would read
//!
//! ### Tagging ([`tags`])
//!
//! - `GET|POST /songs/{id}/attributes`, `GET|POST /songs/{id}/tags`
//! - `DELETE /songs/{id}/tags/{tag_id}`, `GET /songs/{id}/audio-features`
//! - `GET /tags`, `DELETE /tags/{id}`
//!
//! ### Playlists ([`playlists`])
//!
//! - `GET /playlists`, `GET|POST /playlists/smart`
//! - `POST /playlists/{id}/refresh`, `POST /playlists/refresh-all`
//!
//! ## Errors
//!
//! Handlers return [`crate::error::Result`]. Failures become a JSON body
//! `{"error": "..."}` with a status derived from the [`AppError`] variant.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{error::AppError, warning};

mod callback;
mod health;
mod library;
mod playlists;
mod tags;

pub use callback::callback;
pub use health::health;
pub use library::{
    cache_progress, filter_songs, import_liked, load_cache, next_song, owned_playlist_count,
    previous_song, search_songs, song_at,
};
pub use playlists::{
    create_smart_playlist, list_playlists, list_smart_playlists, refresh_all_playlists,
    refresh_playlist,
};
pub use tags::{
    add_tag, audio_features, delete_tag, get_attributes, list_tags, remove_tag, set_attributes,
    song_tags,
};

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthRequired => StatusCode::UNAUTHORIZED,
            AppError::NoCacheAvailable
            | AppError::NotSmart
            | AppError::NoMatches
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::CriteriaCorrupt(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warning!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
