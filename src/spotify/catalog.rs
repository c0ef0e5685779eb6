use std::future::Future;

use crate::{
    error::Result,
    types::{CreatedPlaylist, Page, PlaylistDetails, PlaylistSummary, RemoteTrack},
};

/// Page size for the liked-songs listing.
pub const SAVED_TRACKS_PAGE_SIZE: u32 = 50;
/// Page size for the playlists listing.
pub const PLAYLISTS_PAGE_SIZE: u32 = 50;
/// Maximum number of track URIs per add-to-playlist request.
pub const ADD_TRACKS_BATCH_SIZE: usize = 100;
/// Maximum number of ids per liked-songs contains/save request.
pub const SAVED_TRACKS_BATCH_SIZE: usize = 50;

/// The remote music catalog as seen by the core.
///
/// [`crate::spotify::client::SpotifyClient`] talks to the Spotify Web API;
/// tests provide in-process implementations.
pub trait Catalog: Send + Sync {
    /// Id of the user the credential belongs to.
    fn current_user_id(&self) -> impl Future<Output = Result<String>> + Send;

    /// One page of the user's liked songs. Items without a usable track
    /// (removed or local files) are `None` but still occupy their position.
    fn list_saved_tracks(
        &self,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<Page<Option<RemoteTrack>>>> + Send;

    /// Name, description and all track ids of a playlist.
    fn get_playlist(&self, playlist_id: &str)
    -> impl Future<Output = Result<PlaylistDetails>> + Send;

    /// One page of the playlists visible to the user, owned or followed.
    fn list_playlists(
        &self,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<Page<PlaylistSummary>>> + Send;

    fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> impl Future<Output = Result<CreatedPlaylist>> + Send;

    /// Appends track URIs (at most [`ADD_TRACKS_BATCH_SIZE`]) to a playlist.
    fn add_tracks_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> impl Future<Output = Result<()>> + Send;

    /// For each id (at most [`SAVED_TRACKS_BATCH_SIZE`]), whether it is liked.
    fn check_saved_tracks_contain(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<bool>>> + Send;

    /// Adds ids (at most [`SAVED_TRACKS_BATCH_SIZE`]) to the liked songs.
    fn save_tracks(&self, ids: &[String]) -> impl Future<Output = Result<()>> + Send;
}

/// Every playlist visible to the user, walking pages of [`PLAYLISTS_PAGE_SIZE`].
pub async fn all_playlists<C: Catalog>(catalog: &C) -> Result<Vec<PlaylistSummary>> {
    let mut playlists = Vec::new();
    let mut offset: u32 = 0;

    loop {
        let page = catalog.list_playlists(PLAYLISTS_PAGE_SIZE, offset).await?;
        let done = !page.has_next || page.items.is_empty();
        playlists.extend(page.items);
        if done {
            break;
        }
        offset += PLAYLISTS_PAGE_SIZE;
    }

    Ok(playlists)
}
