use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;

use crate::{
    config, debug,
    error::{AppError, Result},
    spotify::catalog::Catalog,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, CreatedPlaylist, CurrentUserResponse, GetPlaylistResponse,
        GetUserPlaylistsResponse, Page, PlaylistDetails, PlaylistSummary, PlaylistTracksPage,
        RemoteTrack, SaveTracksRequest, SavedTracksResponse,
    },
    utils, warning,
};

const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 120;
const PLAYLIST_TRACKS_PAGE_SIZE: u32 = 100;

/// Spotify Web API client bound to one access token.
///
/// Rate limits (429) are retried after the advertised `Retry-After` delay when
/// it is at most two minutes; 502 Bad Gateway is retried after ten seconds.
/// Both are bounded to [`MAX_ATTEMPTS`] tries. A 401 surfaces as
/// [`AppError::AuthRequired`], a 404 as [`AppError::NotFound`] and every
/// other failure as [`AppError::RemoteUnavailable`].
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: String,
}

impl SpotifyClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, config::spotify_apiurl())
    }

    pub fn with_base_url(token: String, api_url: String) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn execute<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = build(&self.http).bearer_auth(&self.token).send().await?;

            match response.status() {
                StatusCode::TOO_MANY_REQUESTS if attempt < MAX_ATTEMPTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(1);

                    if retry_after > MAX_RETRY_AFTER_SECS {
                        warning!(
                            "Retry after has reached a abnormal high of {} seconds. Try again later.",
                            retry_after
                        );
                        return Err(AppError::RemoteUnavailable(format!(
                            "rate limited for {} seconds",
                            retry_after
                        )));
                    }

                    debug!("Rate limited, retrying in {} seconds", retry_after);
                    sleep(Duration::from_secs(retry_after)).await;
                }
                StatusCode::BAD_GATEWAY if attempt < MAX_ATTEMPTS => {
                    sleep(Duration::from_secs(10)).await;
                }
                _ => return Ok(response.error_for_status()?),
            }
        }
    }

    async fn playlist_track_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        let mut track_ids = Vec::new();
        let mut offset = 0;

        loop {
            let url = self.url(&format!("/playlists/{}/tracks", playlist_id));
            let page = self
                .execute(|http| {
                    http.get(&url).query(&[
                        ("fields", "items(track(id)),next,total".to_string()),
                        ("limit", PLAYLIST_TRACKS_PAGE_SIZE.to_string()),
                        ("offset", offset.to_string()),
                    ])
                })
                .await?
                .json::<PlaylistTracksPage>()
                .await?;

            let fetched = page.items.len() as u32;
            track_ids.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.track.and_then(|t| t.id)),
            );

            if page.next.is_none() || fetched == 0 {
                break;
            }
            offset += fetched;
        }

        Ok(track_ids)
    }
}

impl Catalog for SpotifyClient {
    async fn current_user_id(&self) -> Result<String> {
        let url = self.url("/me");
        let user = self
            .execute(|http| http.get(&url))
            .await?
            .json::<CurrentUserResponse>()
            .await?;
        Ok(user.id)
    }

    async fn list_saved_tracks(&self, limit: u32, offset: u32) -> Result<Page<Option<RemoteTrack>>> {
        let url = self.url("/me/tracks");
        let res = self
            .execute(|http| http.get(&url).query(&[("limit", limit), ("offset", offset)]))
            .await?
            .json::<SavedTracksResponse>()
            .await?;

        Ok(Page {
            items: res
                .items
                .into_iter()
                .map(|item| item.track.and_then(|t| t.into_remote()))
                .collect(),
            has_next: res.next.is_some(),
        })
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistDetails> {
        let url = self.url(&format!("/playlists/{}", playlist_id));
        let res = self
            .execute(|http| {
                http.get(&url).query(&[(
                    "fields",
                    "id,name,description,external_urls,tracks(items(track(id)),next,total)",
                )])
            })
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound(format!("Playlist {}", playlist_id)),
                other => other,
            })?
            .json::<GetPlaylistResponse>()
            .await?;

        // the embedded first page is enough for short playlists
        let track_ids = if res.tracks.next.is_none() {
            res.tracks
                .items
                .into_iter()
                .filter_map(|item| item.track.and_then(|t| t.id))
                .collect()
        } else {
            self.playlist_track_ids(playlist_id).await?
        };

        Ok(PlaylistDetails {
            id: res.id,
            name: res.name,
            description: utils::unescape_html(&res.description.unwrap_or_default()),
            url: res.external_urls.spotify,
            track_ids,
        })
    }

    async fn list_playlists(&self, limit: u32, offset: u32) -> Result<Page<PlaylistSummary>> {
        let url = self.url("/me/playlists");
        let res = self
            .execute(|http| http.get(&url).query(&[("limit", limit), ("offset", offset)]))
            .await?
            .json::<GetUserPlaylistsResponse>()
            .await?;

        Ok(Page {
            items: res
                .items
                .into_iter()
                .map(|p| PlaylistSummary {
                    id: p.id,
                    name: p.name,
                    owner_id: p.owner.id,
                    track_count: p.tracks.total,
                })
                .collect(),
            has_next: res.next.is_some(),
        })
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<CreatedPlaylist> {
        let url = self.url(&format!("/users/{}/playlists", owner_id));
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public,
            collaborative: false,
        };

        let res = self
            .execute(|http| http.post(&url).json(&body))
            .await?
            .json::<CreatePlaylistResponse>()
            .await?;

        Ok(CreatedPlaylist {
            id: res.id,
            name: res.name,
            url: res.external_urls.spotify,
        })
    }

    async fn add_tracks_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let url = self.url(&format!("/playlists/{}/tracks", playlist_id));
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let res = self
            .execute(|http| http.post(&url).json(&body))
            .await?
            .json::<AddTrackToPlaylistResponse>()
            .await?;
        debug!("Playlist {} now at snapshot {}", playlist_id, res.snapshot_id);
        Ok(())
    }

    async fn check_saved_tracks_contain(&self, ids: &[String]) -> Result<Vec<bool>> {
        let url = self.url("/me/tracks/contains");
        let joined = ids.join(",");
        let flags = self
            .execute(|http| http.get(&url).query(&[("ids", joined.as_str())]))
            .await?
            .json::<Vec<bool>>()
            .await?;
        Ok(flags)
    }

    async fn save_tracks(&self, ids: &[String]) -> Result<()> {
        let url = self.url("/me/tracks");
        let body = SaveTracksRequest { ids: ids.to_vec() };
        self.execute(|http| http.put(&url).json(&body)).await?;
        Ok(())
    }
}
