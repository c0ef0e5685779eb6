#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use sporltag::{
    error::{AppError, Result},
    spotify::Catalog,
    types::{CreatedPlaylist, Page, PlaylistDetails, PlaylistSummary, RemoteTrack},
};

pub const USER_ID: &str = "listener";

pub fn remote(id: &str, name: &str, artist: &str) -> RemoteTrack {
    RemoteTrack {
        spotify_id: id.to_string(),
        name: name.to_string(),
        artist: artist.to_string(),
        album: format!("{} album", name),
        duration_ms: 200_000,
    }
}

/// `count` liked songs named `Song <n>` by `Artist <n>` with ids `t<n>`.
pub fn numbered_tracks(count: usize) -> Vec<Option<RemoteTrack>> {
    (0..count)
        .map(|n| {
            Some(remote(
                &format!("t{}", n),
                &format!("Song {}", n),
                &format!("Artist {}", n),
            ))
        })
        .collect()
}

struct MockPlaylist {
    owner_id: String,
    details: PlaylistDetails,
}

/// In-process catalog recording every mutating call.
#[derive(Default)]
pub struct MockCatalog {
    liked: Vec<Option<RemoteTrack>>,
    playlists: Mutex<Vec<MockPlaylist>>,
    unreadable: HashSet<String>,
    saved_tracks_fail_from: Option<u32>,
    page_delay: Option<Duration>,
    add_fails_on_call: Option<usize>,
    create_rejections: Mutex<usize>,
    contains_fails: bool,
    saved: Mutex<HashSet<String>>,
    pub add_calls: Mutex<Vec<(String, Vec<String>)>>,
    pub create_attempts: Mutex<Vec<String>>,
    pub save_calls: Mutex<Vec<Vec<String>>>,
    pub saved_pages_fetched: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_liked(mut self, liked: Vec<Option<RemoteTrack>>) -> Self {
        self.saved = Mutex::new(
            liked
                .iter()
                .flatten()
                .map(|t| t.spotify_id.clone())
                .collect(),
        );
        self.liked = liked;
        self
    }

    pub fn with_playlist(self, owner_id: &str, id: &str, description: &str, track_ids: &[&str]) -> Self {
        self.playlists.lock().unwrap().push(MockPlaylist {
            owner_id: owner_id.to_string(),
            details: PlaylistDetails {
                id: id.to_string(),
                name: format!("Playlist {}", id),
                description: description.to_string(),
                url: Some(format!("https://open.spotify.com/playlist/{}", id)),
                track_ids: track_ids.iter().map(|t| t.to_string()).collect(),
            },
        });
        self
    }

    pub fn with_unreadable_playlist(mut self, id: &str) -> Self {
        self.unreadable.insert(id.to_string());
        self
    }

    /// Saved-tracks pages starting at `offset` or later fail.
    pub fn failing_saved_tracks_from(mut self, offset: u32) -> Self {
        self.saved_tracks_fail_from = Some(offset);
        self
    }

    /// Every saved-tracks page takes `delay` to arrive.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = Some(delay);
        self
    }

    /// The add-tracks call with this zero-based index fails.
    pub fn failing_add_on_call(mut self, call: usize) -> Self {
        self.add_fails_on_call = Some(call);
        self
    }

    /// The first `count` create-playlist attempts are rejected.
    pub fn rejecting_creates(self, count: usize) -> Self {
        *self.create_rejections.lock().unwrap() = count;
        self
    }

    pub fn failing_contains(mut self) -> Self {
        self.contains_fails = true;
        self
    }

    pub fn playlist_track_ids(&self, id: &str) -> Vec<String> {
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.details.id == id)
            .map(|p| p.details.track_ids.clone())
            .unwrap_or_default()
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved.lock().unwrap().contains(id)
    }
}

fn unavailable(reason: &str) -> AppError {
    AppError::RemoteUnavailable(reason.to_string())
}

impl Catalog for MockCatalog {
    async fn current_user_id(&self) -> Result<String> {
        Ok(USER_ID.to_string())
    }

    async fn list_saved_tracks(&self, limit: u32, offset: u32) -> Result<Page<Option<RemoteTrack>>> {
        if let Some(delay) = self.page_delay {
            tokio::time::sleep(delay).await;
        }
        if self.saved_tracks_fail_from.is_some_and(|from| offset >= from) {
            return Err(unavailable("502 Bad Gateway"));
        }
        self.saved_pages_fetched.fetch_add(1, Ordering::SeqCst);

        let start = (offset as usize).min(self.liked.len());
        let end = (start + limit as usize).min(self.liked.len());
        Ok(Page {
            items: self.liked[start..end].to_vec(),
            has_next: end < self.liked.len(),
        })
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistDetails> {
        if self.unreadable.contains(playlist_id) {
            return Err(unavailable("500 Internal Server Error"));
        }
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.details.id == playlist_id)
            .map(|p| p.details.clone())
            .ok_or_else(|| AppError::NotFound(format!("Playlist {}", playlist_id)))
    }

    async fn list_playlists(&self, limit: u32, offset: u32) -> Result<Page<PlaylistSummary>> {
        let playlists = self.playlists.lock().unwrap();
        let start = (offset as usize).min(playlists.len());
        let end = (start + limit as usize).min(playlists.len());
        Ok(Page {
            items: playlists[start..end]
                .iter()
                .map(|p| PlaylistSummary {
                    id: p.details.id.clone(),
                    name: p.details.name.clone(),
                    owner_id: p.owner_id.clone(),
                    track_count: p.details.track_ids.len() as u32,
                })
                .collect(),
            has_next: end < playlists.len(),
        })
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        _public: bool,
        description: &str,
    ) -> Result<CreatedPlaylist> {
        self.create_attempts
            .lock()
            .unwrap()
            .push(description.to_string());

        let mut rejections = self.create_rejections.lock().unwrap();
        if *rejections > 0 {
            *rejections -= 1;
            return Err(unavailable("400 Bad Request"));
        }
        drop(rejections);

        let mut playlists = self.playlists.lock().unwrap();
        let id = format!("created{}", playlists.len());
        playlists.push(MockPlaylist {
            owner_id: owner_id.to_string(),
            details: PlaylistDetails {
                id: id.clone(),
                name: name.to_string(),
                description: description.to_string(),
                url: Some(format!("https://open.spotify.com/playlist/{}", id)),
                track_ids: Vec::new(),
            },
        });

        Ok(CreatedPlaylist {
            url: Some(format!("https://open.spotify.com/playlist/{}", id)),
            id,
            name: name.to_string(),
        })
    }

    async fn add_tracks_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let mut calls = self.add_calls.lock().unwrap();
        if self.add_fails_on_call == Some(calls.len()) {
            calls.push((playlist_id.to_string(), Vec::new()));
            return Err(unavailable("500 Internal Server Error"));
        }
        calls.push((playlist_id.to_string(), uris.to_vec()));
        drop(calls);

        let mut playlists = self.playlists.lock().unwrap();
        if let Some(p) = playlists.iter_mut().find(|p| p.details.id == playlist_id) {
            p.details.track_ids.extend(
                uris.iter()
                    .map(|uri| uri.trim_start_matches("spotify:track:").to_string()),
            );
        }
        Ok(())
    }

    async fn check_saved_tracks_contain(&self, ids: &[String]) -> Result<Vec<bool>> {
        if self.contains_fails {
            return Err(unavailable("503 Service Unavailable"));
        }
        let saved = self.saved.lock().unwrap();
        Ok(ids.iter().map(|id| saved.contains(id)).collect())
    }

    async fn save_tracks(&self, ids: &[String]) -> Result<()> {
        self.save_calls.lock().unwrap().push(ids.to_vec());
        self.saved.lock().unwrap().extend(ids.iter().cloned());
        Ok(())
    }
}
