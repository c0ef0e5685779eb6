//! In-memory snapshot of a user's liked songs.
//!
//! A snapshot is built once per cache key from the remote liked-songs listing
//! and then serves search, filtering, navigation and playlist synchronization
//! without further remote calls. Snapshots are never updated in place: they
//! are replaced wholesale by the next build and vanish with the process.
//!
//! The `tags` of a [`CachedTrack`] are captured at build time and are display
//! data only. Anything that decides membership (filtering, untagged
//! navigation) reads the current tags from the [`Store`] by local id.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{
    debug,
    error::Result,
    spotify::catalog::{Catalog, SAVED_TRACKS_PAGE_SIZE},
    store::Store,
    types::{LocalTrack, Tag},
};

/// How long a snapshot counts as fresh.
pub const CACHE_TTL_SECS: i64 = 3600;
/// Maximum number of search results.
pub const SEARCH_LIMIT: usize = 20;
/// Queries shorter than this (in characters, after trimming) match nothing.
pub const MIN_QUERY_CHARS: usize = 2;

/// Opaque key scoping one user's snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for the session of the given Spotify user.
    pub fn for_user(user_id: &str) -> Self {
        Self(format!("user_{}", user_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedTrack {
    pub spotify_id: String,
    pub local_id: i64,
    pub name: String,
    pub artist: String,
    pub album: String,
    /// Offset in the liked-songs list when the snapshot was taken.
    pub position: usize,
    /// Tags at build time, possibly stale.
    pub tags: Vec<Tag>,
    #[serde(skip)]
    pub search_text: String,
}

impl CachedTrack {
    pub fn new(track: &LocalTrack, position: usize) -> Self {
        Self {
            spotify_id: track.spotify_id.clone(),
            local_id: track.id,
            name: track.name.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            position,
            tags: track.tags.clone(),
            search_text: format!("{} {}", track.name, track.artist).to_lowercase(),
        }
    }
}

/// Counts reported to callers after a cache check or build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
    pub total_songs: usize,
    pub total_untagged: usize,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    tracks: Vec<CachedTrack>,
    cached_at: DateTime<Utc>,
    total: usize,
    untagged: usize,
}

impl CacheEntry {
    /// Wraps `tracks` (in liked-songs order) taken at `cached_at`.
    pub fn new(tracks: Vec<CachedTrack>, cached_at: DateTime<Utc>) -> Self {
        let untagged = tracks.iter().filter(|t| t.tags.is_empty()).count();
        Self {
            total: tracks.len(),
            untagged,
            tracks,
            cached_at,
        }
    }

    pub fn tracks(&self) -> &[CachedTrack] {
        &self.tracks
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Tracks that had no tags at build time.
    pub fn untagged(&self) -> usize {
        self.untagged
    }

    pub fn summary(&self) -> CacheSummary {
        CacheSummary {
            total_songs: self.total,
            total_untagged: self.untagged,
            cached_at: self.cached_at,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.cached_at < Duration::seconds(CACHE_TTL_SECS)
    }

    /// Case-insensitive substring search over `name + " " + artist`.
    ///
    /// Returns at most [`SEARCH_LIMIT`] records in snapshot order; queries
    /// shorter than [`MIN_QUERY_CHARS`] return nothing.
    pub fn search(&self, query: &str) -> Vec<&CachedTrack> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        self.tracks
            .iter()
            .filter(|t| t.search_text.contains(&query))
            .take(SEARCH_LIMIT)
            .collect()
    }

    pub fn find_by_position(&self, position: usize) -> Option<&CachedTrack> {
        self.tracks.iter().find(|t| t.position == position)
    }

    /// First record after `position`; with `untagged_only` the first one
    /// that currently has no tags in the store.
    pub fn next_track(
        &self,
        store: &Store,
        position: usize,
        untagged_only: bool,
    ) -> Result<Option<&CachedTrack>> {
        for track in self.tracks.iter().filter(|t| t.position > position) {
            if !untagged_only || store.track_tags(track.local_id)?.is_empty() {
                return Ok(Some(track));
            }
        }
        Ok(None)
    }

    /// Last record before `position`, with the same `untagged_only` rule as
    /// [`CacheEntry::next_track`].
    pub fn previous_track(
        &self,
        store: &Store,
        position: usize,
        untagged_only: bool,
    ) -> Result<Option<&CachedTrack>> {
        for track in self.tracks.iter().rev().filter(|t| t.position < position) {
            if !untagged_only || store.track_tags(track.local_id)?.is_empty() {
                return Ok(Some(track));
            }
        }
        Ok(None)
    }
}

/// Process-wide snapshots keyed by [`CacheKey`].
///
/// The map sits behind its own mutex, held only to read or swap an
/// `Arc<CacheEntry>`; readers keep using their `Arc` after the lock is gone.
#[derive(Default)]
pub struct LikedSongsCache {
    entries: Mutex<HashMap<CacheKey, Arc<CacheEntry>>>,
}

impl LikedSongsCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<CacheEntry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The snapshot for `key`, if one was built. Never triggers a build.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries().get(key).cloned()
    }

    /// Replaces the snapshot for `key`.
    pub fn insert(&self, key: CacheKey, entry: Arc<CacheEntry>) {
        self.entries().insert(key, entry);
    }

    pub fn clear(&self, key: &CacheKey) -> bool {
        self.entries().remove(key).is_some()
    }

    /// Pulls the full liked-songs list and publishes a fresh snapshot.
    ///
    /// Pages of [`SAVED_TRACKS_PAGE_SIZE`] are fetched until a page reports no
    /// next page; every track is upserted in the store so it has a local id.
    /// Remote calls and store writes happen without holding the cache lock;
    /// only the final swap takes it. On error nothing is published and any
    /// previous snapshot for `key` stays as it was.
    ///
    /// `on_progress` receives the number of songs cached so far after each
    /// page.
    pub async fn build<C, F>(
        &self,
        key: &CacheKey,
        catalog: &C,
        store: &Store,
        mut on_progress: F,
    ) -> Result<Arc<CacheEntry>>
    where
        C: Catalog,
        F: FnMut(usize) + Send,
    {
        let mut tracks: Vec<CachedTrack> = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let page = catalog
                .list_saved_tracks(SAVED_TRACKS_PAGE_SIZE, offset)
                .await?;
            if page.items.is_empty() {
                break;
            }

            for (i, item) in page.items.into_iter().enumerate() {
                let Some(remote) = item else {
                    continue;
                };
                let local = store.upsert_track(&remote)?;
                tracks.push(CachedTrack::new(&local, offset as usize + i));
            }

            on_progress(tracks.len());
            debug!("Cached {} songs so far for {}", tracks.len(), key);

            if !page.has_next {
                break;
            }
            offset += SAVED_TRACKS_PAGE_SIZE;
        }

        let entry = Arc::new(CacheEntry::new(tracks, Utc::now()));
        self.insert(key.clone(), Arc::clone(&entry));

        debug!(
            "Finished caching {} liked songs ({} untagged) for {}",
            entry.total(),
            entry.untagged(),
            key
        );
        Ok(entry)
    }
}
