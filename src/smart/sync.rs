use std::collections::HashSet;

use serde::Serialize;

use crate::{
    debug,
    error::{AppError, Result},
    management::{CacheEntry, PlaylistFailure},
    smart::criteria::{self, Criteria},
    spotify::{
        Catalog,
        catalog::{ADD_TRACKS_BATCH_SIZE, all_playlists},
    },
    store::Store,
    types::{CreatedPlaylist, LocalTrack},
    utils, warning,
};

/// Upper bound for a playlist description, marker included.
pub const DESCRIPTION_MAX_CHARS: usize = 250;
/// Last-resort description when the remote rejects the others.
pub const GENERIC_DESCRIPTION: &str = "Created with sporltag filters";

/// Whether a track satisfies `criteria`. Tracks with any attribute unset
/// never match.
pub fn matches(criteria: &Criteria, track: &LocalTrack) -> bool {
    let attributes = track.attributes;
    let (Some(tempo), Some(energy), Some(mood)) =
        (attributes.tempo, attributes.energy, attributes.mood)
    else {
        return false;
    };

    if !criteria.tempo.contains(tempo)
        || !criteria.energy.contains(energy)
        || !criteria.mood.contains(mood)
    {
        return false;
    }

    let tags: HashSet<i64> = track.tag_ids().collect();
    criteria.include.iter().all(|id| tags.contains(id))
        && !criteria.exclude.iter().any(|id| tags.contains(id))
}

/// Snapshot tracks matching `criteria` that are not yet in `current_ids`,
/// in snapshot order.
///
/// Attributes and tags come from the store, not from the snapshot, so tags
/// changed after the build are honored.
pub fn compute_delta(
    criteria: &Criteria,
    entry: &CacheEntry,
    current_ids: &HashSet<String>,
    store: &Store,
) -> Result<Vec<LocalTrack>> {
    let mut delta = Vec::new();
    for cached in entry.tracks() {
        if current_ids.contains(&cached.spotify_id) {
            continue;
        }
        let Some(track) = store.get_track(cached.local_id)? else {
            debug!("Cached track {} has no local row", cached.spotify_id);
            continue;
        };
        if matches(criteria, &track) {
            delta.push(track);
        }
    }
    Ok(delta)
}

/// All snapshot tracks matching `criteria`.
pub fn filter(criteria: &Criteria, entry: &CacheEntry, store: &Store) -> Result<Vec<LocalTrack>> {
    compute_delta(criteria, entry, &HashSet::new(), store)
}

/// How far an [`apply`] got. Counts are in tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub applied: usize,
    pub failed: usize,
    pub skipped: usize,
    pub error: Option<String>,
}

impl ApplyOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Appends tracks to a playlist in batches of [`ADD_TRACKS_BATCH_SIZE`].
///
/// Stops at the first failing batch: its tracks count as failed, the
/// remaining ones as skipped. Batches added before the failure stay.
pub async fn apply<C: Catalog>(catalog: &C, playlist_id: &str, spotify_ids: &[String]) -> ApplyOutcome {
    let uris: Vec<String> = spotify_ids.iter().map(|id| utils::track_uri(id)).collect();
    let mut outcome = ApplyOutcome::default();
    let mut batches = uris.chunks(ADD_TRACKS_BATCH_SIZE);

    while let Some(batch) = batches.next() {
        match catalog.add_tracks_to_playlist(playlist_id, batch).await {
            Ok(()) => outcome.applied += batch.len(),
            Err(e) => {
                warning!(
                    "Adding tracks to playlist {} stopped after {}: {}",
                    playlist_id,
                    outcome.applied,
                    e
                );
                outcome.failed = batch.len();
                outcome.skipped = batches.by_ref().map(<[String]>::len).sum();
                outcome.error = Some(e.to_string());
                break;
            }
        }
    }

    outcome
}

/// A playlist to be created from criteria.
#[derive(Debug, Clone)]
pub struct NewSmartPlaylist {
    pub name: String,
    pub description: String,
    pub criteria: Criteria,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedSmartPlaylist {
    pub playlist: CreatedPlaylist,
    pub description: String,
    /// False when the remote refused every description carrying the
    /// criteria. Such a playlist can't be refreshed later.
    pub smart: bool,
    pub matched: usize,
    pub outcome: ApplyOutcome,
}

/// Builds `human [ST:token]`, cleaning the human text and shortening it so
/// the whole description fits [`DESCRIPTION_MAX_CHARS`]. The token itself is
/// never cut.
pub fn smart_description(human: &str, criteria: &Criteria) -> Result<String> {
    let marker = criteria::marker(criteria)?;
    let budget = DESCRIPTION_MAX_CHARS.saturating_sub(marker.chars().count());
    let cleaned = utils::clean_description(human);
    let human = utils::truncate_chars(criteria::human_text(&cleaned), budget);
    if human.is_empty() {
        return Ok(marker.trim_start().to_string());
    }
    Ok(format!("{}{}", human, marker))
}

/// Creates a playlist holding every snapshot track that matches, with the
/// criteria embedded in its description.
///
/// If the remote rejects the description, creation is retried with the
/// human text alone and then with [`GENERIC_DESCRIPTION`]. The result says
/// whether the criteria made it.
pub async fn create_filtered<C: Catalog>(
    catalog: &C,
    store: &Store,
    owner_id: &str,
    request: &NewSmartPlaylist,
    entry: &CacheEntry,
) -> Result<CreatedSmartPlaylist> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidInput("playlist name is required".to_string()));
    }

    let matching = filter(&request.criteria, entry, store)?;
    if matching.is_empty() {
        return Err(AppError::NoMatches);
    }
    debug!("{} tracks match {}", matching.len(), request.criteria);

    let full = smart_description(&request.description, &request.criteria)?;
    let human = criteria::human_text(&full).to_string();
    let attempts = [
        (full, true),
        (human, false),
        (GENERIC_DESCRIPTION.to_string(), false),
    ];

    let mut created = None;
    let mut last_error = None;
    for (description, smart) in attempts {
        match catalog
            .create_playlist(owner_id, &request.name, request.public, &description)
            .await
        {
            Ok(playlist) => {
                created = Some((playlist, description, smart));
                break;
            }
            Err(AppError::AuthRequired) => return Err(AppError::AuthRequired),
            Err(e) => {
                warning!("Playlist creation rejected description {:?}: {}", description, e);
                last_error = Some(e);
            }
        }
    }

    let Some((playlist, description, smart)) = created else {
        return Err(last_error.unwrap_or_else(|| {
            AppError::RemoteUnavailable("playlist creation failed".to_string())
        }));
    };
    if !smart {
        warning!(
            "Playlist {} was created without its criteria and can't be refreshed",
            playlist.name
        );
    }

    let ids: Vec<String> = matching.iter().map(|t| t.spotify_id.clone()).collect();
    let outcome = apply(catalog, &playlist.id, &ids).await;

    Ok(CreatedSmartPlaylist {
        playlist,
        description,
        smart,
        matched: matching.len(),
        outcome,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedTrack {
    pub spotify_id: String,
    pub name: String,
    pub artist: String,
}

impl From<LocalTrack> for AddedTrack {
    fn from(track: LocalTrack) -> Self {
        Self {
            spotify_id: track.spotify_id,
            name: track.name,
            artist: track.artist,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub playlist_id: String,
    pub playlist_name: String,
    /// Only the tracks that were actually added.
    pub added: Vec<AddedTrack>,
    pub outcome: ApplyOutcome,
}

/// Adds the tracks that match a smart playlist's criteria but are missing
/// from it. Fails with [`AppError::NotSmart`] or
/// [`AppError::CriteriaCorrupt`] when the description can't provide criteria.
pub async fn refresh<C: Catalog>(
    catalog: &C,
    store: &Store,
    entry: &CacheEntry,
    playlist_id: &str,
) -> Result<RefreshReport> {
    let details = catalog.get_playlist(playlist_id).await?;
    let criteria = criteria::decode(&details.description)?;
    let current: HashSet<String> = details.track_ids.into_iter().collect();

    sync_playlist(catalog, store, entry, &details.id, &details.name, &criteria, &current).await
}

async fn sync_playlist<C: Catalog>(
    catalog: &C,
    store: &Store,
    entry: &CacheEntry,
    playlist_id: &str,
    playlist_name: &str,
    criteria: &Criteria,
    current: &HashSet<String>,
) -> Result<RefreshReport> {
    let delta = compute_delta(criteria, entry, current, store)?;
    debug!("{} new tracks for playlist {}", delta.len(), playlist_name);

    let ids: Vec<String> = delta.iter().map(|t| t.spotify_id.clone()).collect();
    let outcome = apply(catalog, playlist_id, &ids).await;
    let added = delta
        .into_iter()
        .take(outcome.applied)
        .map(AddedTrack::from)
        .collect();

    Ok(RefreshReport {
        playlist_id: playlist_id.to_string(),
        playlist_name: playlist_name.to_string(),
        added,
        outcome,
    })
}

/// An owned playlist whose description carries a criteria marker.
#[derive(Debug, Clone, Serialize)]
pub struct SmartPlaylist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: Option<String>,
    pub track_count: usize,
    /// `None` when the marker could not be decoded.
    pub criteria: Option<Criteria>,
    pub error: Option<String>,
    #[serde(skip)]
    pub track_ids: HashSet<String>,
}

impl SmartPlaylist {
    pub fn is_valid(&self) -> bool {
        self.criteria.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub playlists: Vec<SmartPlaylist>,
    /// Playlists whose details could not be fetched.
    pub failures: Vec<PlaylistFailure>,
}

/// Walks every playlist owned by `owner_id` and collects the ones with a
/// criteria marker, valid or corrupt.
pub async fn scan_smart_playlists<C: Catalog>(catalog: &C, owner_id: &str) -> Result<ScanReport> {
    let mut report = ScanReport::default();
    let playlists = all_playlists(catalog).await?;

    for summary in playlists.iter().filter(|p| p.owner_id == owner_id) {
        let details = match catalog.get_playlist(&summary.id).await {
            Ok(details) => details,
            Err(AppError::AuthRequired) => return Err(AppError::AuthRequired),
            Err(e) => {
                warning!("Could not read playlist {}: {}", summary.name, e);
                report.failures.push(PlaylistFailure {
                    playlist_id: summary.id.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        if !criteria::has_marker(&details.description) {
            continue;
        }

        let (criteria, error) = match criteria::decode(&details.description) {
            Ok(criteria) => (Some(criteria), None),
            Err(e) => (None, Some(e.to_string())),
        };
        report.playlists.push(SmartPlaylist {
            description: criteria::human_text(&details.description).to_string(),
            track_count: details.track_ids.len(),
            track_ids: details.track_ids.into_iter().collect(),
            id: details.id,
            name: details.name,
            url: details.url,
            criteria,
            error,
        });
    }

    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlaylistRefreshResult {
    Refreshed {
        playlist_id: String,
        name: String,
        added: usize,
    },
    Failed {
        playlist_id: String,
        name: String,
        added: usize,
        error: String,
    },
    Skipped {
        playlist_id: String,
        name: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshAllReport {
    pub results: Vec<PlaylistRefreshResult>,
    pub refreshed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_added: usize,
}

impl RefreshAllReport {
    fn push(&mut self, result: PlaylistRefreshResult) {
        match &result {
            PlaylistRefreshResult::Refreshed { added, .. } => {
                self.refreshed += 1;
                self.total_added += added;
            }
            PlaylistRefreshResult::Failed { added, .. } => {
                self.failed += 1;
                self.total_added += added;
            }
            PlaylistRefreshResult::Skipped { .. } => self.skipped += 1,
        }
        self.results.push(result);
    }
}

/// Refreshes every valid smart playlist owned by `owner_id`.
///
/// Playlists whose details can't be read or whose update fails are reported
/// as failed, corrupt ones as skipped; neither stops the others.
pub async fn refresh_all<C: Catalog>(
    catalog: &C,
    store: &Store,
    entry: &CacheEntry,
    owner_id: &str,
) -> Result<RefreshAllReport> {
    let scan = scan_smart_playlists(catalog, owner_id).await?;
    let mut report = RefreshAllReport::default();

    for failure in scan.failures {
        report.push(PlaylistRefreshResult::Failed {
            name: failure.playlist_id.clone(),
            playlist_id: failure.playlist_id,
            added: 0,
            error: failure.error,
        });
    }

    for playlist in scan.playlists {
        let Some(criteria) = &playlist.criteria else {
            report.push(PlaylistRefreshResult::Skipped {
                playlist_id: playlist.id,
                name: playlist.name,
                reason: playlist.error.unwrap_or_default(),
            });
            continue;
        };

        let result = sync_playlist(
            catalog,
            store,
            entry,
            &playlist.id,
            &playlist.name,
            criteria,
            &playlist.track_ids,
        )
        .await;

        let result = match result {
            Ok(refreshed) => match refreshed.outcome.error {
                None => PlaylistRefreshResult::Refreshed {
                    playlist_id: playlist.id,
                    name: playlist.name,
                    added: refreshed.added.len(),
                },
                Some(error) => PlaylistRefreshResult::Failed {
                    playlist_id: playlist.id,
                    name: playlist.name,
                    added: refreshed.added.len(),
                    error,
                },
            },
            Err(e) => PlaylistRefreshResult::Failed {
                playlist_id: playlist.id,
                name: playlist.name,
                added: 0,
                error: e.to_string(),
            },
        };
        report.push(result);
    }

    debug!(
        "Refreshed {} smart playlists, {} failed, {} skipped",
        report.refreshed, report.failed, report.skipped
    );
    Ok(report)
}
