use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    error::{AppError, Result},
    management::{self, CacheStatus, CachedTrack, ImportReport},
    server::AppState,
    smart::{Criteria, CriteriaParams, sync},
    store::Store,
    types::LocalTrack,
    utils,
};

#[derive(Debug, Default, Deserialize)]
pub struct CacheParams {
    #[serde(default)]
    pub force: bool,
}

/// Starts or joins the liked-songs build. A client that gives up waiting
/// does not stop the build.
pub async fn load_cache(
    State(state): State<AppState>,
    Query(params): Query<CacheParams>,
) -> Result<Json<CacheStatus>> {
    let client = state.client().await?;
    let status = management::ensure_cached(
        &state.cache_key,
        &state.cache,
        &state.coordinator,
        client,
        &state.store,
        params.force,
    )
    .await?;
    Ok(Json(status))
}

pub async fn cache_progress(State(state): State<AppState>) -> Json<Value> {
    let in_progress = state.coordinator.is_in_progress(&state.cache_key);
    let count = state.coordinator.progress(&state.cache_key).unwrap_or(0);
    let entry = state.cache.get(&state.cache_key);

    Json(json!({
        "in_progress": in_progress,
        "count": count,
        "fresh": entry.as_ref().is_some_and(|e| e.is_fresh(Utc::now())),
        "cache": entry.map(|e| e.summary()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub async fn search_songs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>> {
    let entry = state.snapshot()?;
    let songs: Vec<&CachedTrack> = entry.search(&params.q);
    Ok(Json(json!({ "count": songs.len(), "songs": songs })))
}

/// Filter bounds as query parameters; tag ids come as comma-separated lists.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub tempo_min: Option<u8>,
    pub tempo_max: Option<u8>,
    pub energy_min: Option<u8>,
    pub energy_max: Option<u8>,
    pub mood_min: Option<u8>,
    pub mood_max: Option<u8>,
    pub include_tag_ids: Option<String>,
    pub exclude_tag_ids: Option<String>,
}

impl FilterParams {
    fn into_criteria(self) -> Result<Criteria> {
        let ids = |raw: Option<String>| utils::parse_id_list(raw.as_deref().unwrap_or(""));

        CriteriaParams {
            tempo_min: self.tempo_min,
            tempo_max: self.tempo_max,
            energy_min: self.energy_min,
            energy_max: self.energy_max,
            mood_min: self.mood_min,
            mood_max: self.mood_max,
            include_tag_ids: ids(self.include_tag_ids)?,
            exclude_tag_ids: ids(self.exclude_tag_ids)?,
        }
        .into_criteria()
    }
}

pub async fn filter_songs(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Value>> {
    let entry = state.snapshot()?;
    let criteria = params.into_criteria()?;
    let songs = sync::filter(&criteria, &entry, &state.store)?;
    Ok(Json(json!({ "count": songs.len(), "songs": songs })))
}

#[derive(Debug, Deserialize)]
pub struct NavigationParams {
    pub position: usize,
    #[serde(default)]
    pub untagged_only: bool,
}

/// A snapshot position together with the track's current state in the store.
#[derive(Debug, Serialize)]
struct SongView {
    position: usize,
    #[serde(flatten)]
    track: LocalTrack,
}

fn song_view(store: &Store, cached: Option<&CachedTrack>) -> Result<Json<Value>> {
    let Some(cached) = cached else {
        return Ok(Json(json!({ "song": null })));
    };
    let track = store
        .get_track(cached.local_id)?
        .ok_or_else(|| AppError::NotFound(format!("Song {}", cached.local_id)))?;

    Ok(Json(json!({
        "song": SongView {
            position: cached.position,
            track,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct PositionParams {
    pub position: usize,
}

/// The record at an exact snapshot position; `null` when that offset was
/// skipped or lies past the end.
pub async fn song_at(
    State(state): State<AppState>,
    Query(params): Query<PositionParams>,
) -> Result<Json<Value>> {
    let entry = state.snapshot()?;
    song_view(&state.store, entry.find_by_position(params.position))
}

pub async fn next_song(
    State(state): State<AppState>,
    Query(params): Query<NavigationParams>,
) -> Result<Json<Value>> {
    let entry = state.snapshot()?;
    let next = entry.next_track(&state.store, params.position, params.untagged_only)?;
    song_view(&state.store, next)
}

pub async fn previous_song(
    State(state): State<AppState>,
    Query(params): Query<NavigationParams>,
) -> Result<Json<Value>> {
    let entry = state.snapshot()?;
    let previous = entry.previous_track(&state.store, params.position, params.untagged_only)?;
    song_view(&state.store, previous)
}

/// Either a list of playlist ids or `all` for every playlist the user owns.
#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub playlist_ids: Vec<String>,
    #[serde(default)]
    pub all: bool,
}

pub async fn import_liked(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportReport>> {
    if !request.all && request.playlist_ids.is_empty() {
        return Err(AppError::InvalidInput("no playlists selected".to_string()));
    }

    let client = state.client().await?;
    let report = if request.all {
        management::import_all_to_liked(&client, &state.owner_id).await?
    } else {
        management::import_to_liked(&client, &request.playlist_ids).await?
    };
    Ok(Json(report))
}

/// Number of playlists an import of everything would walk.
pub async fn owned_playlist_count(State(state): State<AppState>) -> Result<Json<Value>> {
    let client = state.client().await?;
    let ids = management::owned_playlist_ids(&client, &state.owner_id).await?;
    Ok(Json(json!({ "count": ids.len() })))
}
