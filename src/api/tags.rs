use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    error::{AppError, Result},
    server::AppState,
    spotify::features,
    store::Store,
    types::{Attributes, LocalTrack, Tag},
};

fn require_track(store: &Store, track_id: i64) -> Result<LocalTrack> {
    store
        .get_track(track_id)?
        .ok_or_else(|| AppError::NotFound(format!("Song {}", track_id)))
}

pub async fn get_attributes(
    State(state): State<AppState>,
    Path(track_id): Path<i64>,
) -> Result<Json<Value>> {
    let track = require_track(&state.store, track_id)?;
    Ok(Json(json!({
        "attributes": track.attributes,
        "is_unset": track.attributes.is_unset(),
    })))
}

pub async fn set_attributes(
    State(state): State<AppState>,
    Path(track_id): Path<i64>,
    Json(update): Json<Attributes>,
) -> Result<Json<Value>> {
    let attributes = state.store.set_attributes(track_id, update)?;
    Ok(Json(json!({
        "attributes": attributes,
        "is_unset": attributes.is_unset(),
    })))
}

pub async fn song_tags(
    State(state): State<AppState>,
    Path(track_id): Path<i64>,
) -> Result<Json<Vec<Tag>>> {
    let track = require_track(&state.store, track_id)?;
    Ok(Json(track.tags))
}

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    pub name: String,
}

pub async fn add_tag(
    State(state): State<AppState>,
    Path(track_id): Path<i64>,
    Json(request): Json<AddTagRequest>,
) -> Result<Json<Tag>> {
    let tag = state.store.add_tag(track_id, &request.name)?;
    Ok(Json(tag))
}

pub async fn remove_tag(
    State(state): State<AppState>,
    Path((track_id, tag_id)): Path<(i64, i64)>,
) -> Result<Json<Value>> {
    if !state.store.remove_tag(track_id, tag_id)? {
        return Err(AppError::NotFound(format!(
            "Tag {} on song {}",
            tag_id, track_id
        )));
    }
    Ok(Json(json!({ "removed": true })))
}

/// Audio features from the store, fetched from the remote service and
/// persisted on first request.
pub async fn audio_features(
    State(state): State<AppState>,
    Path(track_id): Path<i64>,
) -> Result<Json<Value>> {
    let track = require_track(&state.store, track_id)?;
    if track.features.is_complete() {
        return Ok(Json(json!({ "features": track.features, "source": "store" })));
    }

    let fetched = features::fetch_audio_features(&track.spotify_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Audio features for {}", track.spotify_id)))?;
    state.store.set_audio_features(track_id, fetched)?;

    Ok(Json(json!({ "features": fetched, "source": "remote" })))
}

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>> {
    Ok(Json(state.store.list_tags()?))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> Result<Json<Value>> {
    let tag = state.store.delete_tag(tag_id)?;
    Ok(Json(json!({ "deleted": tag })))
}
