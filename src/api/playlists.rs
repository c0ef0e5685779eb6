use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;

use crate::{
    error::Result,
    server::AppState,
    smart::{
        CreatedSmartPlaylist, CriteriaParams, NewSmartPlaylist, RefreshAllReport, RefreshReport,
        ScanReport, sync,
    },
    spotify::catalog,
    types::PlaylistSummary,
};

pub async fn list_playlists(State(state): State<AppState>) -> Result<Json<Vec<PlaylistSummary>>> {
    let client = state.client().await?;
    let playlists = catalog::all_playlists(&client)
        .await?
        .into_iter()
        .filter(|p| p.owner_id == state.owner_id)
        .collect();
    Ok(Json(playlists))
}

pub async fn list_smart_playlists(State(state): State<AppState>) -> Result<Json<ScanReport>> {
    let client = state.client().await?;
    let report = sync::scan_smart_playlists(&client, &state.owner_id).await?;
    Ok(Json(report))
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateSmartPlaylistRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_public")]
    pub public: bool,
    #[serde(flatten)]
    pub criteria: CriteriaParams,
}

pub async fn create_smart_playlist(
    State(state): State<AppState>,
    Json(request): Json<CreateSmartPlaylistRequest>,
) -> Result<Json<CreatedSmartPlaylist>> {
    let entry = state.snapshot()?;
    let new_playlist = NewSmartPlaylist {
        name: request.name,
        description: request.description,
        public: request.public,
        criteria: request.criteria.into_criteria()?,
    };

    let client = state.client().await?;
    let created =
        sync::create_filtered(&client, &state.store, &state.owner_id, &new_playlist, &entry)
            .await?;
    Ok(Json(created))
}

pub async fn refresh_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> Result<Json<RefreshReport>> {
    let entry = state.snapshot()?;
    let client = state.client().await?;
    let report = sync::refresh(&client, &state.store, &entry, &playlist_id).await?;
    Ok(Json(report))
}

pub async fn refresh_all_playlists(
    State(state): State<AppState>,
) -> Result<Json<RefreshAllReport>> {
    let entry = state.snapshot()?;
    let client = state.client().await?;
    let report = sync::refresh_all(&client, &state.store, &entry, &state.owner_id).await?;
    Ok(Json(report))
}
