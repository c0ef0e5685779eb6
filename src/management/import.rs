use serde::Serialize;

use crate::{
    debug,
    error::{AppError, Result},
    spotify::{
        Catalog,
        catalog::{SAVED_TRACKS_BATCH_SIZE, all_playlists},
    },
    utils, warning,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistFailure {
    pub playlist_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub playlists_processed: usize,
    pub playlists_failed: Vec<PlaylistFailure>,
    pub unique_tracks: usize,
    pub already_liked: usize,
    pub added: usize,
    pub failed: usize,
}

/// Saves every track of the given playlists to the user's liked songs.
///
/// Playlists that cannot be read are recorded and skipped. Track ids are
/// de-duplicated in first-seen order. A membership check that fails treats
/// its whole batch as not yet liked; a failed save counts its batch as
/// failed. Only an expired credential aborts the import.
pub async fn import_to_liked<C: Catalog>(
    catalog: &C,
    playlist_ids: &[String],
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let mut track_ids: Vec<String> = Vec::new();

    for playlist_id in playlist_ids {
        match catalog.get_playlist(playlist_id).await {
            Ok(details) => {
                debug!(
                    "Playlist {} contributes {} tracks",
                    details.name,
                    details.track_ids.len()
                );
                report.playlists_processed += 1;
                track_ids.extend(details.track_ids);
            }
            Err(AppError::AuthRequired) => return Err(AppError::AuthRequired),
            Err(e) => {
                warning!("Skipping playlist {}: {}", playlist_id, e);
                report.playlists_failed.push(PlaylistFailure {
                    playlist_id: playlist_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    utils::remove_duplicate_ids(&mut track_ids);
    report.unique_tracks = track_ids.len();

    let mut missing: Vec<String> = Vec::new();
    for batch in track_ids.chunks(SAVED_TRACKS_BATCH_SIZE) {
        match catalog.check_saved_tracks_contain(batch).await {
            Ok(flags) => {
                for (i, id) in batch.iter().enumerate() {
                    if flags.get(i).copied().unwrap_or(false) {
                        report.already_liked += 1;
                    } else {
                        missing.push(id.clone());
                    }
                }
            }
            Err(AppError::AuthRequired) => return Err(AppError::AuthRequired),
            Err(e) => {
                debug!("Liked songs check failed, assuming not liked: {}", e);
                missing.extend_from_slice(batch);
            }
        }
    }

    for batch in missing.chunks(SAVED_TRACKS_BATCH_SIZE) {
        match catalog.save_tracks(batch).await {
            Ok(()) => report.added += batch.len(),
            Err(AppError::AuthRequired) => return Err(AppError::AuthRequired),
            Err(e) => {
                warning!("Failed to save {} tracks: {}", batch.len(), e);
                report.failed += batch.len();
            }
        }
    }

    Ok(report)
}

/// Ids of every playlist owned by `owner_id`, in the order the catalog lists
/// them. Followed playlists of other users are left out.
pub async fn owned_playlist_ids<C: Catalog>(catalog: &C, owner_id: &str) -> Result<Vec<String>> {
    Ok(all_playlists(catalog)
        .await?
        .into_iter()
        .filter(|p| p.owner_id == owner_id)
        .map(|p| p.id)
        .collect())
}

/// Runs [`import_to_liked`] over every playlist the user owns.
pub async fn import_all_to_liked<C: Catalog>(catalog: &C, owner_id: &str) -> Result<ImportReport> {
    let playlist_ids = owned_playlist_ids(catalog, owner_id).await?;
    debug!("Importing {} owned playlists", playlist_ids.len());
    import_to_liked(catalog, &playlist_ids).await
}
