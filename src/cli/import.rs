use crate::{cli::session, error, management, success, warning};

/// Imports the given playlists, or every playlist the user owns when `all`
/// is set.
pub async fn import(playlist_ids: Vec<String>, all: bool) {
    let state = session::open().await;
    let client = match state.client().await {
        Ok(c) => c,
        Err(e) => error!("Failed to get a valid token: {}", e),
    };

    let pb = session::spinner("Importing playlists into liked songs...");
    let report = if all {
        management::import_all_to_liked(&client, &state.owner_id).await
    } else {
        management::import_to_liked(&client, &playlist_ids).await
    };
    pb.finish_and_clear();

    let report = match report {
        Ok(r) => r,
        Err(e) => error!("Import failed: {}", e),
    };

    for failure in &report.playlists_failed {
        warning!("Playlist {} skipped: {}", failure.playlist_id, failure.error);
    }
    success!(
        "{} playlists, {} unique songs: {} added, {} already liked",
        report.playlists_processed,
        report.unique_tracks,
        report.added,
        report.already_liked
    );
    if report.failed > 0 {
        warning!("{} songs could not be saved", report.failed);
    }
}
