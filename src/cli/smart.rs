use tabled::Table;

use crate::{
    cli::session,
    error,
    smart::{CriteriaParams, NewSmartPlaylist, PlaylistRefreshResult, sync},
    success,
    types::SmartPlaylistTableRow,
    utils, warning,
};

pub async fn list() {
    let state = session::open().await;
    let client = match state.client().await {
        Ok(c) => c,
        Err(e) => error!("Failed to get a valid token: {}", e),
    };

    let pb = session::spinner("Scanning your playlists...");
    let scan = sync::scan_smart_playlists(&client, &state.owner_id).await;
    pb.finish_and_clear();

    let scan = match scan {
        Ok(scan) => scan,
        Err(e) => error!("Failed to scan playlists: {}", e),
    };

    for failure in &scan.failures {
        warning!("Could not read playlist {}: {}", failure.playlist_id, failure.error);
    }
    if scan.playlists.is_empty() {
        warning!("No smart playlists found");
        return;
    }

    let rows: Vec<SmartPlaylistTableRow> = scan
        .playlists
        .iter()
        .map(|p| SmartPlaylistTableRow {
            name: p.name.clone(),
            tracks: p.track_count as u32,
            criteria: match (&p.criteria, &p.error) {
                (Some(criteria), _) => criteria.to_string(),
                (None, Some(e)) => format!("corrupt: {}", e),
                (None, None) => "corrupt".to_string(),
            },
        })
        .collect();

    println!("{}", Table::new(rows));
}

pub struct CreateArgs {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub criteria: CriteriaParams,
    pub include: Option<String>,
    pub exclude: Option<String>,
}

pub async fn create(args: CreateArgs) {
    let mut params = args.criteria;
    for (raw, target) in [
        (args.include, &mut params.include_tag_ids),
        (args.exclude, &mut params.exclude_tag_ids),
    ] {
        match utils::parse_id_list(raw.as_deref().unwrap_or("")) {
            Ok(ids) => *target = ids,
            Err(e) => error!("{}", e),
        }
    }
    let criteria = match params.into_criteria() {
        Ok(c) => c,
        Err(e) => error!("{}", e),
    };

    let state = session::open().await;
    let entry = session::load_snapshot(&state).await;
    let client = match state.client().await {
        Ok(c) => c,
        Err(e) => error!("Failed to get a valid token: {}", e),
    };

    let request = NewSmartPlaylist {
        name: args.name,
        description: args.description,
        criteria,
        public: !args.private,
    };

    let pb = session::spinner("Creating playlist...");
    let result = sync::create_filtered(&client, &state.store, &state.owner_id, &request, &entry).await;
    pb.finish_and_clear();

    let created = match result {
        Ok(created) => created,
        Err(e) => error!("Failed to create playlist: {}", e),
    };

    success!(
        "Created {} with {} of {} matching songs",
        created.playlist.name,
        created.outcome.applied,
        created.matched
    );
    if let Some(url) = &created.playlist.url {
        println!("{}", url);
    }
    if let Some(e) = &created.outcome.error {
        warning!(
            "{} songs failed and {} were skipped: {}",
            created.outcome.failed,
            created.outcome.skipped,
            e
        );
    }
}

pub async fn refresh(playlist_id: Option<String>, all: bool) {
    let state = session::open().await;
    let entry = session::load_snapshot(&state).await;
    let client = match state.client().await {
        Ok(c) => c,
        Err(e) => error!("Failed to get a valid token: {}", e),
    };

    if all {
        let pb = session::spinner("Refreshing smart playlists...");
        let report = sync::refresh_all(&client, &state.store, &entry, &state.owner_id).await;
        pb.finish_and_clear();

        let report = match report {
            Ok(r) => r,
            Err(e) => error!("Failed to refresh playlists: {}", e),
        };

        for result in &report.results {
            match result {
                PlaylistRefreshResult::Refreshed { name, added, .. } => {
                    success!("{}: added {} songs", name, added)
                }
                PlaylistRefreshResult::Failed { name, error, .. } => {
                    warning!("{}: {}", name, error)
                }
                PlaylistRefreshResult::Skipped { name, reason, .. } => {
                    warning!("{} skipped: {}", name, reason)
                }
            }
        }
        success!(
            "{} refreshed, {} failed, {} skipped, {} songs added",
            report.refreshed,
            report.failed,
            report.skipped,
            report.total_added
        );
        return;
    }

    let Some(playlist_id) = playlist_id else {
        error!("Pass --playlist <id> or --all");
    };

    match sync::refresh(&client, &state.store, &entry, &playlist_id).await {
        Ok(report) => {
            for track in &report.added {
                println!("  + {} - {}", track.name, track.artist);
            }
            success!(
                "Added {} songs to {}",
                report.added.len(),
                report.playlist_name
            );
            if let Some(e) = report.outcome.error {
                warning!("Update stopped early: {}", e);
            }
        }
        Err(e) => error!("Failed to refresh playlist: {}", e),
    }
}
