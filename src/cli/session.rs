use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{error, management::CacheEntry, server::AppState, success};

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Loads the token, resolves the user and opens the store, exiting with a
/// hint when any of that fails.
pub(crate) async fn open() -> AppState {
    match AppState::initialize().await {
        Ok(state) => state,
        Err(e) => error!("Cannot start session: {}", e),
    }
}

/// Builds a liked-songs snapshot for this process, showing progress.
pub(crate) async fn load_snapshot(state: &AppState) -> Arc<CacheEntry> {
    let client = match state.client().await {
        Ok(c) => c,
        Err(e) => error!("Failed to get a valid token: {}", e),
    };

    let pb = spinner("Loading liked songs...");
    let result = state
        .cache
        .build(&state.cache_key, &client, &state.store, |count| {
            pb.set_message(format!("Cached {} liked songs...", count))
        })
        .await;
    pb.finish_and_clear();

    match result {
        Ok(entry) => {
            success!(
                "Cached {} liked songs ({} untagged)",
                entry.total(),
                entry.untagged()
            );
            entry
        }
        Err(e) => error!("Failed to load liked songs: {}", e),
    }
}
