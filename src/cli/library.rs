use tabled::Table;

use crate::{
    cli::session,
    error,
    types::{TagTableRow, TrackTableRow},
    utils, warning,
};

pub async fn cache() {
    let state = session::open().await;
    let entry = session::load_snapshot(&state).await;

    let tagged = entry.total() - entry.untagged();
    if entry.total() > 0 {
        let share = tagged * 100 / entry.total();
        println!("{}% of your liked songs are tagged", share);
    }
}

pub async fn search(query: String) {
    let state = session::open().await;
    let entry = session::load_snapshot(&state).await;

    let results = entry.search(&query);
    if results.is_empty() {
        warning!("No liked songs match '{}'", query);
        return;
    }

    let rows: Vec<TrackTableRow> = results
        .into_iter()
        .map(|t| TrackTableRow {
            position: t.position,
            name: t.name.clone(),
            artist: t.artist.clone(),
            tags: t
                .tags
                .iter()
                .map(|tag| tag.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    println!("{}", Table::new(rows));
}

pub async fn tags() {
    let state = session::open().await;
    let tags = match state.store.list_tags() {
        Ok(tags) => tags,
        Err(e) => error!("Failed to read tags: {}", e),
    };

    if tags.is_empty() {
        warning!("No tags yet");
        return;
    }

    let rows: Vec<TagTableRow> = tags
        .into_iter()
        .map(|t| TagTableRow {
            id: t.id,
            name: utils::truncate_chars(&t.name, 40),
            color: t.color,
        })
        .collect();

    println!("{}", Table::new(rows));
}
