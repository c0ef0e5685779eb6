mod common;

use sporltag::management::{import_all_to_liked, import_to_liked, owned_playlist_ids};

use common::{MockCatalog, USER_ID, remote};

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_import_deduplicates_and_skips_liked_tracks() {
    let catalog = MockCatalog::new()
        .with_liked(vec![Some(remote("liked", "Known", "Band"))])
        .with_playlist(USER_ID, "p1", "", &["a", "liked", "b"])
        .with_playlist(USER_ID, "p2", "", &["b", "c", "a"]);

    let report = import_to_liked(&catalog, &ids(&["p1", "p2"])).await.unwrap();

    assert_eq!(report.playlists_processed, 2);
    assert!(report.playlists_failed.is_empty());
    assert_eq!(report.unique_tracks, 4);
    assert_eq!(report.already_liked, 1);
    assert_eq!(report.added, 3);
    assert_eq!(report.failed, 0);

    let saves = catalog.save_calls.lock().unwrap();
    assert_eq!(saves.as_slice(), &[ids(&["a", "b", "c"])]);
    assert!(catalog.is_saved("c"));
}

#[tokio::test]
async fn test_import_records_unreadable_playlists() {
    let catalog = MockCatalog::new()
        .with_playlist(USER_ID, "good", "", &["a"])
        .with_playlist(USER_ID, "bad", "", &["b"])
        .with_unreadable_playlist("bad");

    let report = import_to_liked(&catalog, &ids(&["bad", "good", "missing"]))
        .await
        .unwrap();

    assert_eq!(report.playlists_processed, 1);
    let failed: Vec<&str> = report
        .playlists_failed
        .iter()
        .map(|f| f.playlist_id.as_str())
        .collect();
    assert_eq!(failed, vec!["bad", "missing"]);
    assert_eq!(report.added, 1);
}

#[tokio::test]
async fn test_import_treats_failed_checks_as_not_liked() {
    let catalog = MockCatalog::new()
        .with_liked(vec![Some(remote("a", "Known", "Band"))])
        .with_playlist(USER_ID, "p1", "", &["a", "b"])
        .failing_contains();

    let report = import_to_liked(&catalog, &ids(&["p1"])).await.unwrap();

    assert_eq!(report.already_liked, 0);
    assert_eq!(report.added, 2);
}

#[tokio::test]
async fn test_import_saves_in_batches_of_fifty() {
    let track_ids: Vec<String> = (0..120).map(|n| format!("n{}", n)).collect();
    let refs: Vec<&str> = track_ids.iter().map(String::as_str).collect();
    let catalog = MockCatalog::new().with_playlist(USER_ID, "big", "", &refs);

    let report = import_to_liked(&catalog, &ids(&["big"])).await.unwrap();

    assert_eq!(report.added, 120);
    let sizes: Vec<usize> = catalog
        .save_calls
        .lock()
        .unwrap()
        .iter()
        .map(Vec::len)
        .collect();
    assert_eq!(sizes, vec![50, 50, 20]);
}

#[tokio::test]
async fn test_import_all_reads_only_owned_playlists() {
    let catalog = MockCatalog::new()
        .with_playlist(USER_ID, "mine", "", &["a", "b"])
        .with_playlist("someone", "followed", "", &["x", "y"])
        .with_playlist(USER_ID, "also_mine", "", &["b", "c"]);

    let owned = owned_playlist_ids(&catalog, USER_ID).await.unwrap();
    assert_eq!(owned, ids(&["mine", "also_mine"]));

    let report = import_all_to_liked(&catalog, USER_ID).await.unwrap();

    assert_eq!(report.playlists_processed, 2);
    assert_eq!(report.unique_tracks, 3);
    assert_eq!(report.added, 3);
    assert!(!catalog.is_saved("x"));
    assert!(catalog.is_saved("c"));
}

#[tokio::test]
async fn test_import_all_without_owned_playlists_saves_nothing() {
    let catalog = MockCatalog::new().with_playlist("someone", "followed", "", &["x"]);

    let report = import_all_to_liked(&catalog, USER_ID).await.unwrap();

    assert_eq!(report, Default::default());
    assert!(catalog.save_calls.lock().unwrap().is_empty());
}
