mod common;

use sporltag::error::AppError;
use sporltag::store::{DEFAULT_TAG_COLOR, Store};
use sporltag::types::{Attributes, AudioFeatures};

use common::remote;

#[test]
fn test_upsert_track_is_idempotent() {
    let store = Store::open_in_memory().unwrap();

    let first = store.upsert_track(&remote("abc", "Song", "Artist")).unwrap();
    let second = store
        .upsert_track(&remote("abc", "Renamed", "Someone Else"))
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "Song");
    assert_eq!(second.artist, "Artist");
    assert_eq!(second.duration_ms, Some(200_000));
    assert!(second.attributes.is_unset());
    assert!(second.tags.is_empty());
}

#[test]
fn test_tags_are_created_lazily_and_trimmed() {
    let store = Store::open_in_memory().unwrap();
    let track = store.upsert_track(&remote("abc", "Song", "Artist")).unwrap();

    let tag = store.add_tag(track.id, "  upbeat ").unwrap();
    assert_eq!(tag.name, "upbeat");
    assert_eq!(tag.color, DEFAULT_TAG_COLOR);

    // Adding the same tag again is a no-op
    let again = store.add_tag(track.id, "upbeat").unwrap();
    assert_eq!(again.id, tag.id);
    assert_eq!(store.track_tags(track.id).unwrap().len(), 1);
}

#[test]
fn test_list_tags_most_recent_first() {
    let store = Store::open_in_memory().unwrap();
    store.get_or_create_tag("first").unwrap();
    store.get_or_create_tag("second").unwrap();
    store.get_or_create_tag("third").unwrap();

    let names: Vec<String> = store
        .list_tags()
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
}

#[test]
fn test_empty_tag_name_is_rejected() {
    let store = Store::open_in_memory().unwrap();
    let track = store.upsert_track(&remote("abc", "Song", "Artist")).unwrap();

    assert!(matches!(
        store.add_tag(track.id, "   "),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn test_add_tag_to_unknown_track_is_not_found() {
    let store = Store::open_in_memory().unwrap();
    assert!(matches!(
        store.add_tag(999, "upbeat"),
        Err(AppError::NotFound(_))
    ));
    // The failed transaction leaves no tag behind
    assert!(store.list_tags().unwrap().is_empty());
}

#[test]
fn test_remove_tag_reports_whether_it_existed() {
    let store = Store::open_in_memory().unwrap();
    let track = store.upsert_track(&remote("abc", "Song", "Artist")).unwrap();
    let tag = store.add_tag(track.id, "calm").unwrap();

    assert!(store.remove_tag(track.id, tag.id).unwrap());
    assert!(!store.remove_tag(track.id, tag.id).unwrap());
    assert!(store.track_tags(track.id).unwrap().is_empty());
}

#[test]
fn test_delete_tag_cascades_to_associations_only() {
    let store = Store::open_in_memory().unwrap();
    let a = store.upsert_track(&remote("a", "Song A", "Artist")).unwrap();
    let b = store.upsert_track(&remote("b", "Song B", "Artist")).unwrap();
    let tag = store.add_tag(a.id, "party").unwrap();
    store.add_tag(b.id, "party").unwrap();
    store.add_tag(b.id, "night").unwrap();

    let deleted = store.delete_tag(tag.id).unwrap();
    assert_eq!(deleted.name, "party");

    assert!(store.get_track(a.id).unwrap().is_some());
    assert!(store.track_tags(a.id).unwrap().is_empty());
    let remaining: Vec<String> = store
        .track_tags(b.id)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(remaining, vec!["night"]);

    assert!(matches!(
        store.delete_tag(tag.id),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_set_attributes_updates_only_given_values() {
    let store = Store::open_in_memory().unwrap();
    let track = store.upsert_track(&remote("abc", "Song", "Artist")).unwrap();

    let attributes = store
        .set_attributes(
            track.id,
            Attributes {
                tempo: Some(3),
                energy: Some(4),
                mood: None,
            },
        )
        .unwrap();
    assert_eq!(attributes.tempo, Some(3));
    assert_eq!(attributes.mood, None);
    assert!(!attributes.is_unset());

    let attributes = store
        .set_attributes(
            track.id,
            Attributes {
                mood: Some(2),
                ..Attributes::default()
            },
        )
        .unwrap();
    assert_eq!(
        attributes,
        Attributes {
            tempo: Some(3),
            energy: Some(4),
            mood: Some(2),
        }
    );
}

#[test]
fn test_set_attributes_validates_range() {
    let store = Store::open_in_memory().unwrap();
    let track = store.upsert_track(&remote("abc", "Song", "Artist")).unwrap();

    for value in [0, 6] {
        let result = store.set_attributes(
            track.id,
            Attributes {
                tempo: Some(value),
                ..Attributes::default()
            },
        );
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
    assert!(store.get_track(track.id).unwrap().unwrap().attributes.is_unset());

    assert!(matches!(
        store.set_attributes(
            42,
            Attributes {
                tempo: Some(1),
                ..Attributes::default()
            }
        ),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_audio_features_are_persisted() {
    let store = Store::open_in_memory().unwrap();
    let track = store.upsert_track(&remote("abc", "Song", "Artist")).unwrap();
    assert!(!track.features.is_complete());

    let features = AudioFeatures {
        tempo: Some(121.5),
        energy: Some(0.8),
        valence: Some(0.35),
    };
    store.set_audio_features(track.id, features).unwrap();

    let stored = store.get_track(track.id).unwrap().unwrap();
    assert_eq!(stored.features, features);
    assert!(stored.features.is_complete());
}

#[test]
fn test_database_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("sporltag.db");

    let track_id = {
        let store = Store::open(&path).unwrap();
        let track = store.upsert_track(&remote("abc", "Song", "Artist")).unwrap();
        store.add_tag(track.id, "keeper").unwrap();
        track.id
    };

    let store = Store::open(&path).unwrap();
    let track = store.get_track(track_id).unwrap().unwrap();
    assert_eq!(track.spotify_id, "abc");
    assert_eq!(track.tags[0].name, "keeper");
}
