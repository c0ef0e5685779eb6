//! SQLite persistence for tracks, tags and their associations.
//!
//! Tracks are created lazily the first time a remote listing shows them and
//! are never deleted. Tags are unique by trimmed name and carry a display
//! color. Every operation touching more than one row runs in a transaction so
//! a failure leaves previously committed state intact.

use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::{
    error::{AppError, Result},
    types::{Attributes, AudioFeatures, LocalTrack, RemoteTrack, Tag},
};

pub const DEFAULT_TAG_COLOR: &str = "#1db954";

const DB_SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS songs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        spotify_id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        artist TEXT NOT NULL,
        album TEXT NOT NULL,
        duration_ms INTEGER,
        tempo INTEGER,
        energy INTEGER,
        mood INTEGER,
        spotify_tempo REAL,
        spotify_energy REAL,
        spotify_valence REAL
    );

    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        color TEXT NOT NULL DEFAULT '#1db954'
    );

    CREATE TABLE IF NOT EXISTS song_tags (
        song_id INTEGER NOT NULL REFERENCES songs(id),
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (song_id, tag_id)
    );
"#;

const TRACK_COLUMNS: &str = "id, spotify_id, name, artist, album, duration_ms, tempo, energy, mood, spotify_tempo, spotify_energy, spotify_valence";

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens (and if needed creates) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("cannot create database directory: {}", e)))?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(DB_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the local track for `track.spotify_id`, creating it if unseen.
    ///
    /// Existing rows are left as they are; remote metadata is only recorded
    /// on first sight.
    pub fn upsert_track(&self, track: &RemoteTrack) -> Result<LocalTrack> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO songs (spotify_id, name, artist, album, duration_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(spotify_id) DO NOTHING",
            params![
                track.spotify_id,
                track.name,
                track.artist,
                track.album,
                track.duration_ms as i64
            ],
        )?;

        let sql = format!("SELECT {} FROM songs WHERE spotify_id = ?1", TRACK_COLUMNS);
        let mut local = conn.query_row(&sql, params![track.spotify_id], track_from_row)?;
        local.tags = tags_for(&conn, local.id)?;
        Ok(local)
    }

    pub fn get_track(&self, track_id: i64) -> Result<Option<LocalTrack>> {
        let conn = self.conn();
        let sql = format!("SELECT {} FROM songs WHERE id = ?1", TRACK_COLUMNS);
        let track = conn
            .query_row(&sql, params![track_id], track_from_row)
            .optional()?;

        match track {
            Some(mut track) => {
                track.tags = tags_for(&conn, track.id)?;
                Ok(Some(track))
            }
            None => Ok(None),
        }
    }

    /// Current tags of a track in the order they were attached.
    pub fn track_tags(&self, track_id: i64) -> Result<Vec<Tag>> {
        tags_for(&self.conn(), track_id)
    }

    pub fn get_or_create_tag(&self, name: &str) -> Result<Tag> {
        let name = normalize_tag_name(name)?;
        get_or_create_tag(&self.conn(), &name)
    }

    /// All tags ordered by id, most recently created first.
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name, color FROM tags ORDER BY id DESC")?;
        let tags = stmt
            .query_map([], tag_from_row)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(tags)
    }

    /// Attaches the tag called `name` to a track, creating the tag if needed.
    ///
    /// Attaching a tag the track already carries is a no-op.
    pub fn add_tag(&self, track_id: i64, name: &str) -> Result<Tag> {
        let name = normalize_tag_name(name)?;
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        ensure_track(&tx, track_id)?;
        let tag = get_or_create_tag(&tx, &name)?;
        tx.execute(
            "INSERT OR IGNORE INTO song_tags (song_id, tag_id) VALUES (?1, ?2)",
            params![track_id, tag.id],
        )?;

        tx.commit()?;
        Ok(tag)
    }

    /// Detaches a tag from a track. Returns whether an association existed.
    pub fn remove_tag(&self, track_id: i64, tag_id: i64) -> Result<bool> {
        let removed = self.conn().execute(
            "DELETE FROM song_tags WHERE song_id = ?1 AND tag_id = ?2",
            params![track_id, tag_id],
        )?;
        Ok(removed > 0)
    }

    /// Deletes a tag and all its associations. Tracks are kept.
    pub fn delete_tag(&self, tag_id: i64) -> Result<Tag> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let tag = tx
            .query_row(
                "SELECT id, name, color FROM tags WHERE id = ?1",
                params![tag_id],
                tag_from_row,
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("Tag {}", tag_id)))?;

        tx.execute("DELETE FROM song_tags WHERE tag_id = ?1", params![tag_id])?;
        tx.execute("DELETE FROM tags WHERE id = ?1", params![tag_id])?;

        tx.commit()?;
        Ok(tag)
    }

    /// Updates the attributes present in `update`; absent ones stay as they are.
    ///
    /// Each provided value must lie in 1..=5. Returns the resulting attributes.
    pub fn set_attributes(&self, track_id: i64, update: Attributes) -> Result<Attributes> {
        for (label, value) in [
            ("tempo", update.tempo),
            ("energy", update.energy),
            ("mood", update.mood),
        ] {
            if let Some(v) = value {
                if !(1..=5).contains(&v) {
                    return Err(AppError::InvalidInput(format!(
                        "{} must be between 1 and 5, got {}",
                        label, v
                    )));
                }
            }
        }

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        ensure_track(&tx, track_id)?;

        tx.execute(
            "UPDATE songs SET
                tempo = COALESCE(?2, tempo),
                energy = COALESCE(?3, energy),
                mood = COALESCE(?4, mood)
             WHERE id = ?1",
            params![track_id, update.tempo, update.energy, update.mood],
        )?;

        let attributes = tx.query_row(
            "SELECT tempo, energy, mood FROM songs WHERE id = ?1",
            params![track_id],
            |row| {
                Ok(Attributes {
                    tempo: ordinal(row.get(0)?),
                    energy: ordinal(row.get(1)?),
                    mood: ordinal(row.get(2)?),
                })
            },
        )?;

        tx.commit()?;
        Ok(attributes)
    }

    pub fn set_audio_features(&self, track_id: i64, features: AudioFeatures) -> Result<()> {
        let updated = self.conn().execute(
            "UPDATE songs SET spotify_tempo = ?2, spotify_energy = ?3, spotify_valence = ?4 WHERE id = ?1",
            params![track_id, features.tempo, features.energy, features.valence],
        )?;
        if updated == 0 {
            return Err(AppError::NotFound(format!("Song {}", track_id)));
        }
        Ok(())
    }
}

fn normalize_tag_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("tag name must not be empty".into()));
    }
    Ok(name.to_string())
}

fn ensure_track(conn: &Connection, track_id: i64) -> Result<()> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM songs WHERE id = ?1",
            params![track_id],
            |_| Ok(()),
        )
        .optional()?;
    exists.ok_or_else(|| AppError::NotFound(format!("Song {}", track_id)))
}

fn get_or_create_tag(conn: &Connection, name: &str) -> Result<Tag> {
    conn.execute(
        "INSERT INTO tags (name, color) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
        params![name, DEFAULT_TAG_COLOR],
    )?;
    let tag = conn.query_row(
        "SELECT id, name, color FROM tags WHERE name = ?1",
        params![name],
        tag_from_row,
    )?;
    Ok(tag)
}

fn tags_for(conn: &Connection, track_id: i64) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.color FROM tags t
         JOIN song_tags st ON st.tag_id = t.id
         WHERE st.song_id = ?1
         ORDER BY st.rowid ASC",
    )?;
    let tags = stmt
        .query_map(params![track_id], tag_from_row)?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(tags)
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
    })
}

fn track_from_row(row: &Row<'_>) -> rusqlite::Result<LocalTrack> {
    Ok(LocalTrack {
        id: row.get(0)?,
        spotify_id: row.get(1)?,
        name: row.get(2)?,
        artist: row.get(3)?,
        album: row.get(4)?,
        duration_ms: row.get::<_, Option<i64>>(5)?.map(|d| d as u64),
        attributes: Attributes {
            tempo: ordinal(row.get(6)?),
            energy: ordinal(row.get(7)?),
            mood: ordinal(row.get(8)?),
        },
        features: AudioFeatures {
            tempo: row.get(9)?,
            energy: row.get(10)?,
            valence: row.get(11)?,
        },
        tags: Vec::new(),
    })
}

fn ordinal(value: Option<i64>) -> Option<u8> {
    value.and_then(|v| u8::try_from(v).ok())
}
