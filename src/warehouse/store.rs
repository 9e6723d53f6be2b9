//! SQLite-backed warehouse store.
//!
//! This is the single write path for the star schema: one autocommit
//! parameterized statement per row, with conflict handling baked into the
//! SQL. Reprocessing a source file must never raise on key collisions —
//! dimension writes either ignore the conflict (songs, artists, time) or
//! overwrite the mutable fields (users).

use super::models::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
use super::schema::WAREHOUSE_SCHEMA;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::info;

/// Row counts per table, for run summaries and test assertions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub songs: i64,
    pub artists: i64,
    pub time: i64,
    pub users: i64,
    pub songplays: i64,
}

/// Owns the single database connection for a pipeline run. All writes are
/// serialized through it, one statement at a time, each committing on its
/// own (autocommit connection).
pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    /// Open (or create) a warehouse database file.
    ///
    /// A brand new database gets the star schema created; an existing one
    /// is validated against it and rejected on any mismatch.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            db_path.as_ref(),
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )
        .context("Failed to open warehouse database")?;
        Self::init(conn)
    }

    /// In-memory warehouse, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |r| r.get(0),
            )
            .unwrap_or(0);

        if table_count == 0 {
            info!("Creating warehouse schema");
            WAREHOUSE_SCHEMA.create(&conn)?;
        } else {
            WAREHOUSE_SCHEMA
                .validate(&conn)
                .context("Existing database does not match the warehouse schema")?;
        }

        Ok(SqliteWarehouse { conn })
    }

    // =========================================================================
    // Dimension writes
    // =========================================================================

    /// Insert a song row, ignoring the write if the song_id already exists.
    /// Returns whether a row was actually inserted.
    pub fn insert_song(&self, row: &SongRow) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR IGNORE INTO songs (song_id, title, artist_id, year, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let changed = stmt.execute(params![
            row.song_id,
            row.title,
            row.artist_id,
            row.year,
            row.duration
        ])?;
        Ok(changed > 0)
    }

    /// Insert an artist row, ignoring the write if the artist_id already
    /// exists. Returns whether a row was actually inserted.
    pub fn insert_artist(&self, row: &ArtistRow) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR IGNORE INTO artists (artist_id, name, location, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let changed = stmt.execute(params![
            row.artist_id,
            row.name,
            row.location,
            row.latitude,
            row.longitude
        ])?;
        Ok(changed > 0)
    }

    /// Insert a time row. Every field is functionally determined by
    /// start_time, so a key conflict carries no new information and the
    /// write is ignored. Returns whether a row was actually inserted.
    pub fn insert_time(&self, row: &TimeRow) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR IGNORE INTO time (start_time, hour, day, week, month, year, weekday)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        let changed = stmt.execute(params![
            row.start_time,
            row.hour,
            row.day,
            row.week,
            row.month,
            row.year,
            row.weekday
        ])?;
        Ok(changed > 0)
    }

    /// Insert or update a user row. The same user_id recurs across event
    /// files with a possibly different subscription level; the latest
    /// write wins on every non-key field.
    pub fn upsert_user(&self, row: &UserRow) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO users (user_id, first_name, last_name, gender, level)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 first_name = ?2, last_name = ?3, gender = ?4, level = ?5",
        )?;
        stmt.execute(params![
            row.user_id,
            row.first_name,
            row.last_name,
            row.gender,
            row.level
        ])?;
        Ok(())
    }

    // =========================================================================
    // Fact writes
    // =========================================================================

    /// Append a songplay fact row and return its assigned surrogate key.
    pub fn insert_songplay(&self, row: &SongplayRow) -> Result<i64> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR IGNORE INTO songplays
                 (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        stmt.execute(params![
            row.start_time,
            row.user_id,
            row.level,
            row.song_id,
            row.artist_id,
            row.session_id,
            row.location,
            row.user_agent
        ])?;
        Ok(self.conn.last_insert_rowid())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Resolve a playback event against the loaded catalog: exact match on
    /// song title, artist name and duration (REAL compared by equality on
    /// the stored value). Returns the first matching (song_id, artist_id)
    /// pair, or `None` — which callers treat as an expected missing
    /// reference, not an error.
    pub fn find_song_by_title_artist_duration(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<(String, String)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT s.song_id, s.artist_id
             FROM songs s
             JOIN artists a ON s.artist_id = a.artist_id
             WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
             LIMIT 1",
        )?;
        let found = stmt
            .query_row(params![title, artist_name, duration], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .optional()?;
        Ok(found)
    }

    /// Row counts across all five tables.
    pub fn table_counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<i64> {
            Ok(self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
        };
        Ok(TableCounts {
            songs: count("songs")?,
            artists: count("artists")?,
            time: count("time")?,
            users: count("users")?,
            songplays: count("songplays")?,
        })
    }
}
