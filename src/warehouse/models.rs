//! Row types for the star schema.
//!
//! Each struct is one tuple destined for (or read back from) a warehouse
//! table. Rows are plain values; all write semantics (conflict handling,
//! upserts) live in the store.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// One row of the `songs` dimension table.
#[derive(Clone, Debug, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
}

/// One row of the `artists` dimension table.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One row of the `time` dimension table, keyed by the playback instant
/// in epoch milliseconds. All other fields are derived from the key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: i64,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl TimeRow {
    /// Break an epoch-millisecond timestamp into calendar fields (UTC).
    /// Week is the ISO week number, weekday is Monday = 0.
    ///
    /// Returns `None` when the timestamp is outside the representable
    /// date range.
    pub fn from_epoch_ms(ts: i64) -> Option<Self> {
        let instant: DateTime<Utc> = DateTime::from_timestamp_millis(ts)?;
        Some(TimeRow {
            start_time: ts,
            hour: instant.hour(),
            day: instant.day(),
            week: instant.iso_week().week(),
            month: instant.month(),
            year: instant.year(),
            weekday: instant.weekday().num_days_from_monday(),
        })
    }
}

/// One row of the `users` dimension table. The `level` field changes over
/// a user's lifetime (free/paid), so writes overwrite on key conflict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub level: String,
}

/// One row of the `songplays` fact table. The surrogate `songplay_id`
/// key is assigned by the database on insert; `song_id`/`artist_id` stay
/// `None` when the catalog lookup found no match.
#[derive(Clone, Debug, PartialEq)]
pub struct SongplayRow {
    pub start_time: i64,
    pub user_id: i64,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}
