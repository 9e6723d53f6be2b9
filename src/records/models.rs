//! Typed record shapes for the two source file families.
//!
//! Field access on the raw JSON objects is replaced by serde-validated
//! structs: a record either deserializes completely or the file fails with
//! a parse error. Fields the pipeline never consumes (registration, auth,
//! HTTP status, ...) are ignored at parse time.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Page value marking an event as an actual playback.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// One song's metadata from the catalog file family. One record per file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CatalogRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub artist_name: String,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
    pub year: i32,
    pub duration: f64,
}

/// One user-activity entry from the event file family. Many records per
/// file. Only `page == "NextSong"` entries represent playback; the rest
/// (page navigation, auth, settings) carry no song fields and must not
/// reach any warehouse table.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub page: String,
    pub ts: i64,
    #[serde(default, deserialize_with = "flexible_user_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    pub level: String,
    pub session_id: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
}

/// The source serializes `userId` as a number, a numeric string, or `""`
/// for anonymous sessions. Accept all three; empty means no user.
fn flexible_user_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(id)) => Ok(Some(id)),
        Some(Raw::Text(s)) if s.is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid userId: {:?}", s))),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("event is not a playback (page = {0})")]
    NotPlayback(String),

    #[error("playback event is missing required field '{0}'")]
    MissingField(&'static str),
}

/// A validated playback: an event record whose page is `NextSong` with all
/// playback-required fields present. Everything downstream of the page
/// filter works on this shape instead of re-checking options.
#[derive(Clone, Debug, PartialEq)]
pub struct Playback {
    pub ts: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub level: String,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub song: String,
    pub artist: String,
    pub length: f64,
}

impl TryFrom<EventRecord> for Playback {
    type Error = PlaybackError;

    fn try_from(event: EventRecord) -> Result<Self, Self::Error> {
        if event.page != NEXT_SONG_PAGE {
            return Err(PlaybackError::NotPlayback(event.page));
        }
        Ok(Playback {
            ts: event.ts,
            user_id: event.user_id.ok_or(PlaybackError::MissingField("userId"))?,
            first_name: event
                .first_name
                .ok_or(PlaybackError::MissingField("firstName"))?,
            last_name: event
                .last_name
                .ok_or(PlaybackError::MissingField("lastName"))?,
            gender: event.gender,
            level: event.level,
            session_id: event.session_id,
            location: event.location,
            user_agent: event.user_agent,
            song: event.song.ok_or(PlaybackError::MissingField("song"))?,
            artist: event.artist.ok_or(PlaybackError::MissingField("artist"))?,
            length: event.length.ok_or(PlaybackError::MissingField("length"))?,
        })
    }
}
