//! Projections from source records to star-schema rows.
//!
//! Everything here is a pure function: filtering, validation, field
//! projection and calendar derivation. All database effects (conflict
//! handling, the song/artist lookup) stay with the caller.

use crate::records::{CatalogRecord, EventRecord, Playback, PlaybackError, NEXT_SONG_PAGE};
use crate::warehouse::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};

/// Project a catalog record into its song dimension row.
pub fn song_row(record: &CatalogRecord) -> SongRow {
    SongRow {
        song_id: record.song_id.clone(),
        title: record.title.clone(),
        artist_id: record.artist_id.clone(),
        year: record.year,
        duration: record.duration,
    }
}

/// Project a catalog record into its artist dimension row. The source
/// writes unknown locations as `""`; those become NULL.
pub fn artist_row(record: &CatalogRecord) -> ArtistRow {
    ArtistRow {
        artist_id: record.artist_id.clone(),
        name: record.artist_name.clone(),
        location: record
            .artist_location
            .as_deref()
            .filter(|location| !location.is_empty())
            .map(str::to_string),
        latitude: record.artist_latitude,
        longitude: record.artist_longitude,
    }
}

/// Keep only `NextSong` entries and validate each into a [`Playback`].
/// Non-playback pages are dropped silently; a playback entry missing a
/// required field is an error for the whole file.
pub fn playbacks(events: Vec<EventRecord>) -> Result<Vec<Playback>, PlaybackError> {
    events
        .into_iter()
        .filter(|event| event.page == NEXT_SONG_PAGE)
        .map(Playback::try_from)
        .collect()
}

/// Derive the time dimension row for a playback. `None` when the event
/// timestamp falls outside the representable date range.
pub fn time_row(playback: &Playback) -> Option<TimeRow> {
    TimeRow::from_epoch_ms(playback.ts)
}

/// Project a playback into its user dimension row.
pub fn user_row(playback: &Playback) -> UserRow {
    UserRow {
        user_id: playback.user_id,
        first_name: playback.first_name.clone(),
        last_name: playback.last_name.clone(),
        gender: playback.gender.clone(),
        level: playback.level.clone(),
    }
}

/// Assemble the songplay fact row for a playback, given the catalog
/// references resolved for it (or `None` when the lookup found no match).
pub fn songplay_row(playback: &Playback, resolved: Option<(String, String)>) -> SongplayRow {
    let (song_id, artist_id) = match resolved {
        Some((song_id, artist_id)) => (Some(song_id), Some(artist_id)),
        None => (None, None),
    };
    SongplayRow {
        start_time: playback.ts,
        user_id: playback.user_id,
        level: playback.level.clone(),
        song_id,
        artist_id,
        session_id: playback.session_id,
        location: playback.location.clone(),
        user_agent: playback.user_agent.clone(),
    }
}
