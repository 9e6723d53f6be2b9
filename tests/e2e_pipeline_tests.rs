//! End-to-end tests for the two-pass ETL pipeline.
//!
//! Each test builds a miniature copy of the source tree (catalog files
//! plus nested event files), runs the pipeline against a temp database,
//! and asserts on the resulting warehouse state.

mod common;

use common::{
    catalog_line, home_line, next_song_line, test_data, write_json_file, ARTIST_1_ID,
    ARTIST_1_NAME, ARTIST_2_ID, ARTIST_2_NAME, SONG_1_DURATION, SONG_1_ID, SONG_1_TITLE,
    SONG_2_DURATION, SONG_2_ID, SONG_2_TITLE, TS_1, TS_2, USER_1_ID, USER_2_ID,
};
use playlog_etl::{pipeline, SqliteWarehouse};
use rusqlite::Connection;

// =============================================================================
// Catalog pass
// =============================================================================

#[test]
fn test_catalog_pass_loads_songs_and_artists() {
    let data = test_data().unwrap();
    write_json_file(
        &data.song_data,
        "song_1.json",
        &[catalog_line(
            SONG_1_ID,
            SONG_1_TITLE,
            ARTIST_1_ID,
            ARTIST_1_NAME,
            2004,
            SONG_1_DURATION,
        )],
    )
    .unwrap();
    write_json_file(
        &data.song_data,
        "song_2.json",
        &[catalog_line(
            SONG_2_ID,
            SONG_2_TITLE,
            ARTIST_2_ID,
            ARTIST_2_NAME,
            0,
            SONG_2_DURATION,
        )],
    )
    .unwrap();

    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();
    let stats = pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap();

    assert_eq!(stats.catalog_files, 2);
    assert_eq!(stats.songs_inserted, 2);
    assert_eq!(stats.artists_inserted, 2);
    assert_eq!(stats.write_errors, 0);

    let counts = warehouse.table_counts().unwrap();
    assert_eq!(counts.songs, 2);
    assert_eq!(counts.artists, 2);
    assert_eq!(counts.songplays, 0);
}

#[test]
fn test_reprocessing_catalog_is_idempotent() {
    let data = test_data().unwrap();
    write_json_file(
        &data.song_data,
        "song_1.json",
        &[catalog_line(
            SONG_1_ID,
            SONG_1_TITLE,
            ARTIST_1_ID,
            ARTIST_1_NAME,
            2004,
            SONG_1_DURATION,
        )],
    )
    .unwrap();

    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();
    pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap();
    let second = pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap();

    // Second run hits only key conflicts, never errors
    assert_eq!(second.songs_inserted, 0);
    assert_eq!(second.artists_inserted, 0);
    assert_eq!(second.conflicts_ignored, 2);
    assert_eq!(second.write_errors, 0);

    let counts = warehouse.table_counts().unwrap();
    assert_eq!(counts.songs, 1);
    assert_eq!(counts.artists, 1);
}

// =============================================================================
// Event pass
// =============================================================================

#[test]
fn test_event_pass_without_next_song_loads_nothing() {
    let data = test_data().unwrap();
    write_json_file(
        &data.log_data.join("2018/11"),
        "2018-11-15-events.json",
        &[home_line(TS_1, USER_1_ID), home_line(TS_2, USER_1_ID)],
    )
    .unwrap();

    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();
    let stats = pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap();

    assert_eq!(stats.event_files, 1);
    let counts = warehouse.table_counts().unwrap();
    assert_eq!(counts.time, 0);
    assert_eq!(counts.users, 0);
    assert_eq!(counts.songplays, 0);
}

#[test]
fn test_time_rows_unique_across_event_files() {
    let data = test_data().unwrap();
    let events_dir = data.log_data.join("2018/11");
    write_json_file(
        &events_dir,
        "2018-11-15-events.json",
        &[next_song_line(TS_1, USER_1_ID, "free", "Unknown", "Nobody", 99.9)],
    )
    .unwrap();
    write_json_file(
        &events_dir,
        "2018-11-16-events.json",
        &[
            next_song_line(TS_1, USER_2_ID, "free", "Unknown", "Nobody", 99.9),
            next_song_line(TS_2, USER_2_ID, "free", "Unknown", "Nobody", 99.9),
        ],
    )
    .unwrap();

    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();
    let stats = pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap();

    assert_eq!(stats.time_rows_inserted, 2);
    assert_eq!(stats.conflicts_ignored, 1);
    assert_eq!(warehouse.table_counts().unwrap().time, 2);
}

#[test]
fn test_user_level_last_write_wins_across_files() {
    let data = test_data().unwrap();
    let events_dir = data.log_data.join("2018/11");
    // Files are processed in name order: the paid record comes second
    write_json_file(
        &events_dir,
        "2018-11-15-events.json",
        &[next_song_line(TS_1, USER_1_ID, "free", "Unknown", "Nobody", 99.9)],
    )
    .unwrap();
    write_json_file(
        &events_dir,
        "2018-11-16-events.json",
        &[next_song_line(TS_2, USER_1_ID, "paid", "Unknown", "Nobody", 99.9)],
    )
    .unwrap();

    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();
    pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap();
    drop(warehouse);

    let conn = Connection::open(&data.db_path).unwrap();
    let (user_count, level): (i64, String) = conn
        .query_row(
            "SELECT COUNT(*), MAX(level) FROM users WHERE user_id = ?1",
            [USER_1_ID],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(user_count, 1);
    assert_eq!(level, "paid");
}

// =============================================================================
// Songplay resolution
// =============================================================================

#[test]
fn test_songplay_resolves_matching_catalog_entry() {
    let data = test_data().unwrap();
    write_json_file(
        &data.song_data,
        "song_1.json",
        &[catalog_line(
            SONG_1_ID,
            SONG_1_TITLE,
            ARTIST_1_ID,
            ARTIST_1_NAME,
            2004,
            SONG_1_DURATION,
        )],
    )
    .unwrap();
    write_json_file(
        &data.log_data.join("2018/11"),
        "2018-11-15-events.json",
        &[
            // Exact title/artist/duration match
            next_song_line(TS_1, USER_1_ID, "free", SONG_1_TITLE, ARTIST_1_NAME, SONG_1_DURATION),
            // Same song, duration off by 0.1: must not resolve
            next_song_line(TS_2, USER_1_ID, "free", SONG_1_TITLE, ARTIST_1_NAME, 200.6),
        ],
    )
    .unwrap();

    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();
    let stats = pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap();

    assert_eq!(stats.lookup_hits, 1);
    assert_eq!(stats.lookup_misses, 1);
    assert_eq!(stats.songplays_inserted, 2);
    drop(warehouse);

    let conn = Connection::open(&data.db_path).unwrap();
    let (song_id, artist_id): (Option<String>, Option<String>) = conn
        .query_row(
            "SELECT song_id, artist_id FROM songplays WHERE start_time = ?1",
            [TS_1],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(song_id.as_deref(), Some(SONG_1_ID));
    assert_eq!(artist_id.as_deref(), Some(ARTIST_1_ID));

    let (song_id, artist_id): (Option<String>, Option<String>) = conn
        .query_row(
            "SELECT song_id, artist_id FROM songplays WHERE start_time = ?1",
            [TS_2],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(song_id, None);
    assert_eq!(artist_id, None);
}

#[test]
fn test_double_load_doubles_facts_but_not_dimensions() {
    let data = test_data().unwrap();
    write_json_file(
        &data.song_data,
        "song_1.json",
        &[catalog_line(
            SONG_1_ID,
            SONG_1_TITLE,
            ARTIST_1_ID,
            ARTIST_1_NAME,
            2004,
            SONG_1_DURATION,
        )],
    )
    .unwrap();
    write_json_file(
        &data.log_data.join("2018/11"),
        "2018-11-15-events.json",
        &[next_song_line(TS_1, USER_1_ID, "free", SONG_1_TITLE, ARTIST_1_NAME, SONG_1_DURATION)],
    )
    .unwrap();

    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();
    pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap();
    pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap();

    let counts = warehouse.table_counts().unwrap();
    assert_eq!(counts.songs, 1);
    assert_eq!(counts.artists, 1);
    assert_eq!(counts.time, 1);
    assert_eq!(counts.users, 1);
    // The fact table has a surrogate key, so reprocessing appends
    assert_eq!(counts.songplays, 2);
}

// =============================================================================
// Failure behavior
// =============================================================================

#[test]
fn test_malformed_event_file_aborts_run() {
    let data = test_data().unwrap();
    write_json_file(
        &data.log_data.join("2018/11"),
        "2018-11-15-events.json",
        &["{broken".to_string()],
    )
    .unwrap();

    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();
    let err = pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap_err();
    assert!(err.to_string().contains("line 1"));
}

#[test]
fn test_next_song_record_missing_field_aborts_run() {
    let data = test_data().unwrap();
    // A NextSong record whose song field is null is invalid
    let line = next_song_line(TS_1, USER_1_ID, "free", "x", ARTIST_1_NAME, 1.0)
        .replace("\"x\"", "null");
    write_json_file(
        &data.log_data.join("2018/11"),
        "2018-11-15-events.json",
        &[line],
    )
    .unwrap();

    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();
    let err = pipeline::run(&warehouse, &data.song_data, &data.log_data, false).unwrap_err();
    assert!(format!("{:#}", err).contains("song"));
}

#[test]
fn test_missing_data_root_aborts_run() {
    let data = test_data().unwrap();
    let warehouse = SqliteWarehouse::open(&data.db_path).unwrap();

    let missing = data.dir.path().join("nope");
    let err = pipeline::run(&warehouse, &missing, &data.log_data, false).unwrap_err();
    assert!(format!("{:#}", err).contains("discovery"));
}

#[test]
fn test_open_rejects_unrelated_database() {
    let data = test_data().unwrap();
    {
        let conn = Connection::open(&data.db_path).unwrap();
        conn.execute("CREATE TABLE songs (wrong TEXT)", []).unwrap();
    }

    let result = SqliteWarehouse::open(&data.db_path);
    assert!(result.is_err());
}
