//! Test fixture creation: source data directories and JSON lines.
//!
//! Fixtures mirror the real file families: one catalog object per file
//! under `song_data/`, many newline-delimited event objects per file
//! under nested `log_data/` subdirectories.

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch area holding the warehouse database path and the two source
/// data roots. Dropping it removes everything.
pub struct TestData {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
}

/// Create empty `song_data/` and `log_data/` roots plus a database path
/// inside one temp directory.
pub fn test_data() -> Result<TestData> {
    let dir = TempDir::new()?;
    let song_data = dir.path().join("song_data");
    let log_data = dir.path().join("log_data");
    fs::create_dir_all(&song_data)?;
    // Event files live in nested date directories in the real dataset
    fs::create_dir_all(log_data.join("2018/11"))?;
    let db_path = dir.path().join("warehouse.db");
    Ok(TestData {
        dir,
        db_path,
        song_data,
        log_data,
    })
}

/// Write one file containing the given newline-delimited JSON lines.
pub fn write_json_file(dir: &Path, name: &str, lines: &[String]) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("{}\n", lines.join("\n")))?;
    Ok(path)
}

/// One catalog record line in the source format.
pub fn catalog_line(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    year: i32,
    duration: f64,
) -> String {
    json!({
        "num_songs": 1,
        "song_id": song_id,
        "title": title,
        "artist_id": artist_id,
        "artist_name": artist_name,
        "artist_location": "",
        "artist_latitude": null,
        "artist_longitude": null,
        "year": year,
        "duration": duration,
    })
    .to_string()
}

/// One `NextSong` event record line in the source format.
pub fn next_song_line(
    ts: i64,
    user_id: i64,
    level: &str,
    song: &str,
    artist: &str,
    length: f64,
) -> String {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Walter",
        "gender": "M",
        "itemInSession": 0,
        "lastName": "Frye",
        "length": length,
        "level": level,
        "location": "San Francisco-Oakland-Hayward, CA",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540919166796.0,
        "sessionId": 38,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id.to_string(),
    })
    .to_string()
}

/// One non-playback event record line (a page view).
pub fn home_line(ts: i64, user_id: i64) -> String {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": "Walter",
        "gender": "M",
        "itemInSession": 0,
        "lastName": "Frye",
        "length": null,
        "level": "free",
        "location": "San Francisco-Oakland-Hayward, CA",
        "method": "GET",
        "page": "Home",
        "registration": 1540919166796.0,
        "sessionId": 38,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id.to_string(),
    })
    .to_string()
}
