//! Two-pass pipeline driver.
//!
//! Pass 1 walks the catalog files and loads the song and artist
//! dimensions. Pass 2 walks the event files and loads time rows, user
//! rows and songplay facts. The pass order is load-bearing: songplay
//! resolution joins against the catalog dimensions, so no event file is
//! touched until every catalog file has been loaded.

use crate::records;
use crate::transform;
use crate::warehouse::SqliteWarehouse;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("data root {0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to walk data root: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Counters accumulated over one pipeline run, logged as the final
/// summary. `conflicts_ignored` counts insert-or-ignore collisions across
/// songs, artists and time rows; they are expected on reprocessing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub catalog_files: usize,
    pub event_files: usize,
    pub songs_inserted: usize,
    pub artists_inserted: usize,
    pub time_rows_inserted: usize,
    pub users_upserted: usize,
    pub songplays_inserted: usize,
    pub conflicts_ignored: usize,
    pub lookup_hits: usize,
    pub lookup_misses: usize,
    pub write_errors: usize,
}

/// Recursively collect all `*.json` files under a root (extension matched
/// case-insensitively), sorted by file name so a run processes files in a
/// stable order.
pub fn discover_json_files(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_json = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

/// Run the full ETL: catalog pass, then event pass.
///
/// With `fail_fast` unset, a failed database write is logged and counted
/// while the run continues with the next record; parse and discovery
/// failures always abort the run.
pub fn run(
    warehouse: &SqliteWarehouse,
    catalog_root: &Path,
    events_root: &Path,
    fail_fast: bool,
) -> Result<RunStats> {
    let mut stats = RunStats::default();

    let catalog_files =
        discover_json_files(catalog_root).context("catalog file discovery failed")?;
    info!(
        "Found {} catalog files under {}",
        catalog_files.len(),
        catalog_root.display()
    );
    for (index, path) in catalog_files.iter().enumerate() {
        process_catalog_file(warehouse, path, fail_fast, &mut stats)?;
        info!(
            "{}/{} catalog files processed: {}",
            index + 1,
            catalog_files.len(),
            path.display()
        );
    }
    stats.catalog_files = catalog_files.len();

    let event_files = discover_json_files(events_root).context("event file discovery failed")?;
    info!(
        "Found {} event files under {}",
        event_files.len(),
        events_root.display()
    );
    for (index, path) in event_files.iter().enumerate() {
        process_event_file(warehouse, path, fail_fast, &mut stats)?;
        info!(
            "{}/{} event files processed: {}",
            index + 1,
            event_files.len(),
            path.display()
        );
    }
    stats.event_files = event_files.len();

    Ok(stats)
}

fn process_catalog_file(
    warehouse: &SqliteWarehouse,
    path: &Path,
    fail_fast: bool,
    stats: &mut RunStats,
) -> Result<()> {
    let record = records::read_catalog_file(path)?;

    let song = transform::song_row(&record);
    if let Some(inserted) = apply_write(warehouse.insert_song(&song), "song", path, fail_fast, stats)? {
        tally_insert(inserted, &mut stats.songs_inserted, &mut stats.conflicts_ignored);
    }

    let artist = transform::artist_row(&record);
    if let Some(inserted) =
        apply_write(warehouse.insert_artist(&artist), "artist", path, fail_fast, stats)?
    {
        tally_insert(inserted, &mut stats.artists_inserted, &mut stats.conflicts_ignored);
    }

    Ok(())
}

fn process_event_file(
    warehouse: &SqliteWarehouse,
    path: &Path,
    fail_fast: bool,
    stats: &mut RunStats,
) -> Result<()> {
    let events = records::read_event_file(path)?;
    let playbacks = transform::playbacks(events)
        .with_context(|| format!("invalid playback record in {}", path.display()))?;

    // Time rows first, then users, then facts: the fact table's foreign
    // keys point at rows written earlier in this same loop ordering.
    for playback in &playbacks {
        let Some(time) = transform::time_row(playback) else {
            bail!(
                "timestamp {} out of range in {}",
                playback.ts,
                path.display()
            );
        };
        if let Some(inserted) =
            apply_write(warehouse.insert_time(&time), "time row", path, fail_fast, stats)?
        {
            tally_insert(inserted, &mut stats.time_rows_inserted, &mut stats.conflicts_ignored);
        }
    }

    for playback in &playbacks {
        let user = transform::user_row(playback);
        if apply_write(warehouse.upsert_user(&user), "user", path, fail_fast, stats)?.is_some() {
            stats.users_upserted += 1;
        }
    }

    for playback in &playbacks {
        let resolved = warehouse
            .find_song_by_title_artist_duration(&playback.song, &playback.artist, playback.length)
            .with_context(|| format!("song/artist lookup failed for {}", path.display()))?;
        match resolved {
            Some(_) => stats.lookup_hits += 1,
            None => stats.lookup_misses += 1,
        }

        let songplay = transform::songplay_row(playback, resolved);
        if apply_write(
            warehouse.insert_songplay(&songplay),
            "songplay",
            path,
            fail_fast,
            stats,
        )?
        .is_some()
        {
            stats.songplays_inserted += 1;
        }
    }

    Ok(())
}

fn tally_insert(inserted: bool, inserted_count: &mut usize, ignored_count: &mut usize) {
    if inserted {
        *inserted_count += 1;
    } else {
        *ignored_count += 1;
    }
}

/// Apply the per-record write policy: under `fail_fast` the first failed
/// write aborts the run; otherwise it is logged, counted, and skipped.
/// Each statement commits on its own, so a failed record costs exactly
/// that record.
fn apply_write<T>(
    result: Result<T>,
    what: &str,
    path: &Path,
    fail_fast: bool,
    stats: &mut RunStats,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if fail_fast => {
            Err(e).with_context(|| format!("failed to write {} from {}", what, path.display()))
        }
        Err(e) => {
            error!("Failed to write {} from {}: {:#}", what, path.display(), e);
            stats.write_errors += 1;
            Ok(None)
        }
    }
}
