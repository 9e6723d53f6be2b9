//! Newline-delimited JSON file readers.
//!
//! Each call reads one file front to back; there is no cross-file state.
//! A malformed line or a line missing a required field fails the file with
//! the path and one-based line number attached.

use super::models::{CatalogRecord, EventRecord};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed record at {path:?} line {line_number}: {source}")]
    MalformedLine {
        path: PathBuf,
        line_number: usize,
        source: serde_json::Error,
    },

    #[error("no records found in {path:?}")]
    Empty { path: PathBuf },
}

fn parse_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ReadError> {
    let file = File::open(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| ReadError::MalformedLine {
            path: path.to_path_buf(),
            line_number: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Read the single catalog record a catalog file holds. A file with more
/// than one line keeps only the first record, matching the one-object-per-
/// file contract of the catalog family.
pub fn read_catalog_file(path: &Path) -> Result<CatalogRecord, ReadError> {
    let mut records: Vec<CatalogRecord> = parse_lines(path)?;
    if records.is_empty() {
        return Err(ReadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(records.swap_remove(0))
}

/// Read all event records from one event file, in file order. An empty
/// file is a valid zero-record file, not an error.
pub fn read_event_file(path: &Path) -> Result<Vec<EventRecord>, ReadError> {
    parse_lines(path)
}
