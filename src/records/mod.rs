mod models;
mod reader;

pub use models::{CatalogRecord, EventRecord, Playback, PlaybackError, NEXT_SONG_PAGE};
pub use reader::{read_catalog_file, read_event_file, ReadError};
