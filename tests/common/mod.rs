//! Common test infrastructure
//!
//! This module provides the fixture data and constants shared by the
//! end-to-end tests. Tests should only import from this module, not from
//! internal submodules.

mod constants;
mod fixtures;

// Public API - this is what tests import
pub use constants::*;
pub use fixtures::{catalog_line, home_line, next_song_line, test_data, write_json_file, TestData};
