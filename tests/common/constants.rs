//! Shared constants for end-to-end tests
//!
//! All fixture IDs, names and durations used across the test suite live
//! here; tests and fixtures reference these instead of repeating literals.

// ============================================================================
// Test Catalog IDs
// ============================================================================

/// Song ID for "Test Song"
pub const SONG_1_ID: &str = "SOTEST12AB0180001";

/// Title of the first test song
pub const SONG_1_TITLE: &str = "Test Song";

/// Duration of the first test song, in seconds
pub const SONG_1_DURATION: f64 = 200.5;

/// Song ID for "Second Song"
pub const SONG_2_ID: &str = "SOTEST12AB0180002";

/// Title of the second test song
pub const SONG_2_TITLE: &str = "Second Song";

/// Duration of the second test song, in seconds
pub const SONG_2_DURATION: f64 = 131.2;

/// Artist ID for "Test Artist"
pub const ARTIST_1_ID: &str = "ARTEST12AB0190001";

/// Name of the first test artist
pub const ARTIST_1_NAME: &str = "Test Artist";

/// Artist ID for "Other Artist"
pub const ARTIST_2_ID: &str = "ARTEST12AB0190002";

/// Name of the second test artist
pub const ARTIST_2_NAME: &str = "Other Artist";

// ============================================================================
// Test Users
// ============================================================================

/// User ID appearing across multiple event files
pub const USER_1_ID: i64 = 39;

/// User ID appearing in a single event file
pub const USER_2_ID: i64 = 8;

// ============================================================================
// Timestamps (epoch milliseconds)
// ============================================================================

/// 2018-11-15 16:19:34.796 UTC
pub const TS_1: i64 = 1542298774796;

/// 2018-11-15 17:00:00.000 UTC
pub const TS_2: i64 = 1542301200000;
