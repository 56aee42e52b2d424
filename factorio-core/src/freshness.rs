//! Staleness arithmetic for the telemetry file
//!
//! The game rewrites the file continuously while a save is running, so a file
//! that has not been touched for a couple of seconds means the game is paused,
//! in a menu or gone. These functions are pure so they can be checked without
//! a filesystem; the plugin feeds them the file's modification time.

use std::time::{Duration, SystemTime};

/// Maximum age used when the caller asks for zero or a negative threshold.
pub const DEFAULT_MAX_AGE_SECS: u64 = 2;

/// Convert a requested threshold in seconds to the effective maximum age.
///
/// Non-positive requests fall back to [`DEFAULT_MAX_AGE_SECS`].
pub fn effective_max_age(requested_secs: i64) -> Duration {
    match u64::try_from(requested_secs) {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => Duration::from_secs(DEFAULT_MAX_AGE_SECS),
    }
}

/// How long ago `modified` was, or `None` if it lies in the future.
pub fn file_age(modified: SystemTime, now: SystemTime) -> Option<Duration> {
    now.duration_since(modified).ok()
}

/// Whether a file modified at `modified` is fresh at `now`.
///
/// Future modification times (clock skew between the game and us) count as
/// fresh.
pub fn is_fresh_at(modified: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    match file_age(modified, now) {
        Some(age) => age <= max_age,
        None => true,
    }
}
