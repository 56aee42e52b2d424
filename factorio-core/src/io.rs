//! I/O abstraction for the telemetry bridge.
//!
//! The core crate never touches the filesystem or the host. The plugin
//! implements [`TelemetrySource`] over the real telemetry file and
//! [`HostLog`] over Mumble's log function; tests implement both in memory.
//!
//! # Poll-based Design
//!
//! Every method is a bounded, synchronous query. Nothing is cached between
//! calls: the host's polling cadence decides how often the file is looked at.
//!
//! # Example
//!
//! ```rust
//! use factorio_core::io::{TelemetrySource, TelemetrySourceExt};
//! use factorio_core::{ParseError, PositionRecord};
//! use std::time::Duration;
//!
//! struct Fixed;
//!
//! impl TelemetrySource for Fixed {
//!     fn exists(&self) -> bool {
//!         true
//!     }
//!     fn is_fresh(&self, _max_age: Duration) -> bool {
//!         true
//!     }
//!     fn read_record(&self) -> Result<PositionRecord, ParseError> {
//!         factorio_core::parser::parse_str("x:1\ny:2\nz:3\np:1\nu:1\ns:host")
//!     }
//! }
//!
//! let record = Fixed.fetch_record(Duration::from_secs(2)).unwrap();
//! assert_eq!(record.position(), [1.0, 2.0, 3.0]);
//! ```

use core::fmt;
use std::time::Duration;

use crate::error::{ParseError, TelemetryError};
use crate::record::PositionRecord;

// =============================================================================
// Error Types
// =============================================================================

/// A message the host refused to put in its console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLogError {
    /// Status the host's log call returned, or -1 when it was never reached
    pub code: i32,
    pub message: String,
}

impl HostLogError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Wrap a non-OK status returned by the host's log function.
    pub fn from_code(code: i32) -> Self {
        Self {
            code,
            message: format!("Host log failed: {}", code),
        }
    }

    /// The host API has not been handed to the plugin yet.
    pub fn not_registered() -> Self {
        Self::new(-1, "Host API not registered")
    }
}

impl fmt::Display for HostLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for HostLogError {}

// =============================================================================
// Traits
// =============================================================================

/// The telemetry file as seen by the provider.
///
/// Implementations must re-check the underlying file on every call.
pub trait TelemetrySource {
    /// Whether the file can be opened for reading right now.
    ///
    /// Must not read the content.
    fn exists(&self) -> bool;

    /// Whether the file was last modified no more than `max_age` ago.
    ///
    /// Must not read the content. Modification times in the future count as
    /// fresh.
    fn is_fresh(&self, max_age: Duration) -> bool;

    /// Read the whole file and decode it.
    fn read_record(&self) -> Result<PositionRecord, ParseError>;
}

/// The host's user-visible log.
pub trait HostLog {
    /// Write one message to the host's log.
    fn log(&self, message: &str) -> Result<(), HostLogError>;
}

impl<T: HostLog + ?Sized> HostLog for &T {
    fn log(&self, message: &str) -> Result<(), HostLogError> {
        (**self).log(message)
    }
}

// =============================================================================
// Helper Methods
// =============================================================================

/// Extension methods for TelemetrySource.
pub trait TelemetrySourceExt: TelemetrySource {
    /// Presence then freshness, as the provider gates every call.
    fn check(&self, max_age: Duration) -> Result<(), TelemetryError> {
        if !self.exists() {
            return Err(TelemetryError::FileAbsent);
        }
        if !self.is_fresh(max_age) {
            return Err(TelemetryError::FileStale);
        }
        Ok(())
    }

    /// Gate on presence and freshness, then decode.
    fn fetch_record(&self, max_age: Duration) -> Result<PositionRecord, TelemetryError> {
        self.check(max_age)?;
        Ok(self.read_record()?)
    }
}

// Blanket implementation for all TelemetrySource types
impl<T: TelemetrySource + ?Sized> TelemetrySourceExt for T {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fake {
        exists: bool,
        fresh: bool,
        text: &'static str,
        reads: Cell<u32>,
    }

    impl TelemetrySource for Fake {
        fn exists(&self) -> bool {
            self.exists
        }
        fn is_fresh(&self, _max_age: Duration) -> bool {
            self.fresh
        }
        fn read_record(&self) -> Result<PositionRecord, ParseError> {
            self.reads.set(self.reads.get() + 1);
            crate::parser::parse_str(self.text)
        }
    }

    fn fake(exists: bool, fresh: bool, text: &'static str) -> Fake {
        Fake {
            exists,
            fresh,
            text,
            reads: Cell::new(0),
        }
    }

    #[test]
    fn test_host_log_error_display() {
        let err = HostLogError::new(-1, "Test error");
        assert_eq!(format!("{}", err), "Test error (code -1)");
        assert_eq!(HostLogError::from_code(3).to_string(), "Host log failed: 3 (code 3)");
    }

    #[test]
    fn test_check_order() {
        let max_age = Duration::from_secs(2);
        assert_eq!(fake(false, false, "").check(max_age), Err(TelemetryError::FileAbsent));
        assert_eq!(fake(true, false, "").check(max_age), Err(TelemetryError::FileStale));
        assert_eq!(fake(true, true, "").check(max_age), Ok(()));
    }

    #[test]
    fn test_fetch_record_skips_read_when_gated() {
        let source = fake(true, false, "x:1\ny:1\nz:1\np:1\nu:1\ns:a");
        assert_eq!(
            source.fetch_record(Duration::from_secs(2)),
            Err(TelemetryError::FileStale)
        );
        assert_eq!(source.reads.get(), 0);
    }

    #[test]
    fn test_fetch_record_wraps_parse_error() {
        let source = fake(true, true, "x:1");
        let err = source.fetch_record(Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, TelemetryError::Parse(ParseError::Incomplete { .. })));
        assert_eq!(source.reads.get(), 1);
    }
}
