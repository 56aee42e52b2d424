//! The on-disk telemetry file written by the Factorio mod.
//!
//! The mod rewrites the whole file every game tick, so each call opens it
//! afresh and nothing is cached between calls.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use factorio_core::freshness::{file_age, is_fresh_at};
use factorio_core::parser::parse_reader;
use factorio_core::{ParseError, PositionRecord, TelemetrySource};

/// [`TelemetrySource`] backed by a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryFile {
    path: PathBuf,
}

impl TelemetryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last modification time, if the file can be stat'ed.
    pub fn modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
    }

    /// How long ago the file was last written.
    pub fn age(&self) -> Option<Duration> {
        self.modified()
            .and_then(|modified| file_age(modified, SystemTime::now()))
    }
}

impl TelemetrySource for TelemetryFile {
    fn exists(&self) -> bool {
        File::open(&self.path)
            .and_then(|file| file.metadata())
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    fn is_fresh(&self, max_age: Duration) -> bool {
        match self.modified() {
            Some(modified) => is_fresh_at(modified, SystemTime::now(), max_age),
            None => false,
        }
    }

    fn read_record(&self) -> Result<PositionRecord, ParseError> {
        let file = File::open(&self.path)?;
        parse_reader(BufReader::new(file))
    }
}
