//! Date resolution
//!
//! Determines when a media file was taken by walking a fallback chain:
//! - EXIF metadata embedded in supported image formats
//! - Timestamp patterns in the file name
//! - File system creation time (where the platform records one) or
//!   modification time
//!
//! The first strategy that yields a date wins. The last one always yields,
//! so resolution never fails.

pub mod exif;
pub mod filename;

use crate::source::SourceFile;
use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};
use serde::Serialize;
use std::time::SystemTime;
use tracing::debug;

/// Source of the resolved timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeSource {
    /// Extracted from EXIF metadata
    Exif,
    /// Parsed from the file name
    Filename,
    /// True creation time reported by the file system
    CreationTime,
    /// File system modification time
    ModificationTime,
}

/// The single "taken" timestamp chosen for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDate {
    /// Local wall clock time
    pub timestamp: NaiveDateTime,
    /// Strategy that produced the timestamp
    pub source: TimeSource,
}

impl ResolvedDate {
    pub fn new(timestamp: NaiveDateTime, source: TimeSource) -> Self {
        Self { timestamp, source }
    }

    /// Month directory name in `YYYY-MM` form
    pub fn month_dir_name(&self) -> String {
        format!("{:04}-{:02}", self.timestamp.year(), self.timestamp.month())
    }

    /// Convert to a system time, interpreting the timestamp in the local
    /// time zone.
    ///
    /// Ambiguous local times pick the earlier instant. Times that fall into
    /// a DST gap are moved forward by an hour, past the gap.
    pub fn to_system_time(&self) -> SystemTime {
        wall_clock_to_system_time(&Local, &self.timestamp)
    }
}

fn wall_clock_to_system_time<Tz: TimeZone>(tz: &Tz, timestamp: &NaiveDateTime) -> SystemTime {
    tz.from_local_datetime(timestamp)
        .earliest()
        .or_else(|| {
            timestamp
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        })
        .map(SystemTime::from)
        .unwrap_or_else(|| Utc.from_utc_datetime(timestamp).into())
}

/// Resolve the taken date of a file. Never fails.
pub fn resolve(file: &SourceFile) -> ResolvedDate {
    from_exif(file)
        .or_else(|| from_filename(file))
        .unwrap_or_else(|| from_filesystem(file))
}

fn from_exif(file: &SourceFile) -> Option<ResolvedDate> {
    if !exif::supports_exif(&file.name) {
        return None;
    }

    match exif::extract_exif_time(&file.path) {
        Ok(timestamp) => {
            debug!(file = %file.name, %timestamp, "Resolved date from EXIF");
            Some(ResolvedDate::new(timestamp, TimeSource::Exif))
        }
        Err(e) => {
            debug!(file = %file.name, error = %e, "No EXIF date, trying file name");
            None
        }
    }
}

fn from_filename(file: &SourceFile) -> Option<ResolvedDate> {
    let timestamp = filename::parse_filename_time(&file.name)?;
    debug!(file = %file.name, %timestamp, "Resolved date from file name");
    Some(ResolvedDate::new(timestamp, TimeSource::Filename))
}

fn from_filesystem(file: &SourceFile) -> ResolvedDate {
    let (time, source) = match file.created {
        Some(created) => (created, TimeSource::CreationTime),
        None => (file.modified, TimeSource::ModificationTime),
    };
    let timestamp = DateTime::<Local>::from(time).naive_local();

    debug!(file = %file.name, %timestamp, ?source, "Falling back to file system time");
    ResolvedDate::new(timestamp, source)
}
