//! Filename timestamp parsing
//!
//! The whole file stem must match one of the known layouts. Partial matches
//! inside longer names are not considered.

use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::trace;

/// A literal file stem layout
#[derive(Debug, Clone, Copy)]
enum StemFormat {
    /// Date and time of day
    DateTime(&'static str),
    /// Date only, resolved to midnight
    Date(&'static str),
}

/// Known layouts, tried in order
const STEM_FORMATS: &[StemFormat] = &[
    StemFormat::DateTime("%Y-%m-%d_%H-%M-%S"),
    StemFormat::Date("%Y-%m-%d"),
    StemFormat::Date("%Y%m%d"),
    StemFormat::DateTime("%Y%m%d_%H%M%S"),
    StemFormat::DateTime("PXL_%Y%m%d_%H%M%S"),
    StemFormat::DateTime("PXL_%Y%m%d_%H%M%S%3f"),
    StemFormat::DateTime("IMG_%Y%m%d_%H%M%S"),
    StemFormat::DateTime("VID_%Y%m%d_%H%M%S"),
];

impl StemFormat {
    fn parse(&self, stem: &str) -> Option<NaiveDateTime> {
        match self {
            StemFormat::DateTime(format) => NaiveDateTime::parse_from_str(stem, format).ok(),
            StemFormat::Date(format) => NaiveDate::parse_from_str(stem, format)
                .ok()?
                .and_hms_opt(0, 0, 0),
        }
    }
}

/// Parse a timestamp from a file name
pub fn parse_filename_time(file_name: &str) -> Option<NaiveDateTime> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;

    STEM_FORMATS.iter().find_map(|format| {
        let dt = format.parse(stem)?;
        trace!(file_name, ?format, "Matched file name pattern");
        Some(dt)
    })
}
