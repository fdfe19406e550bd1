//! Platform-specific file time handling.
//!
//! Two capabilities differ between operating systems: reading a true
//! creation time and writing timestamps onto a copied file. The rest of the
//! crate talks to them through [`true_creation_time`] and the
//! [`TimestampStamper`] trait.

#[cfg(windows)]
pub mod windows;

use filetime::FileTime;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Writes a timestamp onto an existing file
pub trait TimestampStamper: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Set the file's timestamps to `time`
    fn stamp(&self, path: &Path, time: SystemTime) -> io::Result<()>;
}

/// Sets access and modification times. Works everywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct PortableStamper;

impl TimestampStamper for PortableStamper {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn stamp(&self, path: &Path, time: SystemTime) -> io::Result<()> {
        let time = FileTime::from_system_time(time);
        filetime::set_file_times(path, time, time)
    }
}

/// Select the stamper for the platform we are running on
#[cfg(windows)]
pub fn platform_stamper() -> Arc<dyn TimestampStamper> {
    Arc::new(windows::CreationTimeStamper)
}

/// Select the stamper for the platform we are running on
#[cfg(not(windows))]
pub fn platform_stamper() -> Arc<dyn TimestampStamper> {
    Arc::new(PortableStamper)
}

/// Creation time distinct from modification time, where the platform keeps one.
#[cfg(windows)]
pub fn true_creation_time(metadata: &Metadata) -> Option<SystemTime> {
    metadata.created().ok()
}

/// Creation time distinct from modification time, where the platform keeps one.
///
/// Unix birth times often reflect when a file was copied onto the disk, so
/// they are not trusted here.
#[cfg(not(windows))]
pub fn true_creation_time(_metadata: &Metadata) -> Option<SystemTime> {
    None
}
