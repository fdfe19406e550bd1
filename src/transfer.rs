//! Copying files and stamping the resolved date onto the copy

use crate::error::{Error, Result};
use crate::os::{self, TimestampStamper};
use crate::time::ResolvedDate;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// Copies file contents and applies timestamps through a platform stamper
#[derive(Clone)]
pub struct FileTransfer {
    stamper: Arc<dyn TimestampStamper>,
}

impl std::fmt::Debug for FileTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTransfer")
            .field("stamper", &self.stamper.name())
            .finish()
    }
}

impl Default for FileTransfer {
    fn default() -> Self {
        Self::new(os::platform_stamper())
    }
}

impl FileTransfer {
    pub fn new(stamper: Arc<dyn TimestampStamper>) -> Self {
        Self { stamper }
    }

    /// Name of the stamper in use
    pub fn stamper_name(&self) -> &'static str {
        self.stamper.name()
    }

    /// Copy the whole source file to `dest`, replacing any existing file.
    ///
    /// Returns the number of bytes written.
    pub fn copy(&self, source: &Path, dest: &Path) -> Result<u64> {
        let content = fs::read(source).map_err(|e| Error::ReadFile {
            path: source.to_path_buf(),
            source: e,
        })?;

        fs::write(dest, &content).map_err(|e| Error::WriteFile {
            path: dest.to_path_buf(),
            source: e,
        })?;

        trace!(?source, ?dest, bytes = content.len(), "Copied file");
        Ok(content.len() as u64)
    }

    /// Set the destination's timestamps to the resolved date
    pub fn stamp(&self, dest: &Path, date: &ResolvedDate) -> Result<()> {
        self.stamper
            .stamp(dest, date.to_system_time())
            .map_err(|e| Error::Stamp {
                path: dest.to_path_buf(),
                source: e,
            })
    }
}
