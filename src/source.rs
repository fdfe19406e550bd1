//! Snapshot of a source file taken at enumeration time

use crate::error::{Error, Result};
use crate::os;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One input file as seen when the source directory was listed
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File name, lossily converted for display and pattern matching
    pub name: String,
    /// Full path to the file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Modification time
    pub modified: SystemTime,
    /// True creation time, only on platforms that record one separately
    pub created: Option<SystemTime>,
}

impl SourceFile {
    /// Build a snapshot from already fetched metadata
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Result<Self> {
        let name = path
            .file_name()
            .ok_or_else(|| Error::InvalidFileName { path: path.clone() })?
            .to_string_lossy()
            .into_owned();

        let modified = metadata.modified().map_err(|e| Error::FileInfo {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            name,
            size: metadata.len(),
            modified,
            created: os::true_creation_time(metadata),
            path,
        })
    }

    /// Stat a path and build a snapshot from it
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| Error::FileInfo {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_metadata(path.to_path_buf(), &metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("IMG_001.JPG");
        fs::write(&path, b"12345").unwrap();

        let file = SourceFile::from_path(&path).unwrap();
        assert_eq!(file.name, "IMG_001.JPG");
        assert_eq!(file.size, 5);
        assert_eq!(file.path, path);

        #[cfg(not(windows))]
        assert!(file.created.is_none());
    }

    #[test]
    fn test_snapshot_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = SourceFile::from_path(temp.path().join("gone.jpg"));
        assert!(matches!(result, Err(Error::FileInfo { .. })));
    }
}
