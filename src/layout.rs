//! Destination path construction
//!
//! Files land in `<out>/<YYYY-MM>/[<category>/]<name>`. Directories are
//! created on demand; creating one that already exists is not an error, so
//! concurrent workers targeting the same month need no locking.

use crate::category::Category;
use crate::error::{Error, Result};
use crate::time::ResolvedDate;
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Build the destination path for a file, creating its directories
pub fn build_destination(
    output_root: &Path,
    date: &ResolvedDate,
    file_name: &OsStr,
    category: Category,
    categorize: bool,
) -> Result<PathBuf> {
    let mut dir = output_root.join(date.month_dir_name());
    ensure_dir(&dir)?;

    if categorize && let Some(folder) = category.folder_name() {
        dir.push(folder);
        ensure_dir(&dir)?;
    }

    Ok(dir.join(file_name))
}

/// Create a single directory, treating an existing directory as success
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => {
            trace!(?path, "Created directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let metadata = fs::metadata(path).map_err(|source| Error::CreateDir {
                path: path.to_path_buf(),
                source,
            })?;
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(Error::NotADirectory {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(source) => Err(Error::CreateDir {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Create the output root and any missing parents
pub fn ensure_output_root(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(Error::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
