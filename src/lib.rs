//! Media Sorter - sort a flat media directory into dated folders
//!
//! This library provides the pieces of a one-shot sorting run:
//! - Extension based classification into pictures, videos and gifs
//! - Date resolution from EXIF metadata, file names and file system times
//! - `YYYY-MM/[category/]` destination layout with race tolerant directory creation
//! - Copying with the resolved date stamped onto the copy
//! - Parallel dispatch with Rayon

pub mod category;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod os;
pub mod process;
pub mod source;
pub mod time;
pub mod transfer;

pub use category::{Category, classify};
pub use cli::Cli;
pub use config::{ConfigError, ExtensionFilter, SortConfig};
pub use error::{Error, Result};
pub use os::{PortableStamper, TimestampStamper, platform_stamper};
pub use process::{FileResult, ProcessingStats, ProcessingStatus, Sorter, write_report};
pub use source::SourceFile;
pub use time::{ResolvedDate, TimeSource, resolve};
pub use transfer::FileTransfer;
