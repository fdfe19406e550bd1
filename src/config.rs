//! Configuration types for the media sorter

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension allow-list applied to source directory entries
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum ExtensionFilter {
    /// Accept every file
    #[default]
    All,
    /// Accept only these extensions (lowercase, without leading dot)
    Only(Vec<String>),
}

impl ExtensionFilter {
    /// Parse a comma separated list such as `".jpg,PNG"`.
    ///
    /// `*` anywhere in the list, or an empty list, accepts all files.
    pub fn parse(list: &str) -> Self {
        Self::from_items(list.split(','))
    }

    fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exts = Vec::new();
        for item in items {
            let item = item.as_ref().trim().to_lowercase();
            if item == "*" {
                return ExtensionFilter::All;
            }
            let item = item.trim_start_matches('.');
            if !item.is_empty() && !exts.iter().any(|e| e == item) {
                exts.push(item.to_string());
            }
        }

        if exts.is_empty() {
            ExtensionFilter::All
        } else {
            ExtensionFilter::Only(exts)
        }
    }

    /// Check whether a file name passes the filter.
    ///
    /// The extension is everything after the last dot, so a bare `.jpg`
    /// counts as a jpg file, the same way `classify` sees it.
    pub fn accepts(&self, file_name: &str) -> bool {
        match self {
            ExtensionFilter::All => true,
            ExtensionFilter::Only(exts) => file_name
                .rfind('.')
                .map(|dot| {
                    let ext = file_name[dot + 1..].to_lowercase();
                    exts.iter().any(|e| *e == ext)
                })
                .unwrap_or(false),
        }
    }
}

impl From<Vec<String>> for ExtensionFilter {
    fn from(items: Vec<String>) -> Self {
        Self::from_items(items)
    }
}

impl From<ExtensionFilter> for Vec<String> {
    fn from(filter: ExtensionFilter) -> Self {
        match filter {
            ExtensionFilter::All => vec!["*".to_string()],
            ExtensionFilter::Only(exts) => exts,
        }
    }
}

/// Run-wide configuration, built once and shared read-only by all workers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortConfig {
    /// Flat directory holding the media files to sort
    pub source_dir: PathBuf,

    /// Root of the dated output hierarchy
    pub output_dir: PathBuf,

    /// Extensions to sort
    #[serde(default)]
    pub extensions: ExtensionFilter,

    /// Insert a pictures/videos/gifs layer beneath each month directory
    #[serde(default = "default_categorize")]
    pub categorize: bool,

    /// Number of worker threads (0 = one per available core)
    #[serde(default)]
    pub threads: usize,
}

fn default_categorize() -> bool {
    true
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            extensions: ExtensionFilter::All,
            categorize: true,
            threads: 0,
        }
    }
}

impl SortConfig {
    /// Worker count to use for this run
    pub fn worker_count(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }

    /// Check the startup preconditions on the source directory
    pub fn validate(&self) -> Result<()> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(Error::Config("source directory not specified".into()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config("output directory not specified".into()));
        }
        if !self.source_dir.exists() {
            return Err(Error::SourceMissing {
                path: self.source_dir.clone(),
            });
        }
        if !self.source_dir.is_dir() {
            return Err(Error::NotADirectory {
                path: self.source_dir.clone(),
            });
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: SortConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}
