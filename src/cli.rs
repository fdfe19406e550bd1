//! CLI argument parsing with clap

use crate::config::{ExtensionFilter, SortConfig};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Media Sorter - sort a flat media directory into dated folders
///
/// Copies every file of the source directory into `<out>/YYYY-MM/`,
/// optionally split into pictures/videos/gifs, using the date the file
/// was taken (EXIF, file name, or file system time).
#[derive(Parser, Debug)]
#[command(name = "media-sorter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source directory holding the files to sort
    #[arg(long, env = "MEDIA_SORTER_SOURCE")]
    pub source: Option<PathBuf>,

    /// Output directory (created if absent)
    #[arg(long, env = "MEDIA_SORTER_OUT")]
    pub out: Option<PathBuf>,

    /// File extensions to sort, comma separated (".jpg,.png"). Empty or '*' sorts all files
    #[arg(long)]
    pub ext: Option<String>,

    /// Sort files into category folders (pictures, videos, gifs). A bare `--categories` means true
    #[arg(
        long,
        action = ArgAction::Set,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub categories: Option<bool>,

    /// Path to configuration file (TOML format)
    ///
    /// Settings from the file are used as defaults; CLI arguments override them.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Number of worker threads (0 = one per core)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Write a JSON report of every processed file to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: SortConfig) -> SortConfig {
        if let Some(ref source) = self.source {
            config.source_dir = source.clone();
        }
        if let Some(ref out) = self.out {
            config.output_dir = out.clone();
        }
        if let Some(ref ext) = self.ext {
            config.extensions = ExtensionFilter::parse(ext);
        }
        if let Some(categories) = self.categories {
            config.categorize = categories;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }

        config
    }

    /// Convert CLI arguments to SortConfig (when no config file is used)
    pub fn to_config(&self) -> SortConfig {
        self.merge_with_config(SortConfig::default())
    }
}
