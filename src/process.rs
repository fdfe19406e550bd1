//! Dispatch of source files through the sorting pipeline
//!
//! The source directory is listed once. Every accepted file then runs
//! through resolve → build path → copy → stamp on a dedicated Rayon pool.
//! A failing file is logged and recorded; it never stops the others.

use crate::category::{Category, classify};
use crate::config::SortConfig;
use crate::error::{Error, Result};
use crate::layout;
use crate::source::SourceFile;
use crate::time::{self, ResolvedDate};
use crate::transfer::FileTransfer;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{Level, debug, error, info, span, warn};
use walkdir::WalkDir;

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Destination file path (if a copy was attempted)
    pub destination: Option<PathBuf>,
    /// Resolved date (if resolution ran)
    pub date: Option<ResolvedDate>,
    /// Category derived from the extension (if the file was accepted)
    pub category: Option<Category>,
    /// Processing status
    pub status: ProcessingStatus,
    /// Error message (if failed or left unstamped)
    pub error: Option<String>,
}

impl FileResult {
    fn skipped(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: None,
            date: None,
            category: None,
            status: ProcessingStatus::Skipped,
            error: None,
        }
    }

    fn failed(source: &Path, date: Option<ResolvedDate>, error: &Error) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: None,
            date,
            category: None,
            status: ProcessingStatus::Failed,
            error: Some(error.to_string()),
        }
    }
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Copied and stamped with the resolved date
    Copied,
    /// Copied, but the timestamp could not be applied
    CopiedUnstamped,
    /// Rejected by the extension filter
    Skipped,
    /// Processing failed
    Failed,
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total_files: AtomicUsize,
    pub copied: AtomicUsize,
    pub unstamped: AtomicUsize,
    pub skipped: AtomicUsize,
    pub failed: AtomicUsize,
}

/// Plain copy of the counters, for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_files: usize,
    pub copied: usize,
    pub unstamped: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_files: self.total_files.load(Ordering::Relaxed),
            copied: self.copied.load(Ordering::Relaxed),
            unstamped: self.unstamped.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    pub fn summary(&self) -> String {
        let s = self.snapshot();
        format!(
            "Total: {}, Copied: {}, Unstamped: {}, Skipped: {}, Failed: {}",
            s.total_files, s.copied, s.unstamped, s.skipped, s.failed
        )
    }

    fn record(&self, status: ProcessingStatus) {
        let counter = match status {
            ProcessingStatus::Copied => &self.copied,
            ProcessingStatus::CopiedUnstamped => &self.unstamped,
            ProcessingStatus::Skipped => &self.skipped,
            ProcessingStatus::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// A directory entry captured when the source was listed
#[derive(Debug)]
struct Candidate {
    path: PathBuf,
    snapshot: Result<SourceFile>,
}

/// Sorts one source directory into the dated output hierarchy
#[derive(Debug)]
pub struct Sorter {
    config: SortConfig,
    transfer: FileTransfer,
    stats: Arc<ProcessingStats>,
}

impl Sorter {
    /// Create a sorter using the platform's timestamp stamper
    pub fn new(config: SortConfig) -> Self {
        Self::with_transfer(config, FileTransfer::default())
    }

    /// Create a sorter with an explicit transfer implementation
    pub fn with_transfer(config: SortConfig, transfer: FileTransfer) -> Self {
        Self {
            config,
            transfer,
            stats: Arc::new(ProcessingStats::new()),
        }
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Sort every file of the source directory.
    ///
    /// Fails only if the source directory cannot be listed or the worker
    /// pool cannot be built; per-file problems are reported in the results.
    pub fn run(&self) -> Result<Vec<FileResult>> {
        let _span = span!(Level::INFO, "sorter_run").entered();

        info!(source = %self.config.source_dir.display(), "Listing source directory...");
        let candidates = self.list_source()?;
        info!(count = candidates.len(), "Found files");

        self.stats
            .total_files
            .fetch_add(candidates.len(), Ordering::Relaxed);

        if candidates.is_empty() {
            info!("No files to process");
            return Ok(Vec::new());
        }

        let workers = self.config.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sorter-worker-{i}"))
            .build()?;

        info!(workers, stamper = self.transfer.stamper_name(), "Processing files...");

        let results: Vec<FileResult> = pool.install(|| {
            candidates
                .par_iter()
                .map(|candidate| self.process_candidate(candidate))
                .collect()
        });

        info!("{}", self.stats.summary());
        Ok(results)
    }

    /// Snapshot the direct children of the source directory.
    ///
    /// Subdirectories are left out. Entries that cannot be read become
    /// failed candidates instead of aborting the listing.
    fn list_source(&self) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for entry in WalkDir::new(&self.config.source_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        debug!(path = ?entry.path(), "Skipping directory");
                        continue;
                    }
                    let path = entry.path().to_path_buf();
                    let snapshot = entry
                        .metadata()
                        .map_err(|e| Error::FileInfo {
                            path: path.clone(),
                            message: e.to_string(),
                        })
                        .and_then(|metadata| SourceFile::from_metadata(path.clone(), &metadata));
                    candidates.push(Candidate { path, snapshot });
                }
                Err(e) if e.depth() == 0 => {
                    return Err(Error::ListDir {
                        path: self.config.source_dir.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.config.source_dir.clone());
                    let error = Error::FileInfo {
                        path: path.clone(),
                        message: e.to_string(),
                    };
                    candidates.push(Candidate {
                        path,
                        snapshot: Err(error),
                    });
                }
            }
        }

        Ok(candidates)
    }

    fn process_candidate(&self, candidate: &Candidate) -> FileResult {
        let result = match &candidate.snapshot {
            Ok(file) if !self.config.extensions.accepts(&file.name) => {
                info!(
                    file = %file.name,
                    allowed = ?self.config.extensions,
                    "File does not match allowed extensions, skipping"
                );
                FileResult::skipped(&candidate.path)
            }
            Ok(file) => self.process_file(file),
            Err(e) => {
                error!(path = ?candidate.path, error = %e, "Failed to get file info");
                FileResult::failed(&candidate.path, None, e)
            }
        };

        self.stats.record(result.status);
        result
    }

    /// Run one file through resolve → build path → copy → stamp
    fn process_file(&self, file: &SourceFile) -> FileResult {
        let _file_span = span!(Level::DEBUG, "process_file", file = %file.name).entered();

        // Resolved once; the same value drives the path and the stamp
        let date = time::resolve(file);
        debug!(
            file = %file.name,
            date = %date.timestamp.date(),
            source = ?date.source,
            "Resolved date"
        );

        let category = classify(&file.name);
        let dest = match self.copy_to_destination(file, &date, category) {
            Ok(dest) => dest,
            Err(e) => {
                error!(file = %file.name, error = %e, "Failed to copy file");
                return FileResult {
                    category: Some(category),
                    ..FileResult::failed(&file.path, Some(date), &e)
                };
            }
        };

        let (status, stamp_error) = match self.transfer.stamp(&dest, &date) {
            Ok(()) => (ProcessingStatus::Copied, None),
            Err(e) => {
                warn!(file = %file.name, error = %e, "Failed to preserve original date");
                (ProcessingStatus::CopiedUnstamped, Some(e.to_string()))
            }
        };

        info!(
            source = ?file.path,
            destination = ?dest,
            size = file.size,
            ?category,
            time_source = ?date.source,
            timestamp = %date.timestamp,
            "Processed file"
        );

        FileResult {
            source: file.path.clone(),
            destination: Some(dest),
            date: Some(date),
            category: Some(category),
            status,
            error: stamp_error,
        }
    }

    fn copy_to_destination(
        &self,
        file: &SourceFile,
        date: &ResolvedDate,
        category: Category,
    ) -> Result<PathBuf> {
        let file_name = file.path.file_name().ok_or_else(|| Error::InvalidFileName {
            path: file.path.clone(),
        })?;

        let dest = layout::build_destination(
            &self.config.output_dir,
            date,
            file_name,
            category,
            self.config.categorize,
        )?;

        self.transfer.copy(&file.path, &dest)?;
        Ok(dest)
    }
}

/// JSON report of a finished run
#[derive(Debug, Serialize)]
pub struct SortReport<'a> {
    pub stats: StatsSnapshot,
    pub files: &'a [FileResult],
}

/// Write the per-file results of a run as pretty JSON
pub fn write_report(path: &Path, stats: &ProcessingStats, results: &[FileResult]) -> Result<()> {
    let report = SortReport {
        stats: stats.snapshot(),
        files: results,
    };

    let file = File::create(path).map_err(|e| Error::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionFilter;
    use crate::os::{PortableStamper, TimestampStamper};
    use std::fs;
    use std::io;
    use std::time::SystemTime;
    use tempfile::TempDir;

    struct ReadOnlyStamper;

    impl TimestampStamper for ReadOnlyStamper {
        fn name(&self) -> &'static str {
            "read-only"
        }

        fn stamp(&self, _path: &Path, _time: SystemTime) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn setup() -> (TempDir, SortConfig) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let output = temp.path().join("out");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&output).unwrap();

        let config = SortConfig {
            source_dir: source,
            output_dir: output,
            threads: 2,
            ..SortConfig::default()
        };
        (temp, config)
    }

    fn portable_sorter(config: SortConfig) -> Sorter {
        Sorter::with_transfer(config, FileTransfer::new(Arc::new(PortableStamper)))
    }

    #[test]
    fn test_processing_stats() {
        let stats = ProcessingStats::new();
        stats.copied.fetch_add(5, Ordering::Relaxed);
        stats.skipped.fetch_add(2, Ordering::Relaxed);
        stats.unstamped.fetch_add(1, Ordering::Relaxed);
        stats.failed.fetch_add(1, Ordering::Relaxed);

        let summary = stats.summary();
        assert!(summary.contains("Copied: 5"));
        assert!(summary.contains("Skipped: 2"));
        assert!(summary.contains("Unstamped: 1"));
        assert!(summary.contains("Failed: 1"));
    }

    #[test]
    fn test_run_copies_and_skips_subdirectories() {
        let (_temp, config) = setup();
        fs::write(config.source_dir.join("20230615_143000.jpg"), b"a").unwrap();
        fs::create_dir(config.source_dir.join("nested")).unwrap();
        fs::write(config.source_dir.join("nested").join("20230101.jpg"), b"b").unwrap();

        let sorter = portable_sorter(config.clone());
        let results = sorter.run().unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ProcessingStatus::Copied);
        assert!(
            config
                .output_dir
                .join("2023-06")
                .join("pictures")
                .join("20230615_143000.jpg")
                .is_file()
        );
        assert!(!config.output_dir.join("2023-01").exists());
        assert!(config.source_dir.join("20230615_143000.jpg").exists());
    }

    #[test]
    fn test_extension_filter_skips_files() {
        let (_temp, mut config) = setup();
        config.extensions = ExtensionFilter::parse(".jpg");
        fs::write(config.source_dir.join("20230615.jpg"), b"a").unwrap();
        fs::write(config.source_dir.join("20230615.txt"), b"b").unwrap();

        let sorter = portable_sorter(config.clone());
        let results = sorter.run().unwrap();

        let skipped: Vec<_> = results
            .iter()
            .filter(|r| r.status == ProcessingStatus::Skipped)
            .collect();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].source.ends_with("20230615.txt"));
        assert!(!config.output_dir.join("2023-06").join("20230615.txt").exists());
        assert_eq!(sorter.stats().snapshot().skipped, 1);
        assert_eq!(sorter.stats().snapshot().copied, 1);
    }

    #[test]
    fn test_failed_file_does_not_stop_run() {
        let (_temp, config) = setup();
        fs::write(config.source_dir.join("20230615.jpg"), b"a").unwrap();
        fs::write(config.source_dir.join("20240101.jpg"), b"b").unwrap();
        // A plain file where the 2023-06 month directory should go
        fs::write(config.output_dir.join("2023-06"), b"blocker").unwrap();

        let sorter = portable_sorter(config.clone());
        let results = sorter.run().unwrap();

        let failed = results
            .iter()
            .find(|r| r.source.ends_with("20230615.jpg"))
            .unwrap();
        assert_eq!(failed.status, ProcessingStatus::Failed);
        assert!(failed.error.is_some());

        let ok = results
            .iter()
            .find(|r| r.source.ends_with("20240101.jpg"))
            .unwrap();
        assert_eq!(ok.status, ProcessingStatus::Copied);
        assert!(
            config
                .output_dir
                .join("2024-01")
                .join("pictures")
                .join("20240101.jpg")
                .is_file()
        );
    }

    #[test]
    fn test_stamp_failure_is_reported() {
        let (_temp, config) = setup();
        fs::write(config.source_dir.join("20230615.gif"), b"gif").unwrap();

        let sorter =
            Sorter::with_transfer(config.clone(), FileTransfer::new(Arc::new(ReadOnlyStamper)));
        let results = sorter.run().unwrap();

        assert_eq!(results[0].status, ProcessingStatus::CopiedUnstamped);
        assert!(results[0].error.as_deref().unwrap().contains("denied"));
        assert!(
            config
                .output_dir
                .join("2023-06")
                .join("gifs")
                .join("20230615.gif")
                .is_file()
        );
        assert_eq!(sorter.stats().snapshot().unstamped, 1);
    }

    #[test]
    fn test_missing_source_fails_run() {
        let (temp, mut config) = setup();
        config.source_dir = temp.path().join("does-not-exist");

        let sorter = portable_sorter(config);
        assert!(matches!(sorter.run(), Err(Error::ListDir { .. })));
    }

    #[test]
    fn test_empty_source() {
        let (_temp, config) = setup();
        let sorter = portable_sorter(config);
        assert!(sorter.run().unwrap().is_empty());
        assert_eq!(sorter.stats().snapshot().total_files, 0);
    }

    #[test]
    fn test_write_report() {
        let (temp, config) = setup();
        fs::write(config.source_dir.join("20230615.mp4"), b"video").unwrap();

        let sorter = portable_sorter(config);
        let results = sorter.run().unwrap();

        let report_path = temp.path().join("report.json");
        write_report(&report_path, sorter.stats(), &results).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(json["stats"]["copied"], 1);
        assert_eq!(json["files"][0]["status"], "copied");
        assert_eq!(json["files"][0]["date"]["source"], "Filename");
        assert_eq!(json["files"][0]["category"], "video");
    }

    #[test]
    fn test_write_report_unwritable_path() {
        let (temp, _config) = setup();
        let report_path = temp.path().join("missing").join("report.json");

        let result = write_report(&report_path, &ProcessingStats::new(), &[]);
        match result {
            Err(Error::WriteFile { path, .. }) => assert_eq!(path, report_path),
            other => panic!("expected WriteFile error, got {other:?}"),
        }
    }
}
