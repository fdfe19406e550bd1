//! Media Sorter - sort a flat media directory into dated folders
//!
//! Copies each file of a source directory into `<out>/YYYY-MM/[category/]`
//! using the date it was taken, resolved from EXIF data, the file name or
//! file system timestamps.

use anyhow::{Context, Result};
use clap::Parser;
use media_sorter::{Cli, FileResult, ProcessingStatus, SortConfig, Sorter, layout, write_report};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colored summary output for the command line.

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let padding = 60usize.saturating_sub(title.len()) / 2;
        let _ = stdout().execute(Print(" ".repeat(padding)));
        let _ = stdout().execute(Print(style(title).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_stat(key: &str, value: &str, color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value).with(color).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print one result line: icon, source, and destination or message
    pub fn print_result(status_icon: &str, status_color: Color, source: &str, detail: &str) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(status_icon).with(status_color).bold()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(source).italic()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(detail).with(CliTheme::HINT)));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Media Sorter starting");

    let config = load_config(&cli)?;
    if cli.verbose {
        info!(?config, "Configuration loaded");
    }

    // Fatal preconditions: nothing is copied unless both hold.
    // Return instead of process::exit so `_guard` flushes the log file.
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid source directory");
        return Err(e).context("invalid source directory");
    }
    if let Err(e) = layout::ensure_output_root(&config.output_dir) {
        error!(error = %e, "Failed to create output directory");
        return Err(e).context("cannot use output directory");
    }

    let sorter = Sorter::new(config);
    let results = match sorter.run() {
        Ok(results) => results,
        Err(e) => {
            error!(error = %e, "Sorting failed");
            return Err(e).context("sorting failed");
        }
    };

    print_summary(&sorter, &results, cli.verbose);

    if let Some(ref report_path) = cli.report {
        write_report(report_path, sorter.stats(), &results)
            .with_context(|| format!("failed to write report {}", report_path.display()))?;
        info!(report = %report_path.display(), "Report written");
    }

    Ok(())
}

/// Print run statistics and, when verbose, one line per file
fn print_summary(sorter: &Sorter, results: &[FileResult], verbose: bool) {
    use cli_output::*;

    let stats = sorter.stats().snapshot();

    print_separator();
    print_title("Sorting complete");
    print_separator();
    print_blank();
    print_stat("Copied", &stats.copied.to_string(), CliTheme::SUCCESS);
    print_stat("Copied without date", &stats.unstamped.to_string(), CliTheme::WARNING);
    print_stat("Skipped", &stats.skipped.to_string(), CliTheme::ACCENT);
    print_stat("Failed", &stats.failed.to_string(), CliTheme::ERROR);
    print_blank();

    if verbose {
        print_separator();
        for result in results {
            let source = result.source.display().to_string();
            let dest = result
                .destination
                .as_ref()
                .map(|p| format!("→ {}", p.display()))
                .unwrap_or_default();
            match result.status {
                ProcessingStatus::Copied => print_result("✓", CliTheme::SUCCESS, &source, &dest),
                ProcessingStatus::CopiedUnstamped => {
                    print_result("!", CliTheme::WARNING, &source, &dest)
                }
                ProcessingStatus::Skipped => {
                    print_result("⊘", CliTheme::ACCENT, &source, "extension not allowed")
                }
                ProcessingStatus::Failed => {}
            }
        }
    }

    let failed: Vec<_> = results
        .iter()
        .filter(|r| r.status == ProcessingStatus::Failed)
        .collect();

    if !failed.is_empty() {
        print_separator();
        print_error(&format!("Failed files: {}", failed.len()));
        for result in failed {
            print_result(
                "✗",
                CliTheme::ERROR,
                &result.source.display().to_string(),
                result.error.as_deref().unwrap_or("unknown error"),
            );
        }
    }
}

/// Resolve config path - `sorter` finds `sorter.toml`
fn resolve_config_path(config_path: &Path) -> PathBuf {
    if config_path.exists() || config_path.extension().is_some() {
        return config_path.to_path_buf();
    }
    config_path.with_extension("toml")
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<SortConfig> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(config_path);
        info!(config_file = %resolved_path.display(), "Loading configuration from file");
        let file_config = SortConfig::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    if config.source_dir.as_os_str().is_empty() {
        anyhow::bail!("source directory not specified (use --source)");
    }
    if config.output_dir.as_os_str().is_empty() {
        anyhow::bail!("output directory not specified (use --out)");
    }

    Ok(config)
}

/// Setup logging: stderr always, plus an optional log file
fn setup_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let Some(ref log_path) = cli.log_file else {
        if cli.json_log {
            subscriber
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            subscriber
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        return Ok(None);
    };

    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(Some(guard))
}
