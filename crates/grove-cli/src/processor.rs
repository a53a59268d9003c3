//! Normalizes every HTML page of a built site.

use crate::html::{TransformError, TransformResult, transform_html};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Options for the processor.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Input directory containing the built site.
    pub input_dir: PathBuf,
    /// Output directory (if None, modifies in place). Must not overlap the
    /// input directory.
    pub output_dir: Option<PathBuf>,
    /// CSS selector for code blocks.
    pub selector: String,
    /// Whether to show verbose output.
    pub verbose: bool,
}

/// Statistics from processing.
#[derive(Debug, Default)]
pub struct ProcessorStats {
    /// Number of HTML files read.
    pub files_processed: usize,
    /// Number of HTML files written back.
    pub files_changed: usize,
    /// Number of code blocks found.
    pub blocks_seen: usize,
    /// Number of code blocks rewritten.
    pub blocks_rewritten: usize,
    /// Number of code blocks left alone because they contain markup.
    pub blocks_skipped: usize,
    /// Number of files that failed.
    pub files_failed: usize,
    /// Time spent on the HTML files (excludes copy time).
    pub process_duration: Duration,
}

/// Processor for a site directory.
pub struct Processor {
    options: ProcessOptions,
}

impl Processor {
    pub fn new(options: ProcessOptions) -> Self {
        Self { options }
    }

    /// Process the site directory.
    pub fn process(&self) -> Result<ProcessorStats, ProcessError> {
        if !self.options.input_dir.is_dir() {
            return Err(ProcessError::NotADirectory(self.options.input_dir.clone()));
        }

        let output_dir = self
            .options
            .output_dir
            .as_ref()
            .unwrap_or(&self.options.input_dir);

        if let Some(out) = &self.options.output_dir {
            let input = self.options.input_dir.canonicalize()?;
            let output = resolve(out)?;
            if input.starts_with(&output) || output.starts_with(&input) {
                return Err(ProcessError::OverlappingOutput { input, output });
            }

            if out.exists() {
                fs::remove_dir_all(out)?;
            }

            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message("Copying site...");
            spinner.enable_steady_tick(Duration::from_millis(80));

            copy_tree(&self.options.input_dir, out)?;

            spinner.finish_and_clear();
        }

        let html_files: Vec<PathBuf> = WalkDir::new(output_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
            .map(|e| e.into_path())
            .collect();
        tracing::debug!(files = html_files.len(), dir = %output_dir.display(), "collected pages");

        let progress = ProgressBar::new(html_files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .map(|style| style.progress_chars("█▉▊▋▌▍▎▏  "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);

        let process_start = Instant::now();

        let files_processed = AtomicUsize::new(0);
        let files_changed = AtomicUsize::new(0);
        let files_failed = AtomicUsize::new(0);
        let blocks_seen = AtomicUsize::new(0);
        let blocks_rewritten = AtomicUsize::new(0);
        let blocks_skipped = AtomicUsize::new(0);

        let verbose = self.options.verbose;
        let selector = self.options.selector.as_str();

        html_files.par_iter().for_each(|path| {
            if verbose {
                progress.println(format!("Processing: {}", path.display()));
            }

            match process_file(path, selector) {
                Ok((result, changed)) => {
                    files_processed.fetch_add(1, Ordering::Relaxed);
                    if changed {
                        files_changed.fetch_add(1, Ordering::Relaxed);
                    }
                    blocks_seen.fetch_add(result.blocks_seen, Ordering::Relaxed);
                    blocks_rewritten.fetch_add(result.blocks_rewritten, Ordering::Relaxed);
                    blocks_skipped.fetch_add(result.blocks_skipped, Ordering::Relaxed);
                }
                Err(e) => {
                    files_failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(path = %path.display(), error = %e, "failed to process page");
                }
            }
            progress.inc(1);
        });

        let process_duration = process_start.elapsed();
        progress.finish_and_clear();

        Ok(ProcessorStats {
            files_processed: files_processed.load(Ordering::Relaxed),
            files_changed: files_changed.load(Ordering::Relaxed),
            blocks_seen: blocks_seen.load(Ordering::Relaxed),
            blocks_rewritten: blocks_rewritten.load(Ordering::Relaxed),
            blocks_skipped: blocks_skipped.load(Ordering::Relaxed),
            files_failed: files_failed.load(Ordering::Relaxed),
            process_duration,
        })
    }
}

/// Normalize one page in place. Returns whether the file was written.
fn process_file(path: &Path, selector: &str) -> Result<(TransformResult, bool), ProcessError> {
    let html = fs::read_to_string(path)?;

    // Most pages of a forest have no code at all.
    if !html.contains("<code") {
        return Ok((TransformResult::default(), false));
    }

    let (transformed, result) = transform_html(&html, selector)?;
    if result.blocks_rewritten == 0 {
        return Ok((result, false));
    }

    fs::write(path, &transformed)?;
    Ok((result, true))
}

/// Absolute form of `path` with symlinks resolved, for a path that may not
/// exist yet.
fn resolve(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                resolved.extend(missing.iter().rev());
                return Ok(resolved);
            }
            Err(e) => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(e);
                };
                missing.push(name);
                existing = parent;
            }
        }
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), ProcessError> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| ProcessError::Io(std::io::Error::other(e.to_string())))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| ProcessError::Io(std::io::Error::other(e.to_string())))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Errors that can occur during processing.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("output directory {} overlaps input directory {}", .output.display(), .input.display())]
    OverlappingOutput { input: PathBuf, output: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),
}
