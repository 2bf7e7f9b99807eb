//! Annotation of rendered pages on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;

use crate::error::SiteError;
use crate::pipeline::{AnnotateStats, Annotator};

/// Class prefix that every annotatable page contains.
const LANGUAGE_MARKER: &str = "language-";

/// Totals for a processing run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SiteStats {
    /// HTML files examined.
    pub files_scanned: usize,
    /// Files whose content changed (written unless dry run).
    pub files_changed: usize,
    /// Files that could not be read, parsed or written.
    pub files_failed: usize,
    /// Blocks that received a link.
    pub blocks_annotated: usize,
    /// Blocks skipped.
    pub blocks_skipped: usize,
    /// Include references turned into links.
    pub includes_rewritten: usize,
    /// Tooltips whose margin was set.
    pub tooltips_centered: usize,
    /// Declared language tags without a profile, sorted.
    pub unsupported_languages: Vec<String>,
}

/// Annotates HTML files in place.
pub struct SiteProcessor {
    annotator: Annotator,
    dry_run: bool,
}

impl SiteProcessor {
    /// Create a processor using the given annotator.
    #[must_use]
    pub fn new(annotator: Annotator) -> Self {
        Self {
            annotator,
            dry_run: false,
        }
    }

    /// Compute changes without writing files.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process files and directories.
    ///
    /// Directories are searched recursively for `.html` files; explicitly
    /// named files are processed whatever their extension. Failures on single
    /// files are logged and counted, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if an input path does not exist or a directory
    /// cannot be listed.
    pub fn process(&self, inputs: &[PathBuf]) -> Result<SiteStats, SiteError> {
        let files = collect_html_files(inputs)?;
        tracing::info!(files = files.len(), dry_run = self.dry_run, "Annotating pages");

        let files_changed = AtomicUsize::new(0);
        let files_failed = AtomicUsize::new(0);
        let blocks_annotated = AtomicUsize::new(0);
        let blocks_skipped = AtomicUsize::new(0);
        let includes_rewritten = AtomicUsize::new(0);
        let tooltips_centered = AtomicUsize::new(0);
        let unsupported = Mutex::new(Vec::<String>::new());

        files.par_iter().for_each(|path| match self.process_file(path) {
            Ok((changed, stats)) => {
                if changed {
                    files_changed.fetch_add(1, Ordering::Relaxed);
                }
                blocks_annotated.fetch_add(stats.blocks_annotated, Ordering::Relaxed);
                blocks_skipped.fetch_add(stats.blocks_skipped, Ordering::Relaxed);
                includes_rewritten.fetch_add(stats.includes_rewritten, Ordering::Relaxed);
                tooltips_centered.fetch_add(stats.tooltips_centered, Ordering::Relaxed);

                if !stats.unsupported_languages.is_empty() {
                    let mut langs = unsupported.lock().unwrap_or_else(PoisonError::into_inner);
                    for lang in stats.unsupported_languages {
                        if !langs.contains(&lang) {
                            langs.push(lang);
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to annotate page");
                files_failed.fetch_add(1, Ordering::Relaxed);
            }
        });

        let mut unsupported_languages =
            unsupported.into_inner().unwrap_or_else(PoisonError::into_inner);
        unsupported_languages.sort();

        Ok(SiteStats {
            files_scanned: files.len(),
            files_changed: files_changed.into_inner(),
            files_failed: files_failed.into_inner(),
            blocks_annotated: blocks_annotated.into_inner(),
            blocks_skipped: blocks_skipped.into_inner(),
            includes_rewritten: includes_rewritten.into_inner(),
            tooltips_centered: tooltips_centered.into_inner(),
            unsupported_languages,
        })
    }

    /// Annotate one file, writing it back if a block was annotated or an
    /// include rewritten.
    fn process_file(
        &self,
        path: &Path,
    ) -> Result<(bool, AnnotateStats), Box<dyn std::error::Error + Send + Sync>> {
        let html = fs::read_to_string(path)?;

        // Quick check: skip pages without any declared language
        if !html.contains(LANGUAGE_MARKER) {
            return Ok((false, AnnotateStats::default()));
        }

        let (output, stats) = self.annotator.annotate_html(&html)?;
        let changed = stats.changed();
        if changed {
            tracing::info!(path = %path.display(), blocks = stats.blocks_annotated, "Annotated page");
            if !self.dry_run {
                fs::write(path, output)?;
            }
        }
        Ok((changed, stats))
    }
}

/// Expand inputs into a sorted, deduplicated list of files.
fn collect_html_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, SiteError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            walk_dir(input, &mut files)?;
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(SiteError::NotFound(input.clone()));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Recursively collect `.html` files, skipping hidden entries.
fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), SiteError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        if path.is_dir() {
            walk_dir(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            files.push(path);
        }
    }
    Ok(())
}
