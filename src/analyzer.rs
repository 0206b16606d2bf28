//! Analysis driver
//!
//! Walks the requested storage roots, runs the matching extractor over each
//! metadata file present and accumulates every event in one [`EventLog`].
//! Any structural, XML, date (strict mode) or payload error aborts the whole
//! analysis; nothing partial is returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::event::EventLog;
use crate::extractor::{ExtractContext, ExtractObserver, Extraction, Schema};
use crate::xml::Document;

/// Progress update emitted while analyzing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisProgress {
    /// A metadata file is about to be parsed
    FileStarted { path: PathBuf, schema: Schema },
    /// A search filter is active for the current file
    Searching { filter: String },
    /// A book entry passed the filter
    BookEntry { path: String },
    /// A file was fully processed
    FileFinished { path: PathBuf, events: usize },
}

/// Progress callback type
pub type ProgressCallback = Arc<dyn Fn(AnalysisProgress) + Send + Sync>;

/// Everything gathered over one run
#[derive(Debug, Clone, Default)]
pub struct AnalysisResults {
    pub events: EventLog,
    pub files_analyzed: Vec<PathBuf>,
    pub entries_found: usize,
    pub skipped_dates: usize,
}

pub struct Analyzer {
    ctx: ExtractContext,
}

impl Analyzer {
    pub fn new(ctx: ExtractContext) -> Self {
        Self { ctx }
    }

    /// Analyze every directory in order.
    pub fn analyze_dirs(
        &self,
        dirs: &[PathBuf],
        progress: Option<ProgressCallback>,
    ) -> Result<AnalysisResults> {
        let mut results = AnalysisResults::default();
        for dir in dirs {
            self.analyze_dir(dir, &mut results, progress.as_ref())?;
        }
        tracing::info!(
            files = results.files_analyzed.len(),
            events = results.events.len(),
            "analysis complete"
        );
        Ok(results)
    }

    /// Analyze `cache.xml`, `cacheExt.xml` and `media.xml` in `dir`, in that
    /// order, skipping the ones that do not exist.
    pub fn analyze_dir(
        &self,
        dir: &Path,
        results: &mut AnalysisResults,
        progress: Option<&ProgressCallback>,
    ) -> Result<()> {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "not a directory, skipping");
            return Ok(());
        }

        for schema in Schema::PROCESSING_ORDER {
            let path = dir.join(schema.file_name());
            if !path.is_file() {
                tracing::debug!(path = %path.display(), "not present");
                continue;
            }

            if let Some(callback) = progress {
                callback(AnalysisProgress::FileStarted {
                    path: path.clone(),
                    schema,
                });
            }

            let mut reporter = ProgressReporter {
                callback: progress,
                search: &self.ctx.search,
            };
            let extraction = self.analyze_file(schema, &path, &mut reporter)?;

            if let Some(callback) = progress {
                callback(AnalysisProgress::FileFinished {
                    path: path.clone(),
                    events: extraction.events.len(),
                });
            }

            results.entries_found += extraction.entries.len();
            results.skipped_dates += extraction.skipped_dates;
            results.events.extend(extraction.events);
            results.files_analyzed.push(path);
        }

        Ok(())
    }

    /// Parse one file and run its extractor.
    pub fn analyze_file(
        &self,
        schema: Schema,
        path: &Path,
        observer: &mut dyn ExtractObserver,
    ) -> Result<Extraction> {
        tracing::info!(path = %path.display(), %schema, "analyzing file");
        let document = Document::from_file(path)?;
        schema.extract_observed(&document, &self.ctx, observer)
    }
}

/// Forwards extractor progress to the caller's callback as it happens.
struct ProgressReporter<'a> {
    callback: Option<&'a ProgressCallback>,
    search: &'a str,
}

impl ExtractObserver for ProgressReporter<'_> {
    fn container_found(&mut self) {
        if let Some(callback) = self.callback
            && !self.search.is_empty()
        {
            callback(AnalysisProgress::Searching {
                filter: self.search.to_string(),
            });
        }
    }

    fn entry_found(&mut self, path: &str) {
        if let Some(callback) = self.callback {
            callback(AnalysisProgress::BookEntry {
                path: path.to_string(),
            });
        }
    }
}
