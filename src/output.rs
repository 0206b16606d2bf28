//! Console Output and Reporting
//!
//! This module formats everything the tool prints on stdout: banner,
//! per-file progress, the timeline and the gnuplot legend.

use std::path::Path;

use crate::analyzer::AnalysisProgress;
use crate::event::{BookIndex, Event};
use crate::timeline::{TimelineLine, TimelineRenderer};

/// Simple output formatter for human-readable results
#[derive(Debug, Clone)]
pub struct Output {
    show_colors: bool,
}

impl Output {
    pub fn new() -> Self {
        Self {
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn plain() -> Self {
        Self { show_colors: false }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn banner(&self) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str(&self.colorize("Sony Ebook Reader Time Profiler", "1"));
        output.push_str("\n\n");
        output.push_str("Analyzes files cache.xml, cacheExt.xml and media.xml found in\n");
        output.push_str("Sony Ebook Readers and creates a timeline of the events, on the\n");
        output.push_str("console and in a data file which can be used with GnuPlot.\n");
        output.push('\n');
        output
    }

    pub fn format_progress(&self, progress: &AnalysisProgress) -> Option<String> {
        match progress {
            AnalysisProgress::FileStarted { path, .. } => {
                Some(format!("Analyzing file \"{}\"...", path.display()))
            }
            AnalysisProgress::Searching { filter } => {
                Some(format!("Searching for string \"{}\"", filter))
            }
            AnalysisProgress::BookEntry { path } => Some(format!("- Found book entry: \"{}\"", path)),
            AnalysisProgress::FileFinished { .. } => None,
        }
    }

    pub fn format_timeline<'a>(
        &self,
        renderer: &TimelineRenderer,
        sorted: impl IntoIterator<Item = &'a Event>,
        total: usize,
    ) -> String {
        let mut output = String::new();
        output.push_str(&format!("\nTimeline data found ({} records):\n\n", total));
        for line in renderer.lines(sorted) {
            match line {
                TimelineLine::Header(text) => output.push_str(&self.colorize(&text, "36")),
                TimelineLine::Row(text) => output.push_str(&text),
            }
            output.push('\n');
        }
        output
    }

    pub fn format_legend(&self, plot_file: &Path, books: &BookIndex) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\nWritten to gnuplot data file: {}\n\n",
            plot_file.display()
        ));
        output.push_str("GnuPlot file legend:\n");
        for (index, path) in books.entries() {
            output.push_str(&format!("{}\t{}\n", index, path));
        }
        output
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
