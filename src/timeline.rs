//! Console timeline: events by month, long rows split at a fixed width.

use std::fmt::Write as _;

use crate::config::DisplayConfig;
use crate::event::Event;

/// Cuts `path` to `max_len` characters plus `...`; 0 disables truncation.
pub fn truncate_path(path: &str, max_len: usize) -> String {
    if max_len > 0 && path.chars().count() > max_len {
        let head: String = path.chars().take(max_len).collect();
        format!("{}...", head)
    } else {
        path.to_string()
    }
}

/// Splits `text` into consecutive chunks of at most `width` characters.
pub fn split_len(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

pub fn month_header(month: u32, year: i32) -> String {
    format!(
        "###### {}/{} ###############################################################",
        month, year
    )
}

/// One rendered timeline line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineLine {
    Header(String),
    Row(String),
}

pub struct TimelineRenderer {
    max_book_path_len: usize,
    max_row_width: usize,
}

impl TimelineRenderer {
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            max_book_path_len: display.max_book_path_len,
            max_row_width: display.max_row_width,
        }
    }

    /// `sorted` must already be in timestamp order.
    pub fn lines<'a>(&self, sorted: impl IntoIterator<Item = &'a Event>) -> Vec<TimelineLine> {
        let mut lines = Vec::new();
        let mut current = None;

        for event in sorted {
            let (year, month) = event.timestamp.year_month();
            if current != Some((year, month)) {
                current = Some((year, month));
                lines.push(TimelineLine::Header(month_header(month, year)));
            }

            let text = format!(
                "{} of book {}",
                event.description,
                truncate_path(&event.book_path, self.max_book_path_len)
            );

            if self.max_row_width == 0 {
                lines.push(TimelineLine::Row(format!("{}\t{}", event.timestamp, text)));
                continue;
            }
            for (i, row) in split_len(&text, self.max_row_width).into_iter().enumerate() {
                let line = if i == 0 {
                    format!("{}\t{}", event.timestamp, row)
                } else {
                    format!("\t\t\t  {}", row)
                };
                lines.push(TimelineLine::Row(line));
            }
        }

        lines
    }

    pub fn render<'a>(&self, sorted: impl IntoIterator<Item = &'a Event>) -> String {
        let mut out = String::new();
        for line in self.lines(sorted) {
            let (TimelineLine::Header(text) | TimelineLine::Row(text)) = line;
            let _ = writeln!(out, "{}", text);
        }
        out
    }
}
