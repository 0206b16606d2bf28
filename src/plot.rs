//! Gnuplot data file export.
//!
//! One line per event: `YYYY-MM-DD-HH:MM:SS <book index> "<description>\n<path>"`,
//! where `\n` is the two literal characters gnuplot turns into a label break.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::event::{BookIndex, EventLog};
use crate::timeline::truncate_path;

pub struct PlotExporter {
    max_book_path_len: usize,
}

impl PlotExporter {
    pub fn new(max_book_path_len: usize) -> Self {
        Self { max_book_path_len }
    }

    /// Writes every event of `log` in timestamp order and returns the book
    /// numbering used.
    pub fn write_to<W: Write>(&self, log: &EventLog, writer: &mut W) -> Result<BookIndex> {
        let books = log.book_index();
        for event in log.sorted() {
            let index = books.index_of(&event.book_path).unwrap_or_default();
            writeln!(
                writer,
                "{} {} \"{}\\n{}\"",
                event.timestamp.plot_format(),
                index,
                event.description,
                truncate_path(&event.book_path, self.max_book_path_len)
            )?;
        }
        writer.flush()?;
        Ok(books)
    }

    pub fn write_file(&self, log: &EventLog, path: &Path) -> Result<BookIndex> {
        let mut writer = BufWriter::new(File::create(path)?);
        let books = self.write_to(log, &mut writer)?;
        tracing::info!(path = %path.display(), events = log.len(), "plot data written");
        Ok(books)
    }
}
