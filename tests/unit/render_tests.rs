use std::fs;

use reader_timeline::{
    DisplayConfig, Event, EventLog, PlotExporter, TimelineLine, TimelineRenderer, Timestamp,
};
use tempfile::TempDir;

fn event(date: &str, description: &str, path: &str) -> Event {
    Event::new(Timestamp::parse(date).unwrap(), description, path)
}

fn sample_log() -> EventLog {
    vec![
        event("Thu, 01 Feb 2024 08:00:00 GMT", "Bookmark date", "/Data/books/The Lord of the Rings.epub"),
        event("Mon, 01 Jan 2024 10:00:00 GMT", "Reading page 5 of 200 (offset 0)", "/book1.epub"),
        event("Wed, 31 Jan 2024 23:59:59 GMT", "Bookmark markup at page 7 of 200 (offset 0)", ""),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_headers_track_sorted_months() {
    let log = sample_log();
    let renderer = TimelineRenderer::new(&DisplayConfig::default());
    let lines = renderer.lines(log.sorted());

    let kinds: Vec<_> = lines
        .iter()
        .map(|line| match line {
            TimelineLine::Header(text) => text[..13].to_string(),
            TimelineLine::Row(_) => "row".to_string(),
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["###### 1/2024", "row", "row", "###### 2/2024", "row"]
    );
}

#[test]
fn test_default_truncation() {
    let log = sample_log();
    let rendered = TimelineRenderer::new(&DisplayConfig::default()).render(log.sorted());
    assert!(rendered.contains("of book /Data/books/The Lord of the Ri..."));
    assert!(rendered.contains("2024-01-31 23:59:59\tBookmark markup at page 7 of 200 (offset 0) of book \n"));
}

#[test]
fn test_plot_file_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.dat");
    let log = sample_log();

    let books = PlotExporter::new(30).write_file(&log, &path).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = written.lines().collect();

    assert_eq!(
        lines,
        vec![
            "2024-01-01-10:00:00 2 \"Reading page 5 of 200 (offset 0)\\n/book1.epub\"",
            "2024-01-31-23:59:59 3 \"Bookmark markup at page 7 of 200 (offset 0)\\n\"",
            "2024-02-01-08:00:00 1 \"Bookmark date\\n/Data/books/The Lord of the Ri...\"",
        ]
    );
    let legend: Vec<_> = books.entries().collect();
    assert_eq!(
        legend,
        vec![
            (1, "/Data/books/The Lord of the Rings.epub"),
            (2, "/book1.epub"),
            (3, ""),
        ]
    );
}
