//! Normalized reading-activity records and the run-scoped accumulator.

use std::collections::HashMap;

use crate::date::Timestamp;

/// One reading-activity occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub timestamp: Timestamp,
    pub description: String,
    /// Empty when the entry had no `path` attribute.
    pub book_path: String,
}

impl Event {
    pub fn new(
        timestamp: Timestamp,
        description: impl Into<String>,
        book_path: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            description: description.into(),
            book_path: book_path.into(),
        }
    }
}

/// Every event found during a run, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Ascending by timestamp; equal timestamps keep insertion order.
    pub fn sorted(&self) -> Vec<&Event> {
        let mut sorted: Vec<&Event> = self.events.iter().collect();
        sorted.sort_by_key(|event| event.timestamp);
        sorted
    }

    pub fn book_index(&self) -> BookIndex {
        BookIndex::from_events(&self.events)
    }
}

impl Extend<Event> for EventLog {
    fn extend<T: IntoIterator<Item = Event>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}

impl FromIterator<Event> for EventLog {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// Stable `1..=n` numbering of the distinct book paths of a run.
///
/// Numbers are handed out on first encounter while scanning the log in
/// insertion order, so identical input always yields identical numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookIndex {
    books: Vec<String>,
    positions: HashMap<String, usize>,
}

impl BookIndex {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut index = Self::default();
        for event in events {
            if !index.positions.contains_key(&event.book_path) {
                index
                    .positions
                    .insert(event.book_path.clone(), index.books.len() + 1);
                index.books.push(event.book_path.clone());
            }
        }
        index
    }

    pub fn index_of(&self, book_path: &str) -> Option<usize> {
        self.positions.get(book_path).copied()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// `(index, path)` pairs in index order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.books
            .iter()
            .enumerate()
            .map(|(i, path)| (i + 1, path.as_str()))
    }
}
