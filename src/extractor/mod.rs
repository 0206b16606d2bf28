//! Per-schema extraction of reading events.
//!
//! The device keeps three differently shaped XML files per storage root.
//! Each [`Schema`] knows which file it reads, which container element it
//! requires, and how to turn the book entries below that container into
//! [`Event`]s. Missing containers are structural errors and abort the run;
//! incomplete nodes are skipped silently.

mod cache;
mod cache_ext;
mod media;

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};

use crate::date::Timestamp;
use crate::error::{ProfilerError, Result};
use crate::event::Event;
use crate::xml::{Document, XmlNode};

/// One toggleable node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    BookCreationDate,
    BookmarkDate,
    CurrentPosition,
    DictionaryHistory,
    FreehandMarkups,
    AnnotationMarkups,
    History,
    BookmarkMarkups,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::BookCreationDate,
        Feature::BookmarkDate,
        Feature::CurrentPosition,
        Feature::DictionaryHistory,
        Feature::FreehandMarkups,
        Feature::AnnotationMarkups,
        Feature::History,
        Feature::BookmarkMarkups,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::BookCreationDate => "book-creation-date",
            Feature::BookmarkDate => "bookmark-date",
            Feature::CurrentPosition => "current-position",
            Feature::DictionaryHistory => "dictionary-history",
            Feature::FreehandMarkups => "freehand-markups",
            Feature::AnnotationMarkups => "annotation-markups",
            Feature::History => "history",
            Feature::BookmarkMarkups => "bookmark-markups",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-").to_lowercase();
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == wanted)
            .ok_or_else(|| format!("unknown feature: {}", s))
    }
}

/// Which node shapes contribute events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub book_creation_date: bool,
    pub bookmark_date: bool,
    pub current_position: bool,
    pub dictionary_history: bool,
    pub freehand_markups: bool,
    pub annotation_markups: bool,
    pub history: bool,
    pub bookmark_markups: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            book_creation_date: false,
            bookmark_date: true,
            current_position: true,
            dictionary_history: true,
            freehand_markups: true,
            annotation_markups: true,
            history: true,
            bookmark_markups: true,
        }
    }
}

impl FeatureFlags {
    pub fn none() -> Self {
        Self::only([])
    }

    pub fn all() -> Self {
        Self::only(Feature::ALL)
    }

    /// Exactly the given features enabled.
    pub fn only(features: impl IntoIterator<Item = Feature>) -> Self {
        let mut flags = Self {
            book_creation_date: false,
            bookmark_date: false,
            current_position: false,
            dictionary_history: false,
            freehand_markups: false,
            annotation_markups: false,
            history: false,
            bookmark_markups: false,
        };
        for feature in features {
            flags.set(feature, true);
        }
        flags
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::BookCreationDate => self.book_creation_date,
            Feature::BookmarkDate => self.bookmark_date,
            Feature::CurrentPosition => self.current_position,
            Feature::DictionaryHistory => self.dictionary_history,
            Feature::FreehandMarkups => self.freehand_markups,
            Feature::AnnotationMarkups => self.annotation_markups,
            Feature::History => self.history,
            Feature::BookmarkMarkups => self.bookmark_markups,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        let flag = match feature {
            Feature::BookCreationDate => &mut self.book_creation_date,
            Feature::BookmarkDate => &mut self.bookmark_date,
            Feature::CurrentPosition => &mut self.current_position,
            Feature::DictionaryHistory => &mut self.dictionary_history,
            Feature::FreehandMarkups => &mut self.freehand_markups,
            Feature::AnnotationMarkups => &mut self.annotation_markups,
            Feature::History => &mut self.history,
            Feature::BookmarkMarkups => &mut self.bookmark_markups,
        };
        *flag = enabled;
    }
}

/// Immutable settings shared by every extractor invocation of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractContext {
    pub features: FeatureFlags,
    /// Substring required in an entry's `path`; empty means no filtering.
    pub search: String,
    /// Abort on unparseable dates instead of skipping the node.
    pub strict_dates: bool,
}

impl ExtractContext {
    pub fn new(features: FeatureFlags) -> Self {
        Self {
            features,
            ..Default::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_strict_dates(mut self, strict: bool) -> Self {
        self.strict_dates = strict;
        self
    }

    fn accepts(&self, path: &str) -> bool {
        self.search.is_empty() || path.contains(self.search.as_str())
    }
}

/// Output of one extractor over one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Paths of the book entries that passed the search filter.
    pub entries: Vec<String>,
    pub events: Vec<Event>,
    /// Nodes dropped because their date could not be parsed.
    pub skipped_dates: usize,
}

impl Extraction {
    /// Records an event unless the date is unusable under the run's policy.
    fn record(
        &mut self,
        ctx: &ExtractContext,
        raw_date: &str,
        path: &str,
        description: impl FnOnce() -> Result<String>,
    ) -> Result<()> {
        let timestamp = match Timestamp::parse(raw_date) {
            Ok(timestamp) => timestamp,
            Err(err) if ctx.strict_dates => return Err(err),
            Err(err) => {
                tracing::warn!(book = path, "skipping node: {}", err);
                self.skipped_dates += 1;
                return Ok(());
            }
        };
        self.events.push(Event::new(timestamp, description()?, path));
        Ok(())
    }
}

/// Told about progress while an extractor walks a document, so callers can
/// report entries before the file is finished (or fails).
pub trait ExtractObserver {
    /// The required container exists; entries follow.
    fn container_found(&mut self) {}

    /// An entry passed the search filter and is about to be read.
    fn entry_found(&mut self, _path: &str) {}
}

impl ExtractObserver for () {}

/// Iterates the book entries of `container` that pass the search filter,
/// announcing each accepted path to `observer` as it is reached.
fn book_entries<'a, N: XmlNode>(
    container: &'a N,
    entry_tag: &'a str,
    ctx: &'a ExtractContext,
    observer: &'a mut dyn ExtractObserver,
) -> impl Iterator<Item = (&'a N, String)> {
    container
        .element_children()
        .filter(move |node| node.name() == entry_tag)
        .filter_map(move |node| {
            let path = node.attribute("path").unwrap_or_default().to_string();
            if ctx.accepts(&path) {
                observer.entry_found(&path);
                Some((node, path))
            } else {
                tracing::debug!(book = %path, "entry filtered out");
                None
            }
        })
}

/// Standard alphabet, padded, but accepting non-zero trailing bits the
/// firmware sometimes leaves in the last symbol.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decodes a base64 payload embedded as element text.
fn decode_payload(text: &str) -> Result<String> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = PAYLOAD_ENGINE
        .decode(compact.as_bytes())
        .map_err(|source| ProfilerError::InvalidBase64 {
            value: text.to_string(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// The three metadata files found on a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    /// `cache.xml`
    Cache,
    /// `cacheExt.xml`
    CacheExt,
    /// `media.xml`
    Media,
}

impl Schema {
    /// Order in which the files of one directory are analyzed.
    pub const PROCESSING_ORDER: [Schema; 3] = [Schema::Cache, Schema::CacheExt, Schema::Media];

    pub fn file_name(self) -> &'static str {
        match self {
            Schema::Cache => "cache.xml",
            Schema::CacheExt => "cacheExt.xml",
            Schema::Media => "media.xml",
        }
    }

    pub fn extract(self, document: &Document, ctx: &ExtractContext) -> Result<Extraction> {
        self.extract_observed(document, ctx, &mut ())
    }

    /// Like [`Schema::extract`], reporting the container and each accepted
    /// entry to `observer` as they are reached.
    pub fn extract_observed(
        self,
        document: &Document,
        ctx: &ExtractContext,
        observer: &mut dyn ExtractObserver,
    ) -> Result<Extraction> {
        let container = match self {
            Schema::Cache => document.require_element("cache")?,
            Schema::CacheExt => document.require_element("cacheExt")?,
            Schema::Media => document
                .require_element("xdbLite")?
                .find_descendant("records")
                .ok_or_else(|| ProfilerError::structural(document.path(), "records"))?,
        };
        observer.container_found();

        match self {
            Schema::Cache => cache::extract(container, ctx, observer),
            Schema::CacheExt => cache_ext::extract(container, ctx, observer),
            Schema::Media => media::extract(container, ctx, observer),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
