//! # reader-timeline Library
//!
//! Extracts reading activity (bookmarks, annotations, dictionary lookups,
//! page history and markups) from the `cache.xml`, `cacheExt.xml` and
//! `media.xml` dumps of Sony ebook readers, and renders it as a single
//! chronological timeline or as a gnuplot data file.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod event;
pub mod extractor;
pub mod output;
pub mod plot;
pub mod timeline;
pub mod xml;

pub use analyzer::{AnalysisProgress, AnalysisResults, Analyzer, ProgressCallback};
pub use cli::{Cli, FeatureArg};
pub use config::{Config, ConfigError, ConfigManager, DisplayConfig, EnvProvider, PlotConfig};
pub use date::Timestamp;
pub use error::ProfilerError;
pub use event::{BookIndex, Event, EventLog};
pub use extractor::{ExtractContext, ExtractObserver, Extraction, Feature, FeatureFlags, Schema};
pub use output::Output;
pub use plot::PlotExporter;
pub use timeline::{TimelineLine, TimelineRenderer};
pub use xml::{Document, Element, XmlNode};
