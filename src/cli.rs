use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Node shapes that can be switched on or off from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeatureArg {
    /// Book creation date (cache.xml, media.xml)
    BookCreationDate,
    /// Bookmark date (cache.xml, media.xml)
    BookmarkDate,
    /// Current reading position (cacheExt.xml)
    CurrentPosition,
    /// Dictionary lookups (cacheExt.xml)
    DictionaryHistory,
    /// Freehand markups (cacheExt.xml)
    FreehandMarkups,
    /// Annotation markups (cacheExt.xml)
    AnnotationMarkups,
    /// Page history (cacheExt.xml)
    History,
    /// Bookmark markups (cacheExt.xml)
    BookmarkMarkups,
}

/// Sony Ebook Reader time profiler
#[derive(Parser, Debug, Clone)]
#[command(name = "reader-timeline")]
#[command(
    about = "Analyzes cache.xml, cacheExt.xml and media.xml found on Sony ebook readers and builds a timeline of reading events"
)]
#[command(version)]
pub struct Cli {
    /// A directory to search for archive files (repeatable)
    #[arg(short = 'p', long = "path", value_name = "DIR", action = clap::ArgAction::Append)]
    pub paths: Vec<PathBuf>,

    /// Only consider books whose path contains this string
    #[arg(short = 's', long = "search", value_name = "STRING")]
    pub search: Option<String>,

    /// Also write a gnuplot data file
    #[arg(short = 'g', long = "gnuplot")]
    pub gnuplot: bool,

    /// Gnuplot data file [default: out.dat]
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable an event kind (repeatable)
    #[arg(long = "enable", value_enum, value_name = "FEATURE", action = clap::ArgAction::Append)]
    pub enable: Vec<FeatureArg>,

    /// Disable an event kind (repeatable)
    #[arg(long = "disable", value_enum, value_name = "FEATURE", action = clap::ArgAction::Append)]
    pub disable: Vec<FeatureArg>,

    /// Abort on the first unparseable date instead of skipping the node
    #[arg(long = "strict-dates")]
    pub strict_dates: bool,

    /// Increase diagnostic output (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default tracing filter for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
