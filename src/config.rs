use crate::cli::{Cli, FeatureArg};
use crate::extractor::{ExtractContext, Feature, FeatureFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub features: FeatureFlags,
    pub display: DisplayConfig,
    pub plot: PlotConfig,
    pub dates: DateConfig,
    pub search: SearchConfig,
}

/// Console timeline layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Book paths longer than this are cut and suffixed with `...` (0 = never)
    pub max_book_path_len: usize,
    /// Timeline rows are split every this many characters (0 = never)
    pub max_row_width: usize,
}

/// Gnuplot data file export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlotConfig {
    pub enabled: bool,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DateConfig {
    /// Abort the run on the first unparseable date
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// Substring required in book paths (empty = everything)
    pub filter: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_book_path_len: 30,
            max_row_width: 110,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output: PathBuf::from("out.dat"),
        }
    }
}

impl Config {
    /// Extraction settings for one run.
    pub fn extract_context(&self) -> ExtractContext {
        ExtractContext::new(self.features)
            .with_search(self.search.filter.clone())
            .with_strict_dates(self.dates.strict)
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path)?;
        } else if let Some(found_config) = Self::find_config_file()? {
            config = found_config;
        }

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Result<Option<Config>> {
        let mut dirs_to_search = vec![PathBuf::new()];
        if let Some(config_dir) = dirs::config_dir() {
            dirs_to_search.push(config_dir.join("reader-timeline"));
        }
        Self::find_config_file_in(&dirs_to_search)
    }

    /// First configuration file found in `dirs`, searched in order
    pub fn find_config_file_in(dirs: &[PathBuf]) -> Result<Option<Config>> {
        let config_names = [
            "reader-timeline.toml",
            "reader-timeline.json",
            ".reader-timeline.toml",
            ".reader-timeline.json",
        ];

        for dir in dirs {
            for name in &config_names {
                let path = dir.join(name);
                if path.is_file() {
                    tracing::info!(path = %path.display(), "loading configuration");
                    return Ok(Some(Self::load_from_file(&path)?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(search) = env.get("READER_TIMELINE_SEARCH") {
            config.search.filter = search;
        }

        if let Some(plot) = env.get("READER_TIMELINE_PLOT") {
            config.plot.enabled = parse_env("READER_TIMELINE_PLOT", &plot)?;
        }

        if let Some(output) = env.get("READER_TIMELINE_PLOT_OUTPUT") {
            config.plot.output = PathBuf::from(output);
        }

        if let Some(strict) = env.get("READER_TIMELINE_STRICT_DATES") {
            config.dates.strict = parse_env("READER_TIMELINE_STRICT_DATES", &strict)?;
        }

        if let Some(len) = env.get("READER_TIMELINE_MAX_PATH_LEN") {
            config.display.max_book_path_len = parse_env("READER_TIMELINE_MAX_PATH_LEN", &len)?;
        }

        if let Some(width) = env.get("READER_TIMELINE_MAX_ROW_WIDTH") {
            config.display.max_row_width = parse_env("READER_TIMELINE_MAX_ROW_WIDTH", &width)?;
        }

        if let Some(features) = env.get("READER_TIMELINE_FEATURES") {
            let parsed = features
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<Feature>)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    ConfigError::Environment(format!("Invalid READER_TIMELINE_FEATURES: {}", e))
                })?;
            config.features = FeatureFlags::only(parsed);
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(search) = &cli.search {
            config.search.filter = search.clone();
        }

        if cli.gnuplot {
            config.plot.enabled = true;
        }
        if let Some(output) = &cli.output {
            config.plot.output = output.clone();
        }

        if cli.strict_dates {
            config.dates.strict = true;
        }

        for feature in &cli.enable {
            config.features.set(Feature::from(*feature), true);
        }
        for feature in &cli.disable {
            config.features.set(Feature::from(*feature), false);
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.plot.output.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "Plot output path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", key, value)))
}

impl From<FeatureArg> for Feature {
    fn from(arg: FeatureArg) -> Self {
        match arg {
            FeatureArg::BookCreationDate => Feature::BookCreationDate,
            FeatureArg::BookmarkDate => Feature::BookmarkDate,
            FeatureArg::CurrentPosition => Feature::CurrentPosition,
            FeatureArg::DictionaryHistory => Feature::DictionaryHistory,
            FeatureArg::FreehandMarkups => Feature::FreehandMarkups,
            FeatureArg::AnnotationMarkups => Feature::AnnotationMarkups,
            FeatureArg::History => Feature::History,
            FeatureArg::BookmarkMarkups => Feature::BookmarkMarkups,
        }
    }
}
