use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Main application error type.
///
/// Every variant here aborts the run. Recoverable per-node problems (a
/// missing attribute, an absent optional child) never reach this type: the
/// extractors skip or default them silently.
#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {file} - {details}")]
    Xml { file: PathBuf, details: String },

    #[error("no {element} node found in {file}")]
    StructuralSchema { file: PathBuf, element: String },

    #[error("Invalid date: \"{value}\"")]
    InvalidDate { value: String },

    #[error("Invalid base64 payload \"{value}\": {source}")]
    InvalidBase64 {
        value: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProfilerError {
    /// Missing mandatory container element.
    pub fn structural(file: impl Into<PathBuf>, element: impl Into<String>) -> Self {
        ProfilerError::StructuralSchema {
            file: file.into(),
            element: element.into(),
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, ProfilerError::StructuralSchema { .. })
    }
}

impl From<ConfigError> for ProfilerError {
    fn from(err: ConfigError) -> Self {
        ProfilerError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ProfilerError>;
