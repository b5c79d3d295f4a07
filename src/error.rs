// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error contacting {source_name}: {message}")]
    Network {
        source_name: String,
        message: String,
    },

    #[error("Unexpected response from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("Rate limited by {source_name}{}", retry_after_hint(.retry_after_secs))]
    RateLimit {
        source_name: String,
        retry_after_secs: Option<u64>,
    },

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn retry_after_hint(secs: &Option<u64>) -> String {
    match secs {
        Some(secs) => format!(" (retry after {}s)", secs),
        None => String::new(),
    }
}

/// Classification of a failed fetch as it appears in the summary report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Network,
    Parse,
    RateLimit,
    Other,
}

impl PipelineError {
    pub fn network(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Network {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn file_operation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOperation {
            path: path.into(),
            source,
        }
    }

    pub fn fetch_kind(&self) -> FetchErrorKind {
        match self {
            Self::Network { .. } => FetchErrorKind::Network,
            Self::Parse { .. } => FetchErrorKind::Parse,
            Self::RateLimit { .. } => FetchErrorKind::RateLimit,
            _ => FetchErrorKind::Other,
        }
    }

    /// True for errors that belong to a single (query, source) attempt and
    /// must not stop the batch.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Parse { .. } | Self::RateLimit { .. }
        )
    }
}
