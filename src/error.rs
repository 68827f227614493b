//! Error type shared by the pipeline stages.
//!
//! Collectors turn most of these into "log and skip"; the aggregation and
//! publishing stages propagate them to `main`.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("{url} returned HTTP {status}")]
    Api { url: String, status: u16 },
}
