// src/error.rs
//! Error types shared by the scraping pipeline and the batch tools.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--start-page must be >= 1")]
    StartPage,
    #[error("--end-page ({end}) must be >= --start-page ({start})")]
    PageRange { start: u32, end: u32 },
    #[error("--end-page must be below {}", u32::MAX)]
    EndPage,
    #[error("--max-retries must be >= 1")]
    MaxRetries,
    #[error("URL template has no {{page}} placeholder: {0}")]
    UrlTemplate(String),
    #[error("invalid --dataset value '{0}'. Expected NAME=PATH")]
    DatasetSpec(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network blip, timeout, 5xx or 429. Retried by the fetcher.
    #[error("transient failure for {url}: {reason}")]
    Transient { url: String, reason: String },

    /// Retries exhausted.
    #[error("failed to fetch {url} after {attempts} attempts")]
    Fatal {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    /// Non-retryable status (404 and friends).
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("could not build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not find poems table on page {page}")]
    TableNotFound { page: u32 },
    #[error("invalid selector `{0}`")]
    Selector(String),
    #[error("invalid page URL `{0}`")]
    BaseUrl(String),
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("page {page}: {source}")]
    Parse {
        page: u32,
        #[source]
        source: ParseError,
    },

    #[error("appending page {page} to {}: {source}", path.display())]
    Sink {
        page: u32,
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },

    #[error("saving checkpoint {}: {source}", path.display())]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DedupeError {
    #[error("input file not found: {}", .0.display())]
    InputMissing(PathBuf),
    #[error("input CSV has no header row")]
    NoHeader,
    #[error("missing key columns in CSV header: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error(transparent)]
    Csv(#[from] ::csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Errors of the batch tools (shortlist, bands, compare, forum post).
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Csv(#[from] ::csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("drawing chart {}: {reason}", path.display())]
    Chart { path: PathBuf, reason: String },
    #[error("no passages found in {}", .0.display())]
    NoPassages(PathBuf),
    #[error("dataset '{0}' has no paragraphs")]
    EmptyDataset(String),
    #[error("missing column '{column}' in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },
}
