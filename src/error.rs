use std::path::PathBuf;
use thiserror::Error;

/// Why a single CSV row could not become a journey.
#[derive(Error, Debug, PartialEq)]
pub enum RowError {
    #[error("skipping incomplete row {index}: expected 8 fields, found {found}")]
    MalformedRow { index: usize, found: usize },

    #[error("skipping row {index} due to invalid date {value:?}")]
    InvalidDate { index: usize, value: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("could not open database '{path}': {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
}

/// A file that could not be opened or read as CSV.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("error reading csv '{path}': {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("publish request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("topic rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("publish response carried no message id")]
    NoAcknowledgment,

    #[error("could not encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RenameError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error("not a valid Oyster CSV file: {0}")]
    NotOyster(&'static str),

    #[error("failed to rename file: {0}")]
    Rename(std::io::Error),
}
