use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum TrackerError {
    #[error("invalid group id: {0}")]
    InvalidGroupId(String),

    #[error("invalid product id: {0}")]
    InvalidProductId(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("catalog file not found: {0}")]
    MissingCatalog(Utf8PathBuf),

    #[error("failed to read catalog at {0}")]
    CatalogRead(Utf8PathBuf),

    #[error("failed to parse catalog JSON: {0}")]
    CatalogParse(String),

    #[error("catalog entry not found: {0}")]
    EntryNotFound(String),

    #[error("archive request failed: {0}")]
    ArchiveHttp(String),

    #[error("transaction source error: {0}")]
    Transactions(String),

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
