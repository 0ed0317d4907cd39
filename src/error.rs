use thiserror::Error;

/// Errors produced anywhere in the viewer, from ingestion to the HTTP layer.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// A caller-supplied value is out of its valid domain (e.g. a point budget of zero).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The table has no `TIME` column, which every time-axis operation requires.
    #[error("table has no TIME column")]
    MissingTimeColumn,

    /// The CSV body has no header row after the skipped preamble.
    #[error("no column header found after the skipped header lines")]
    EmptyTable,

    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing has been uploaded yet.
    #[error("no file has been uploaded")]
    NoUpload,

    /// The request refers to an upload that has since been replaced.
    #[error("upload {requested} is no longer current (current is {current})")]
    StaleUpload { requested: u64, current: u64 },
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, ViewerError>;
