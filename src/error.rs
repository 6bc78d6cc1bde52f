use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Invalid config line {line}: {content}")]
    InvalidLine { line: usize, content: String },

    #[error("{key} must be set")]
    Missing { key: String },

    #[error("Unknown store backend {0}, expected mongo or memory")]
    UnknownBackend(String),

    #[error("Invalid bind address {0}")]
    InvalidBindAddr(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document store error: {0}")]
    Backend(String),

    #[error("Document conversion failed: {0}")]
    Conversion(String),
}

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Assistant request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Assistant request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode assistant response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Assistant returned no text content")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Batch {batch} failed with status: {status}")]
    Failed { batch: usize, status: String },

    #[error("Batch {batch} timed out after {seconds}s")]
    TimedOut { batch: usize, seconds: u64 },

    #[error(transparent)]
    Assistant(#[from] AssistantError),
}

impl BatchError {
    // Text stored in the placeholder entry for this batch.
    pub fn placeholder_text(&self) -> String {
        match self {
            BatchError::TimedOut { .. } => "Timed out".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Spreadsheet {0} has no worksheets")]
    NoWorksheet(PathBuf),

    #[error("Spreadsheet {0} has no header row")]
    MissingHeader(PathBuf),
}
