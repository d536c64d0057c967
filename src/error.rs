use thiserror::Error;

pub type Result<T> = std::result::Result<T, TenureError>;

#[derive(Error, Debug)]
pub enum TenureError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Extraction failed: {0}")]
    Extraction(String),
    #[error("Rule error: {0}")]
    Rule(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
