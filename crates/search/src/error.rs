use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Indexer error: {0}")]
    IndexerError(#[from] assist_indexer::IndexerError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Path escapes project root: {0}")]
    PathOutsideRoot(String),

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid context options: {0}")]
    InvalidOptions(String),
}
