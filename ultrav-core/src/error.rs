//! Error types for ultrav

use thiserror::Error;

/// Main error type for ultrav operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Invalid data: {0}")]
    InvalidData(String),
    
    #[error("Network error: {0}")]
    Network(String),
    
    #[error("GPU error: {0}")]
    Gpu(String),
    
    #[error("Visualization error: {0}")]
    Visualization(String),
    
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for ultrav operations
pub type Result<T> = std::result::Result<T, Error>;
