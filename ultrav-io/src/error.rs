//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur while fetching or decoding assets
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for ultrav_core::Error {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Io(e) => ultrav_core::Error::Io(e),
            IoError::FileNotFound { .. } => ultrav_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                e.to_string(),
            )),
            IoError::Request { .. } | IoError::HttpStatus { .. } => {
                ultrav_core::Error::Network(e.to_string())
            }
            IoError::InvalidFormat { format } => ultrav_core::Error::UnsupportedFormat(format),
            IoError::ParseError { message } => ultrav_core::Error::InvalidData(message),
        }
    }
}

impl From<gltf::Error> for IoError {
    fn from(e: gltf::Error) -> Self {
        IoError::ParseError { message: format!("glTF: {}", e) }
    }
}

impl From<image::ImageError> for IoError {
    fn from(e: image::ImageError) -> Self {
        IoError::ParseError { message: format!("image: {}", e) }
    }
}
