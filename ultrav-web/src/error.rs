//! Error types for the web server

use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WebError>;
