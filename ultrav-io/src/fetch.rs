//! Asset fetching from HTTP(S) URLs, `file://` URLs, local paths and
//! `data:` URIs

use crate::IoError;
use base64::Engine as _;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use ultrav_core::Result;

/// Source of raw asset bytes
pub trait AssetFetcher: Send + Sync {
    /// Fetch the full body behind `location`
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// Fetches over HTTP(S) with a shared client
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            tracing::debug!("GET {}", location);
            let request_error = |e: reqwest::Error| IoError::Request {
                url: location.to_string(),
                message: e.to_string(),
            };
            let response = self.client.get(location).send().await.map_err(request_error)?;
            let status = response.status();
            if !status.is_success() {
                return Err(IoError::HttpStatus {
                    url: location.to_string(),
                    status: status.as_u16(),
                }
                .into());
            }
            let body = response.bytes().await.map_err(request_error)?;
            Ok(body.to_vec())
        })
    }
}

/// Reads local paths and `file://` URLs
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

impl AssetFetcher for FileFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            let path = local_path(location)?;
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IoError::FileNotFound {
                    path: path.display().to_string(),
                }
                .into()),
                Err(e) => Err(IoError::Io(e).into()),
            }
        })
    }
}

/// Dispatches on the location's scheme
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl DefaultFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetFetcher for DefaultFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        if is_data_uri(location) {
            let decoded = decode_data_uri(location);
            return Box::pin(async move { decoded });
        }
        if location.starts_with("http://") || location.starts_with("https://") {
            self.http.fetch(location)
        } else {
            self.file.fetch(location)
        }
    }
}

/// Serves assets from memory, keyed by exact location.
///
/// Useful for bundling small assets and for exercising loaders offline.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.assets.insert(location.into(), bytes.into());
    }

    pub fn with(mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(location, bytes);
        self
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        let result = if is_data_uri(location) {
            decode_data_uri(location)
        } else {
            self.assets.get(location).cloned().ok_or_else(|| {
                IoError::FileNotFound {
                    path: location.to_string(),
                }
                .into()
            })
        };
        Box::pin(async move { result })
    }
}

pub fn is_data_uri(location: &str) -> bool {
    location.starts_with("data:")
}

/// Decode a base64 `data:` URI into its payload
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri.strip_prefix("data:").ok_or_else(|| IoError::ParseError {
        message: "not a data URI".to_string(),
    })?;
    let (meta, payload) = rest.split_once(',').ok_or_else(|| IoError::ParseError {
        message: "data URI without payload separator".to_string(),
    })?;
    if meta.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| IoError::ParseError {
                message: format!("data URI: {}", e),
            }.into())
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Resolve `reference` against the location of the asset that referenced it
pub fn resolve_uri(base: &str, reference: &str) -> String {
    if is_data_uri(reference) || url::Url::parse(reference).is_ok() {
        return reference.to_string();
    }
    if let Ok(base_url) = url::Url::parse(base) {
        if let Ok(joined) = base_url.join(reference) {
            return joined.to_string();
        }
    }
    let parent = Path::new(base).parent().unwrap_or_else(|| Path::new(""));
    parent.join(reference).to_string_lossy().into_owned()
}

fn local_path(location: &str) -> Result<PathBuf> {
    if location.starts_with("file:") {
        let url = url::Url::parse(location).map_err(|e| IoError::ParseError {
            message: format!("{}: {}", location, e),
        })?;
        return url.to_file_path().map_err(|_| {
            IoError::ParseError {
                message: format!("{} is not a local file URL", location),
            }
            .into()
        });
    }
    Ok(PathBuf::from(location))
}

/// Last path segment of a location, without query or fragment
pub fn file_name(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = &location[..end];
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_to_url() {
        let base = "https://cdn.example.com/models/helmet/scene.gltf";
        assert_eq!(
            resolve_uri(base, "scene.bin"),
            "https://cdn.example.com/models/helmet/scene.bin"
        );
        assert_eq!(
            resolve_uri(base, "../textures/albedo.png"),
            "https://cdn.example.com/models/textures/albedo.png"
        );
    }

    #[test]
    fn test_resolve_relative_to_path() {
        let resolved = resolve_uri("assets/box.gltf", "box.bin");
        assert_eq!(Path::new(&resolved), Path::new("assets/box.bin"));
    }

    #[test]
    fn test_absolute_references_are_kept() {
        let base = "assets/box.gltf";
        assert_eq!(resolve_uri(base, "https://a.b/c.bin"), "https://a.b/c.bin");
        assert_eq!(resolve_uri(base, "data:,abc"), "data:,abc");
    }

    #[test]
    fn test_decode_data_uri() {
        assert_eq!(
            decode_data_uri("data:application/octet-stream;base64,AQID").unwrap(),
            vec![1, 2, 3]
        );
        assert_eq!(decode_data_uri("data:text/plain,hi").unwrap(), b"hi".to_vec());
        assert!(decode_data_uri("data:application/octet-stream;base64").is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("https://x.y/a/b/Helmet.gltf?v=2"), "Helmet.gltf");
        assert_eq!(file_name("models/cube.OBJ"), "cube.OBJ");
    }

    #[tokio::test]
    async fn test_memory_fetcher() {
        let fetcher = MemoryFetcher::new().with("model.obj", b"v 0 0 0".to_vec());
        assert_eq!(fetcher.fetch("model.obj").await.unwrap(), b"v 0 0 0".to_vec());
        assert!(fetcher.fetch("missing.obj").await.is_err());
    }

    #[tokio::test]
    async fn test_file_fetcher_missing_file() {
        let err = FileFetcher.fetch("/definitely/not/here.hdr").await.unwrap_err();
        assert!(err.to_string().contains("not/here.hdr"));
    }
}
