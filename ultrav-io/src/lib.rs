//! Asset I/O for the viewer
//!
//! This crate fetches assets from HTTP(S) URLs, local paths and `data:` URIs,
//! and decodes the formats the viewer consumes: glTF/GLB and OBJ models and
//! Radiance HDR environment maps.

pub mod fetch;
pub mod gltf_read;
pub mod obj_read;
pub mod hdr;
pub mod error;

pub use error::*;
pub use fetch::{AssetFetcher, DefaultFetcher, FileFetcher, HttpFetcher, MemoryFetcher, resolve_uri};
pub use hdr::{decode_hdr, load_hdr};

use ultrav_core::{Node, Result};

/// Model formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Gltf,
    Obj,
}

impl ModelFormat {
    /// Detect the format from the location's file extension
    pub fn from_location(location: &str) -> Option<Self> {
        let name = fetch::file_name(location);
        let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
        match extension.as_str() {
            "gltf" | "glb" => Some(ModelFormat::Gltf),
            "obj" => Some(ModelFormat::Obj),
            _ => None,
        }
    }
}

/// Auto-detect format and load a model
pub async fn load_model(fetcher: &dyn AssetFetcher, location: &str) -> Result<Node> {
    match ModelFormat::from_location(location) {
        Some(ModelFormat::Gltf) => gltf_read::load_gltf(fetcher, location).await,
        Some(ModelFormat::Obj) => obj_read::load_obj(fetcher, location).await,
        None => Err(IoError::InvalidFormat {
            format: fetch::file_name(location).to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ModelFormat::from_location("https://cdn.x/DamagedHelmet/glTF/DamagedHelmet.gltf"),
            Some(ModelFormat::Gltf)
        );
        assert_eq!(ModelFormat::from_location("a/b.GLB?raw=1"), Some(ModelFormat::Gltf));
        assert_eq!(ModelFormat::from_location("cube.obj"), Some(ModelFormat::Obj));
        assert_eq!(ModelFormat::from_location("scan.ply"), None);
        assert_eq!(ModelFormat::from_location("noextension"), None);
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let fetcher = MemoryFetcher::new();
        let err = load_model(&fetcher, "models/scan.ply").await.unwrap_err();
        match err {
            ultrav_core::Error::UnsupportedFormat(format) => assert_eq!(format, "scan.ply"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
