//! Radiance HDR environment maps

use crate::fetch::AssetFetcher;
use crate::IoError;
use image::codecs::hdr::HdrDecoder;
use ultrav_core::{EnvironmentMap, Result};

/// Fetch and decode an HDR panorama
pub async fn load_hdr(fetcher: &dyn AssetFetcher, url: &str) -> Result<EnvironmentMap> {
    let bytes = fetcher.fetch(url).await?;
    decode_hdr(&bytes)
}

/// Decode Radiance `.hdr` bytes into linear float texels.
///
/// Radiance is kept unclamped; values above 1.0 survive.
pub fn decode_hdr(bytes: &[u8]) -> Result<EnvironmentMap> {
    let decoder = HdrDecoder::new(bytes).map_err(IoError::from)?;
    let metadata = decoder.metadata();
    let texels = decoder
        .read_image_hdr()
        .map_err(IoError::from)?
        .into_iter()
        .map(|p| p.0)
        .collect();
    Ok(EnvironmentMap::new(metadata.width, metadata.height, texels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 2x1 uncompressed RGBE image: (1, 0.5, 0.25) and (0.5, 0.5, 0.5)
    fn tiny_hdr() -> Vec<u8> {
        let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 2\n".to_vec();
        bytes.extend_from_slice(&[128, 64, 32, 129]);
        bytes.extend_from_slice(&[128, 128, 128, 128]);
        bytes
    }

    #[test]
    fn test_decode_tiny_image() {
        let env = decode_hdr(&tiny_hdr()).unwrap();
        assert_eq!((env.width, env.height), (2, 1));
        assert_relative_eq!(env.texels[0][0], 1.0, epsilon = 0.02);
        assert_relative_eq!(env.texels[0][2], 0.25, epsilon = 0.02);
        assert_relative_eq!(env.texels[1][1], 0.5, epsilon = 0.02);
    }

    #[test]
    fn test_radiance_above_one_is_preserved() {
        let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 1\n".to_vec();
        bytes.extend_from_slice(&[128, 128, 128, 131]);
        let env = decode_hdr(&bytes).unwrap();
        assert_eq!(env.texels.len(), 1);
        for channel in env.texels[0] {
            assert_relative_eq!(channel, 4.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_hdr(b"not an hdr").is_err());
    }
}
