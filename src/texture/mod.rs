//! Texture image decoding and the compressed-texture encoder seam.
//!
//! Decoding of JPEG/PNG sources goes through the `image` crate. KTX2/Basis
//! encoding is supplied by the caller as a [`TextureEncoder`]; the presets
//! handed to it depend on the channel a texture is used for.

use crate::error::Result;
use crate::types::TextureChannel;
use std::path::Path;

/// Raw RGBA8 texture pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Decode JPEG or PNG bytes into RGBA8 pixels.
pub fn load_image_from_bytes(data: &[u8]) -> Result<DecodedImage> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage::new(width, height, rgba.into_raw()))
}

/// Read and decode an image file.
pub fn load_image_from_path<P: AsRef<Path>>(path: P) -> Result<DecodedImage> {
    let data = std::fs::read(path)?;
    load_image_from_bytes(&data)
}

/// Settings passed to a [`TextureEncoder`] for one texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureEncodingOptions {
    /// Encode in sRGB color space rather than linear.
    pub use_srgb: bool,
    /// Basis quality level, 1-255.
    pub quality_level: u32,
    /// Use UASTC rather than ETC1S.
    pub encode_uastc: bool,
    /// Generate a mipmap chain.
    pub mipmaps: bool,
}

impl TextureEncodingOptions {
    /// Preset for the channel a texture is bound to.
    ///
    /// Metallic-roughness keeps mipmaps for GGX roughness shading.
    pub fn for_channel(channel: TextureChannel) -> Self {
        match channel {
            TextureChannel::Color => Self {
                use_srgb: true,
                quality_level: 50,
                encode_uastc: true,
                mipmaps: true,
            },
            TextureChannel::MetallicRoughness => Self {
                use_srgb: false,
                quality_level: 50,
                encode_uastc: true,
                mipmaps: true,
            },
            TextureChannel::Normals | TextureChannel::Emissive | TextureChannel::Occlusion => {
                Self {
                    use_srgb: false,
                    quality_level: 10,
                    encode_uastc: true,
                    mipmaps: false,
                }
            }
        }
    }
}

/// Compressed-texture (KTX2/Basis) encoder.
///
/// Called concurrently from finalize, one texture per call.
pub trait TextureEncoder: Send + Sync {
    /// Encode decoded pixels into compressed texture bytes.
    fn encode(&self, image: &DecodedImage, options: &TextureEncodingOptions) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageEncoder;

    fn png_bytes(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(rgba, width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let data = png_bytes(2, 1, &[255, 0, 0, 255, 0, 255, 0, 128]);
        let image = load_image_from_bytes(&data).unwrap();
        assert_eq!(image.width, 2);
        assert_eq!(image.height, 1);
        assert_eq!(image.pixels, vec![255, 0, 0, 255, 0, 255, 0, 128]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(load_image_from_bytes(&[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_channel_presets() {
        let color = TextureEncodingOptions::for_channel(TextureChannel::Color);
        assert!(color.use_srgb && color.mipmaps);
        assert_eq!(color.quality_level, 50);

        let mr = TextureEncodingOptions::for_channel(TextureChannel::MetallicRoughness);
        assert!(!mr.use_srgb && mr.mipmaps);

        for channel in [
            TextureChannel::Normals,
            TextureChannel::Emissive,
            TextureChannel::Occlusion,
        ] {
            let options = TextureEncodingOptions::for_channel(channel);
            assert!(!options.use_srgb && !options.mipmaps);
            assert_eq!(options.quality_level, 10);
        }
    }
}
