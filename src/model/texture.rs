//! Textures and texture sets.

use crate::types::{MediaType, TextureChannel, TextureFilter, TextureWrap};
use std::path::PathBuf;

/// A texture image, shared between texture sets.
#[derive(Debug, Clone)]
pub struct Texture {
    pub texture_id: String,
    /// Position in the model's texture list; reassigned when unused textures are dropped.
    pub texture_index: usize,
    /// Decoded RGBA pixels before finalize; encoded bytes (or a 1-byte placeholder) after.
    pub image_data: Option<Vec<u8>>,
    /// Image file to load at finalize instead of `image_data`.
    pub src: Option<PathBuf>,
    pub media_type: Option<MediaType>,
    pub width: u32,
    pub height: u32,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub wrap_r: TextureWrap,
    /// Set when a texture set binds this texture.
    pub channel: Option<TextureChannel>,
    /// Whether finalize should encode this texture as KTX2.
    pub compressed: bool,
}

#[derive(Debug, Clone)]
pub struct TextureParams {
    pub texture_id: String,
    pub image_data: Option<Vec<u8>>,
    pub src: Option<PathBuf>,
    pub media_type: Option<MediaType>,
    pub width: u32,
    pub height: u32,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub wrap_r: TextureWrap,
    pub compressed: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            texture_id: String::new(),
            image_data: None,
            src: None,
            media_type: None,
            width: 0,
            height: 0,
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::Repeat,
            wrap_t: TextureWrap::Repeat,
            wrap_r: TextureWrap::Repeat,
            compressed: true,
        }
    }
}

/// Up to five textures, one per [`TextureChannel`], referenced by ID.
#[derive(Debug, Clone)]
pub struct TextureSet {
    pub texture_set_id: String,
    pub texture_set_index: usize,
    /// Texture IDs indexed by channel.
    pub textures: [Option<String>; 5],
    /// Number of meshes using this set.
    pub num_instances: u32,
}

impl TextureSet {
    pub fn texture_id(&self, channel: TextureChannel) -> Option<&str> {
        self.textures[channel as usize].as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextureSetParams {
    pub texture_set_id: String,
    pub color_texture_id: Option<String>,
    pub metallic_roughness_texture_id: Option<String>,
    pub normals_texture_id: Option<String>,
    pub emissive_texture_id: Option<String>,
    pub occlusion_texture_id: Option<String>,
}

impl TextureSetParams {
    pub(crate) fn texture_ids(&self) -> [Option<&String>; 5] {
        [
            self.color_texture_id.as_ref(),
            self.metallic_roughness_texture_id.as_ref(),
            self.normals_texture_id.as_ref(),
            self.emissive_texture_id.as_ref(),
            self.occlusion_texture_id.as_ref(),
        ]
    }
}
