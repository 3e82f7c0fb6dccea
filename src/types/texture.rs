//! Texture channel, sampling and media-type codes stored in XKT.

/// The role a texture plays within a texture set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TextureChannel {
    Color = 0,
    MetallicRoughness = 1,
    Normals = 2,
    Emissive = 3,
    Occlusion = 4,
}

impl TextureChannel {
    /// Slot order used by texture sets and the serialized texture-set table.
    pub const ALL: [TextureChannel; 5] = [
        TextureChannel::Color,
        TextureChannel::MetallicRoughness,
        TextureChannel::Normals,
        TextureChannel::Emissive,
        TextureChannel::Occlusion,
    ];
}

/// Minification/magnification filter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TextureFilter {
    Nearest = 1003,
    NearestMipmapNearest = 1004,
    NearestMipmapLinear = 1005,
    Linear = 1006,
    LinearMipmapNearest = 1007,
    LinearMipmapLinear = 1008,
}

impl TextureFilter {
    /// Map an OpenGL filter enum, as found in glTF samplers.
    pub fn from_gl(value: u32) -> Option<Self> {
        match value {
            9728 => Some(TextureFilter::Nearest),
            9729 => Some(TextureFilter::Linear),
            9984 => Some(TextureFilter::NearestMipmapNearest),
            9985 => Some(TextureFilter::LinearMipmapNearest),
            9986 => Some(TextureFilter::NearestMipmapLinear),
            9987 => Some(TextureFilter::LinearMipmapLinear),
            _ => None,
        }
    }
}

/// Texture coordinate wrapping codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TextureWrap {
    Repeat = 1000,
    ClampToEdge = 1001,
    MirroredRepeat = 1002,
}

impl TextureWrap {
    /// Map an OpenGL wrap enum, as found in glTF samplers.
    pub fn from_gl(value: u32) -> Option<Self> {
        match value {
            10497 => Some(TextureWrap::Repeat),
            33071 => Some(TextureWrap::ClampToEdge),
            33648 => Some(TextureWrap::MirroredRepeat),
            _ => None,
        }
    }
}

/// Source image media types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MediaType {
    Gif = 10000,
    Jpeg = 10001,
    Png = 10002,
}

impl MediaType {
    /// Guess from a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            "image/gif" => Some(MediaType::Gif),
            _ => None,
        }
    }

    /// Guess from a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            "gif" => Some(MediaType::Gif),
            _ => None,
        }
    }
}
