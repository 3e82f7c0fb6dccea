//! Error types for XKT conversion.

use thiserror::Error;

/// Result type alias using XktError.
pub type Result<T> = std::result::Result<T, XktError>;

/// Main error type for building, finalizing and writing XKT models.
#[derive(Error, Debug)]
pub enum XktError {
    /// A required creation parameter was not supplied.
    #[error("Parameter expected: {0}")]
    MissingParameter(&'static str),

    /// A creation parameter was supplied but cannot be used.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Primitive type tag that XKT cannot represent.
    #[error("Unsupported primitive type '{0}' - supported values are 'triangles', 'points', 'lines', 'line-strip' and 'line-loop'")]
    UnsupportedPrimitiveType(String),

    /// The model must be finalized before it can be written.
    #[error("XKT model has not been finalized")]
    NotFinalized,

    /// Failed to parse or serialize JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or decode an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unsupported glTF input.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// Malformed XKT container.
    #[error("Invalid XKT data: {0}")]
    InvalidXkt(String),

    /// Texture encoding failed.
    #[error("Texture encoding error: {0}")]
    TextureEncode(String),
}
