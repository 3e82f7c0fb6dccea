//! Geometry compression: position quantization and normal oct-encoding.
//!
//! Positions are quantized to 16-bit unsigned integers relative to an AABB;
//! the matching decode matrix lets the viewer recover approximate floats.
//! Normals are packed into two signed bytes with octahedral mapping.

mod normals;
mod positions;

pub use normals::{
    oct_decode_vec2, oct_encode_normals, oct_encode_vec3, oct_encode_vec3_best,
    transform_and_oct_encode_normals, Rounding,
};
pub use positions::{create_positions_decode_matrix, quantize_positions, MAX_QUANTIZED};
