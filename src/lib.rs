//! # XKT Convert
//!
//! A Rust library for converting glTF scenes into the XKT binary model format.
//!
//! ## Overview
//!
//! Models are built up in an [`XktModel`] from property sets, metaobjects,
//! textures, geometries, meshes and entities. [`XktModel::finalize`] then
//! quantizes and oct-encodes the geometry, bakes single-use geometries into
//! world space, splits entities into spatial tiles with a k-d tree and
//! compresses textures. [`write_xkt_model`] packs the result into 28
//! zlib-compressed sections with a version 10 header.
//!
//! ## Quick Start
//!
//! ```ignore
//! use xkt_convert::{convert_gltf, ConvertOptions};
//!
//! let gltf = std::fs::read("model.glb")?;
//! let output = convert_gltf(&gltf, &ConvertOptions::default())?;
//! std::fs::write("model.xkt", &output.xkt)?;
//! ```
//!
//! ## Building Models Directly
//!
//! ```ignore
//! use xkt_convert::{XktModel, GeometryParams, MeshParams, EntityParams, PrimitiveType};
//!
//! let mut model = XktModel::default();
//! model.create_geometry(GeometryParams {
//!     geometry_id: "box".into(),
//!     primitive_type: Some(PrimitiveType::Triangles),
//!     positions,
//!     indices: Some(indices),
//!     ..Default::default()
//! })?;
//! model.create_mesh(MeshParams { mesh_id: "m".into(), geometry_id: "box".into(), ..Default::default() })?;
//! model.create_entity(EntityParams { entity_id: "e".into(), mesh_ids: vec!["m".into()] })?;
//! model.finalize();
//!
//! let xkt = xkt_convert::write_xkt_model(&model, &Default::default())?;
//! ```

pub mod compression;
pub mod convert;
pub mod error;
pub mod export;
pub mod geometry;
pub mod import;
pub mod model;
pub mod texture;
pub mod types;

// Re-export main types for convenience
pub use convert::{convert_gltf, ConversionStats, ConvertOptions, ConvertOutput};
pub use error::{Result, XktError};
pub use export::{write_xkt_model, Section, WriteOptions, XktReader, XKT_VERSION};
pub use import::{parse_gltf_into_xkt_model, GltfImportOptions, GltfImportStats};
pub use model::{
    Entity, EntityParams, FinalizeReport, Geometry, GeometryParams, Mesh, MeshParams,
    MetaObject, MetaObjectParams, PropertySet, PropertySetParams, Texture, TextureParams,
    TextureSet, TextureSetParams, Tile, XktModel, XktModelConfig,
};
pub use texture::{DecodedImage, TextureEncoder, TextureEncodingOptions};
pub use types::{Aabb, MediaType, PrimitiveType, TextureChannel, TextureFilter, TextureWrap};

#[cfg(feature = "wasm")]
pub mod wasm;
