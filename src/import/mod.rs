//! Scene importers that populate an [`XktModel`](crate::model::XktModel).

pub mod gltf;

pub use gltf::{parse_gltf_into_xkt_model, GltfImportOptions, GltfImportStats};
