//! One-call glTF to XKT conversion.

use crate::error::Result;
use crate::export::{write_xkt_model, WriteOptions};
use crate::import::{parse_gltf_into_xkt_model, GltfImportOptions};
use crate::model::{FinalizeReport, XktModel, XktModelConfig};
use crate::texture::TextureEncoder;
use crate::types::{Aabb, PrimitiveType};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything that controls a conversion.
#[derive(Clone, Default)]
pub struct ConvertOptions {
    pub model: XktModelConfig,
    pub import: GltfImportOptions,
    pub write: WriteOptions,
    /// KTX2 encoder for compressed textures.
    pub texture_encoder: Option<Arc<dyn TextureEncoder>>,
}

impl ConvertOptions {
    pub fn with_model_config(mut self, config: XktModelConfig) -> Self {
        self.model = config;
        self
    }

    pub fn with_import_options(mut self, options: GltfImportOptions) -> Self {
        self.import = options;
        self
    }

    pub fn with_write_options(mut self, options: WriteOptions) -> Self {
        self.write = options;
        self
    }

    pub fn with_texture_encoder(mut self, encoder: Arc<dyn TextureEncoder>) -> Self {
        self.texture_encoder = Some(encoder);
        self
    }
}

impl std::fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("model", &self.model)
            .field("import", &self.import)
            .field("write", &self.write)
            .field("texture_encoder", &self.texture_encoder.is_some())
            .finish()
    }
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, Default)]
pub struct ConversionStats {
    pub num_property_sets: usize,
    pub num_meta_objects: usize,
    pub num_geometries: usize,
    pub num_meshes: usize,
    pub num_entities: usize,
    pub num_tiles: usize,
    pub num_textures: usize,
    pub num_texture_sets: usize,
    pub num_triangles: usize,
    pub num_vertices: usize,
    pub num_normals: usize,
    pub num_uvs: usize,
    pub source_size: usize,
    pub xkt_size: usize,
    /// Output size divided by source size.
    pub compression_ratio: f64,
    pub conversion_time_ms: i64,
    pub aabb: Aabb,
}

impl ConversionStats {
    fn from_model(model: &XktModel) -> Self {
        let mut stats = Self {
            num_property_sets: model.property_sets().len(),
            num_meta_objects: model.meta_objects().len(),
            num_geometries: model.geometries().len(),
            num_meshes: model.meshes().len(),
            num_entities: model.entities().len(),
            num_tiles: model.tiles().len(),
            num_textures: model.textures().len(),
            num_texture_sets: model.texture_sets().len(),
            aabb: *model.aabb(),
            ..Default::default()
        };
        for geometry in model.geometries() {
            if geometry.primitive_type == PrimitiveType::Triangles {
                stats.num_triangles += geometry.indices.len() / 3;
            }
            stats.num_vertices += geometry.num_vertices();
            if let Some(normals) = &geometry.normals {
                stats.num_normals += normals.len() / 3;
            }
            if let Some(uvs) = &geometry.uvs {
                stats.num_uvs += uvs.len() / 2;
            }
        }
        stats
    }
}

/// Result of [`convert_gltf`].
#[derive(Debug)]
pub struct ConvertOutput {
    pub xkt: Vec<u8>,
    pub stats: ConversionStats,
    pub report: FinalizeReport,
}

/// Convert glTF or GLB bytes into an XKT file.
///
/// Runs import, default metaobject creation, finalize and write in order.
/// `created_at` is filled with the current UTC time when left empty.
pub fn convert_gltf(bytes: &[u8], options: &ConvertOptions) -> Result<ConvertOutput> {
    let started = Utc::now();

    let mut config = options.model.clone();
    if config.created_at.is_empty() {
        config.created_at = started.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    let mut model = XktModel::new(config);
    if let Some(encoder) = &options.texture_encoder {
        model.set_texture_encoder(Arc::clone(encoder));
    }

    let import_stats = parse_gltf_into_xkt_model(&mut model, bytes, &options.import)?;
    if import_stats.skipped_primitives > 0 {
        warn!(
            skipped = import_stats.skipped_primitives,
            "Some glTF primitives could not be converted"
        );
    }

    model.create_default_meta_objects()?;
    let report = model.finalize();
    for failure in &report.texture_failures {
        warn!(texture = %failure.texture_id, error = %failure.error, "Texture not compressed");
    }

    let xkt = write_xkt_model(&model, &options.write)?;

    let mut stats = ConversionStats::from_model(&model);
    stats.source_size = bytes.len();
    stats.xkt_size = xkt.len();
    stats.compression_ratio = if bytes.is_empty() {
        0.0
    } else {
        xkt.len() as f64 / bytes.len() as f64
    };
    stats.conversion_time_ms = (Utc::now() - started).num_milliseconds();

    info!(
        entities = stats.num_entities,
        tiles = stats.num_tiles,
        geometries = stats.num_geometries,
        bytes = stats.xkt_size,
        "Converted glTF to XKT"
    );

    Ok(ConvertOutput { xkt, stats, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Section, XktReader, XKT_VERSION};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn triangle_gltf() -> Vec<u8> {
        let mut buffer = Vec::new();
        for v in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
            buffer.extend_from_slice(&v.to_le_bytes());
        }
        for i in [0u16, 1, 2] {
            buffer.extend_from_slice(&i.to_le_bytes());
        }
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            STANDARD.encode(&buffer)
        );
        serde_json::json!({
            "asset": {"version": "2.0"},
            "scene": 0,
            "scenes": [{"nodes": [0]}],
            "nodes": [{"mesh": 0, "name": "triangle"}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]}],
            "buffers": [{"byteLength": buffer.len(), "uri": uri}],
            "bufferViews": [
                {"buffer": 0, "byteOffset": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": 36, "byteLength": 6}
            ],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                 "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]},
                {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
            ]
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_convert_single_triangle() {
        let source = triangle_gltf();
        let output = convert_gltf(&source, &ConvertOptions::default()).unwrap();

        let reader = XktReader::parse(&output.xkt).unwrap();
        assert_eq!(reader.version(), XKT_VERSION);
        assert_eq!(reader.num_geometries(), 1);
        assert_eq!(reader.u32s(Section::Indices).unwrap().len(), 3);
        assert_eq!(reader.num_entities().unwrap(), 1);
        assert_eq!(reader.num_tiles().unwrap(), 1);
        assert_eq!(reader.entity_ids().unwrap(), vec!["triangle".to_string()]);

        assert_eq!(output.stats.num_entities, 1);
        assert_eq!(output.stats.num_triangles, 1);
        assert_eq!(output.stats.num_vertices, 3);
        assert_eq!(output.stats.source_size, source.len());
        assert_eq!(output.stats.xkt_size, output.xkt.len());
        assert!(output.report.texture_failures.is_empty());
    }

    #[test]
    fn test_default_metadata_written() {
        let options = ConvertOptions::default()
            .with_model_config(XktModelConfig::default().with_model_id("scene"));
        let output = convert_gltf(&triangle_gltf(), &options).unwrap();

        let reader = XktReader::parse(&output.xkt).unwrap();
        let metadata = reader.json(Section::Metadata).unwrap();
        assert_eq!(metadata["id"], "scene");
        assert!(!metadata["createdAt"].as_str().unwrap().is_empty());
        let meta_objects = metadata["metaObjects"].as_array().unwrap();
        assert_eq!(meta_objects.len(), 2);
        assert_eq!(output.stats.num_meta_objects, 2);
    }

    #[test]
    fn test_external_meta_model_replaces_metadata() {
        let options = ConvertOptions::default().with_write_options(
            WriteOptions::default().with_meta_model_json(r#"{"id":"external"}"#),
        );
        let output = convert_gltf(&triangle_gltf(), &options).unwrap();
        let reader = XktReader::parse(&output.xkt).unwrap();
        assert_eq!(reader.json(Section::Metadata).unwrap()["id"], "external");
    }

    #[test]
    fn test_invalid_source_fails() {
        assert!(convert_gltf(b"not a gltf", &ConvertOptions::default()).is_err());
    }
}
