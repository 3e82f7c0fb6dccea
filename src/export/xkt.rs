//! XKT binary writer.
//!
//! A finalized [`XktModel`] is packed into 28 flat sections (see [`Section`]),
//! each section is zlib-compressed on its own, and the results are
//! concatenated behind a header of little-endian `u32`s:
//!
//! ```text
//! [version] [section count] [length of each section ...] [section bytes ...]
//! ```

use crate::error::{Result, XktError};
use crate::model::{Property, XktModel};
use crate::types::{PrimitiveType, TextureChannel};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use glam::DMat4;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

/// Format version written to the header.
pub const XKT_VERSION: u32 = 10;

/// The sections of an XKT file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Metadata,
    TextureData,
    EachTextureDataPortion,
    EachTextureAttributes,
    Positions,
    Normals,
    Colors,
    Uvs,
    Indices,
    EdgeIndices,
    EachTextureSetTextures,
    Matrices,
    ReusedGeometriesDecodeMatrix,
    EachGeometryPrimitiveType,
    EachGeometryPositionsPortion,
    EachGeometryNormalsPortion,
    EachGeometryColorsPortion,
    EachGeometryUvsPortion,
    EachGeometryIndicesPortion,
    EachGeometryEdgeIndicesPortion,
    EachMeshGeometriesPortion,
    EachMeshMatricesPortion,
    EachMeshTextureSet,
    EachMeshMaterialAttributes,
    EachEntityId,
    EachEntityMeshesPortion,
    EachTileAabb,
    EachTileEntitiesPortion,
}

impl Section {
    pub const COUNT: usize = 28;

    pub const ALL: [Section; Self::COUNT] = [
        Section::Metadata,
        Section::TextureData,
        Section::EachTextureDataPortion,
        Section::EachTextureAttributes,
        Section::Positions,
        Section::Normals,
        Section::Colors,
        Section::Uvs,
        Section::Indices,
        Section::EdgeIndices,
        Section::EachTextureSetTextures,
        Section::Matrices,
        Section::ReusedGeometriesDecodeMatrix,
        Section::EachGeometryPrimitiveType,
        Section::EachGeometryPositionsPortion,
        Section::EachGeometryNormalsPortion,
        Section::EachGeometryColorsPortion,
        Section::EachGeometryUvsPortion,
        Section::EachGeometryIndicesPortion,
        Section::EachGeometryEdgeIndicesPortion,
        Section::EachMeshGeometriesPortion,
        Section::EachMeshMatricesPortion,
        Section::EachMeshTextureSet,
        Section::EachMeshMaterialAttributes,
        Section::EachEntityId,
        Section::EachEntityMeshesPortion,
        Section::EachTileAabb,
        Section::EachTileEntitiesPortion,
    ];

    /// Position of this section in the file.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::Metadata => "metadata",
            Section::TextureData => "textureData",
            Section::EachTextureDataPortion => "eachTextureDataPortion",
            Section::EachTextureAttributes => "eachTextureAttributes",
            Section::Positions => "positions",
            Section::Normals => "normals",
            Section::Colors => "colors",
            Section::Uvs => "uvs",
            Section::Indices => "indices",
            Section::EdgeIndices => "edgeIndices",
            Section::EachTextureSetTextures => "eachTextureSetTextures",
            Section::Matrices => "matrices",
            Section::ReusedGeometriesDecodeMatrix => "reusedGeometriesDecodeMatrix",
            Section::EachGeometryPrimitiveType => "eachGeometryPrimitiveType",
            Section::EachGeometryPositionsPortion => "eachGeometryPositionsPortion",
            Section::EachGeometryNormalsPortion => "eachGeometryNormalsPortion",
            Section::EachGeometryColorsPortion => "eachGeometryColorsPortion",
            Section::EachGeometryUvsPortion => "eachGeometryUVsPortion",
            Section::EachGeometryIndicesPortion => "eachGeometryIndicesPortion",
            Section::EachGeometryEdgeIndicesPortion => "eachGeometryEdgeIndicesPortion",
            Section::EachMeshGeometriesPortion => "eachMeshGeometriesPortion",
            Section::EachMeshMatricesPortion => "eachMeshMatricesPortion",
            Section::EachMeshTextureSet => "eachMeshTextureSet",
            Section::EachMeshMaterialAttributes => "eachMeshMaterialAttributes",
            Section::EachEntityId => "eachEntityId",
            Section::EachEntityMeshesPortion => "eachEntityMeshesPortion",
            Section::EachTileAabb => "eachTileAABB",
            Section::EachTileEntitiesPortion => "eachTileEntitiesPortion",
        }
    }
}

/// Writer settings.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Metamodel JSON to embed in place of the model's own property sets and metaobjects.
    pub meta_model_json: Option<String>,
}

impl WriteOptions {
    pub fn with_meta_model_json(mut self, json: impl Into<String>) -> Self {
        self.meta_model_json = Some(json.into());
        self
    }
}

/// Uncompressed section contents packed from a finalized model.
///
/// Every `each_*_portion` array holds, per element, the offset of its first
/// item in the matching flat array; the next element's offset (or the array
/// end) bounds it.
#[derive(Debug, Clone, Default)]
pub struct XktData {
    pub metadata: String,
    pub texture_data: Vec<u8>,
    pub each_texture_data_portion: Vec<u32>,
    pub each_texture_attributes: Vec<u16>,
    pub positions: Vec<u16>,
    pub normals: Vec<i8>,
    pub colors: Vec<u8>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
    pub edge_indices: Vec<u32>,
    pub each_texture_set_textures: Vec<i32>,
    pub matrices: Vec<f32>,
    pub reused_geometries_decode_matrix: [f32; 16],
    pub each_geometry_primitive_type: Vec<u8>,
    pub each_geometry_positions_portion: Vec<u32>,
    pub each_geometry_normals_portion: Vec<u32>,
    pub each_geometry_colors_portion: Vec<u32>,
    pub each_geometry_uvs_portion: Vec<u32>,
    pub each_geometry_indices_portion: Vec<u32>,
    pub each_geometry_edge_indices_portion: Vec<u32>,
    pub each_mesh_geometries_portion: Vec<u32>,
    pub each_mesh_matrices_portion: Vec<u32>,
    pub each_mesh_texture_set: Vec<i32>,
    pub each_mesh_material_attributes: Vec<u8>,
    pub each_entity_id: Vec<String>,
    pub each_entity_meshes_portion: Vec<u32>,
    pub each_tile_aabb: Vec<f64>,
    pub each_tile_entities_portion: Vec<u32>,
}

impl XktData {
    /// Pack a finalized model.
    pub fn from_model(model: &XktModel, options: &WriteOptions) -> Result<Self> {
        if !model.is_finalized() {
            return Err(XktError::NotFinalized);
        }

        let mut data = XktData {
            metadata: match &options.meta_model_json {
                Some(json) => json.clone(),
                None => model_metadata_json(model)?,
            },
            reused_geometries_decode_matrix: matrix_to_f32(model.reused_geometries_decode_matrix()),
            ..Default::default()
        };

        data.pack_textures(model);
        data.pack_geometries(model);
        data.pack_texture_sets(model);
        data.pack_tiles(model);
        Ok(data)
    }

    fn pack_textures(&mut self, model: &XktModel) {
        for texture in model.textures() {
            self.each_texture_data_portion
                .push(self.texture_data.len() as u32);
            if let Some(bytes) = &texture.image_data {
                self.texture_data.extend_from_slice(bytes);
            }
            self.each_texture_attributes.extend_from_slice(&[
                u16::from(texture.compressed),
                texture.media_type.map_or(0, |m| m as u16),
                texture.width.min(u16::MAX as u32) as u16,
                texture.height.min(u16::MAX as u32) as u16,
                texture.min_filter as u16,
                texture.mag_filter as u16,
                texture.wrap_s as u16,
                texture.wrap_t as u16,
                texture.wrap_r as u16,
            ]);
        }
    }

    fn pack_geometries(&mut self, model: &XktModel) {
        for geometry in model.geometries() {
            self.each_geometry_primitive_type
                .push(primitive_type_code(geometry.primitive_type, geometry.solid));

            self.each_geometry_positions_portion
                .push(self.positions.len() as u32);
            self.positions
                .extend_from_slice(&geometry.positions_quantized);

            self.each_geometry_normals_portion
                .push(self.normals.len() as u32);
            if let Some(normals) = &geometry.normals_oct_encoded {
                self.normals.extend_from_slice(normals);
            }

            self.each_geometry_colors_portion
                .push(self.colors.len() as u32);
            if let Some(colors) = &geometry.colors_compressed {
                self.colors.extend_from_slice(colors);
            }

            self.each_geometry_uvs_portion.push(self.uvs.len() as u32);
            if let Some(uvs) = &geometry.uvs {
                self.uvs.extend_from_slice(uvs);
            }

            self.each_geometry_indices_portion
                .push(self.indices.len() as u32);
            self.indices.extend_from_slice(&geometry.indices);

            self.each_geometry_edge_indices_portion
                .push(self.edge_indices.len() as u32);
            self.edge_indices.extend_from_slice(&geometry.edge_indices);
        }
    }

    fn pack_texture_sets(&mut self, model: &XktModel) {
        for texture_set in model.texture_sets() {
            for channel in TextureChannel::ALL {
                let index = texture_set
                    .texture_id(channel)
                    .and_then(|id| model.texture(id))
                    .map_or(-1, |texture| texture.texture_index as i32);
                self.each_texture_set_textures.push(index);
            }
        }
    }

    /// Tiles, their entities and the entities' meshes, in tile order.
    fn pack_tiles(&mut self, model: &XktModel) {
        let entities = model.entities();
        let meshes = model.meshes();
        let geometries = model.geometries();

        for tile in model.tiles() {
            self.each_tile_aabb.extend_from_slice(&tile.aabb.to_array());
            self.each_tile_entities_portion
                .push(self.each_entity_id.len() as u32);

            for &entity_index in &tile.entities {
                let entity = &entities[entity_index];
                self.each_entity_id.push(entity.entity_id.clone());
                self.each_entity_meshes_portion
                    .push(self.each_mesh_geometries_portion.len() as u32);

                for &mesh_index in &entity.mesh_indices {
                    let mesh = &meshes[mesh_index];
                    let geometry = &geometries[mesh.geometry_index];

                    self.each_mesh_geometries_portion
                        .push(mesh.geometry_index as u32);
                    if geometry.is_reused() {
                        self.each_mesh_matrices_portion
                            .push(self.matrices.len() as u32);
                        self.matrices.extend_from_slice(&matrix_to_f32(&mesh.matrix));
                    } else {
                        self.each_mesh_matrices_portion.push(0);
                    }
                    self.each_mesh_texture_set
                        .push(mesh.texture_set_index.map_or(-1, |i| i as i32));
                    self.each_mesh_material_attributes.extend_from_slice(&[
                        unit_to_u8(mesh.color[0]),
                        unit_to_u8(mesh.color[1]),
                        unit_to_u8(mesh.color[2]),
                        unit_to_u8(mesh.opacity),
                        unit_to_u8(mesh.metallic),
                        unit_to_u8(mesh.roughness),
                    ]);
                }
            }
        }
    }

    /// Raw little-endian bytes of one section, before compression.
    pub fn section_bytes(&self, section: Section) -> Result<Vec<u8>> {
        let bytes = match section {
            Section::Metadata => escape_non_ascii(&self.metadata).into_bytes(),
            Section::TextureData => self.texture_data.clone(),
            Section::EachTextureDataPortion => le_bytes(&self.each_texture_data_portion),
            Section::EachTextureAttributes => le_bytes(&self.each_texture_attributes),
            Section::Positions => le_bytes(&self.positions),
            Section::Normals => le_bytes(&self.normals),
            Section::Colors => self.colors.clone(),
            Section::Uvs => le_bytes(&self.uvs),
            Section::Indices => le_bytes(&self.indices),
            Section::EdgeIndices => le_bytes(&self.edge_indices),
            Section::EachTextureSetTextures => le_bytes(&self.each_texture_set_textures),
            Section::Matrices => le_bytes(&self.matrices),
            Section::ReusedGeometriesDecodeMatrix => {
                le_bytes(&self.reused_geometries_decode_matrix[..])
            }
            Section::EachGeometryPrimitiveType => self.each_geometry_primitive_type.clone(),
            Section::EachGeometryPositionsPortion => {
                le_bytes(&self.each_geometry_positions_portion)
            }
            Section::EachGeometryNormalsPortion => le_bytes(&self.each_geometry_normals_portion),
            Section::EachGeometryColorsPortion => le_bytes(&self.each_geometry_colors_portion),
            Section::EachGeometryUvsPortion => le_bytes(&self.each_geometry_uvs_portion),
            Section::EachGeometryIndicesPortion => le_bytes(&self.each_geometry_indices_portion),
            Section::EachGeometryEdgeIndicesPortion => {
                le_bytes(&self.each_geometry_edge_indices_portion)
            }
            Section::EachMeshGeometriesPortion => le_bytes(&self.each_mesh_geometries_portion),
            Section::EachMeshMatricesPortion => le_bytes(&self.each_mesh_matrices_portion),
            Section::EachMeshTextureSet => le_bytes(&self.each_mesh_texture_set),
            Section::EachMeshMaterialAttributes => self.each_mesh_material_attributes.clone(),
            Section::EachEntityId => {
                escape_non_ascii(&serde_json::to_string(&self.each_entity_id)?).into_bytes()
            }
            Section::EachEntityMeshesPortion => le_bytes(&self.each_entity_meshes_portion),
            Section::EachTileAabb => le_bytes(&self.each_tile_aabb),
            Section::EachTileEntitiesPortion => le_bytes(&self.each_tile_entities_portion),
        };
        Ok(bytes)
    }
}

/// Serialize a finalized model to XKT bytes.
pub fn write_xkt_model(model: &XktModel, options: &WriteOptions) -> Result<Vec<u8>> {
    let data = XktData::from_model(model, options)?;
    let sections = Section::ALL
        .iter()
        .map(|&section| deflate(&data.section_bytes(section)?))
        .collect::<Result<Vec<_>>>()?;
    let buffer = to_array_buffer(&sections);
    tracing::debug!(
        bytes = buffer.len(),
        entities = data.each_entity_id.len(),
        meshes = data.each_mesh_geometries_portion.len(),
        "Wrote XKT"
    );
    Ok(buffer)
}

/// Concatenate sections behind the version/count/lengths header.
pub fn to_array_buffer(sections: &[Vec<u8>]) -> Vec<u8> {
    let header_len = 4 * (2 + sections.len());
    let body_len: usize = sections.iter().map(Vec::len).sum();
    let mut buffer = Vec::with_capacity(header_len + body_len);

    buffer.extend_from_slice(&XKT_VERSION.to_le_bytes());
    buffer.extend_from_slice(&(sections.len() as u32).to_le_bytes());
    for section in sections {
        buffer.extend_from_slice(&(section.len() as u32).to_le_bytes());
    }
    for section in sections {
        buffer.extend_from_slice(section);
    }
    buffer
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Replace every character from U+007F upward with `\uXXXX` escapes of its
/// UTF-16 code units, leaving the text pure ASCII.
pub fn escape_non_ascii(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut units = [0u16; 2];
    for ch in text.chars() {
        if (ch as u32) < 0x7F {
            escaped.push(ch);
        } else {
            for unit in ch.encode_utf16(&mut units) {
                let _ = write!(escaped, "\\u{:04x}", unit);
            }
        }
    }
    escaped
}

/// XKT primitive type code. Triangles split into solid (0) and surface (1).
pub fn primitive_type_code(primitive_type: PrimitiveType, solid: bool) -> u8 {
    match primitive_type {
        PrimitiveType::Triangles if solid => 0,
        PrimitiveType::Triangles => 1,
        PrimitiveType::Points => 2,
        PrimitiveType::Lines => 3,
        PrimitiveType::LineStrip | PrimitiveType::LineLoop => 4,
    }
}

fn unit_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).floor() as u8
}

/// Column-major single precision.
fn matrix_to_f32(matrix: &DMat4) -> [f32; 16] {
    matrix.to_cols_array().map(|v| v as f32)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelMetadata<'a> {
    id: &'a str,
    project_id: &'a str,
    revision_id: &'a str,
    author: &'a str,
    created_at: &'a str,
    creating_application: &'a str,
    schema: &'a str,
    property_sets: Vec<PropertySetEntry<'a>>,
    meta_objects: Vec<MetaObjectEntry<'a>>,
}

#[derive(Serialize)]
struct PropertySetEntry<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    property_set_type: &'a str,
    name: &'a str,
    properties: &'a [Property],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetaObjectEntry<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    meta_object_type: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    property_set_ids: &'a [String],
}

fn model_metadata_json(model: &XktModel) -> Result<String> {
    let config = model.config();
    let metadata = ModelMetadata {
        id: &config.model_id,
        project_id: &config.project_id,
        revision_id: &config.revision_id,
        author: &config.author,
        created_at: &config.created_at,
        creating_application: &config.creating_application,
        schema: &config.schema,
        property_sets: model
            .property_sets()
            .iter()
            .map(|set| PropertySetEntry {
                id: &set.property_set_id,
                property_set_type: &set.property_set_type,
                name: &set.property_set_name,
                properties: &set.properties,
            })
            .collect(),
        meta_objects: model
            .meta_objects()
            .iter()
            .map(|object| MetaObjectEntry {
                id: &object.meta_object_id,
                meta_object_type: &object.meta_object_type,
                name: &object.meta_object_name,
                parent: object.parent_meta_object_id.as_deref(),
                property_set_ids: &object.property_set_ids,
            })
            .collect(),
    };
    Ok(serde_json::to_string(&metadata)?)
}

trait LittleEndian: Copy {
    fn extend_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_little_endian {
    ($($t:ty),*) => {
        $(
            impl LittleEndian for $t {
                fn extend_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_little_endian!(i8, u16, u32, i32, f32, f64);

fn le_bytes<T: LittleEndian>(values: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(std::mem::size_of_val(values));
    for &value in values {
        value.extend_le(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::XktReader;
    use crate::model::{
        EntityParams, GeometryParams, MeshParams, MetaObjectParams, PropertySetParams,
        XktModelConfig,
    };
    use glam::DVec3;

    fn triangle_model() -> XktModel {
        let mut model = XktModel::new(XktModelConfig::default().with_model_id("m"));
        model
            .create_geometry(GeometryParams {
                geometry_id: "g".to_string(),
                primitive_type: Some(PrimitiveType::Triangles),
                positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                indices: Some(vec![0, 1, 2]),
                ..Default::default()
            })
            .unwrap();
        model
            .create_mesh(MeshParams {
                mesh_id: "mesh".to_string(),
                geometry_id: "g".to_string(),
                color: Some([1.0, 0.5, 0.0]),
                ..Default::default()
            })
            .unwrap();
        model
            .create_entity(EntityParams {
                entity_id: "e".to_string(),
                mesh_ids: vec!["mesh".to_string()],
            })
            .unwrap();
        model
    }

    #[test]
    fn test_unfinalized_model_is_rejected() {
        let model = triangle_model();
        assert!(matches!(
            write_xkt_model(&model, &WriteOptions::default()),
            Err(XktError::NotFinalized)
        ));
    }

    #[test]
    fn test_header_layout() {
        let mut model = triangle_model();
        model.finalize();
        let bytes = write_xkt_model(&model, &WriteOptions::default()).unwrap();

        let word = |i: usize| u32::from_le_bytes(bytes[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(word(0), XKT_VERSION);
        assert_eq!(word(1), 28);
        let lengths: usize = (0..28).map(|i| word(2 + i) as usize).sum();
        assert_eq!(bytes.len(), 4 * 30 + lengths);
    }

    #[test]
    fn test_single_triangle_sections() {
        let mut model = triangle_model();
        model.finalize();
        let bytes = write_xkt_model(&model, &WriteOptions::default()).unwrap();
        let reader = XktReader::parse(&bytes).unwrap();

        assert_eq!(reader.u16s(Section::Positions).unwrap().len(), 9);
        assert_eq!(reader.u32s(Section::Indices).unwrap(), vec![0, 1, 2]);
        assert_eq!(reader.u32s(Section::EachTileEntitiesPortion).unwrap(), vec![0]);
        assert_eq!(reader.f64s(Section::EachTileAabb).unwrap().len(), 6);
        assert_eq!(reader.entity_ids().unwrap(), vec!["e".to_string()]);
        assert_eq!(
            reader.section(Section::EachMeshMaterialAttributes),
            &[255, 127, 0, 255, 0, 255]
        );
        // A lone triangle is open, so it is a surface.
        assert_eq!(reader.section(Section::EachGeometryPrimitiveType), &[1]);
        assert_eq!(reader.i32s(Section::EachMeshTextureSet).unwrap(), vec![-1]);
        assert!(reader.f32s(Section::Matrices).unwrap().is_empty());
        let decode = reader.f32s(Section::ReusedGeometriesDecodeMatrix).unwrap();
        assert_eq!(decode, DMat4::IDENTITY.to_cols_array().map(|v| v as f32).to_vec());
    }

    #[test]
    fn test_reused_geometry_meshes_get_matrices() {
        let mut model = XktModel::default();
        model
            .create_geometry(GeometryParams {
                geometry_id: "g".to_string(),
                primitive_type: Some(PrimitiveType::Triangles),
                positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                indices: Some(vec![0, 1, 2]),
                ..Default::default()
            })
            .unwrap();
        for i in 0..2 {
            model
                .create_mesh(MeshParams {
                    mesh_id: format!("m{i}"),
                    geometry_id: "g".to_string(),
                    position: Some(DVec3::new(i as f64 * 5.0, 0.0, 0.0)),
                    ..Default::default()
                })
                .unwrap();
            model
                .create_entity(EntityParams {
                    entity_id: format!("e{i}"),
                    mesh_ids: vec![format!("m{i}")],
                })
                .unwrap();
        }
        model.finalize();

        let data = XktData::from_model(&model, &WriteOptions::default()).unwrap();
        assert_eq!(data.matrices.len(), 32);
        assert_eq!(data.each_mesh_matrices_portion, vec![0, 16]);
        assert_eq!(data.each_entity_meshes_portion, vec![0, 1]);
        assert_eq!(data.each_geometry_positions_portion, vec![0]);
    }

    #[test]
    fn test_metadata_json() {
        let mut model = triangle_model();
        model
            .create_property_set(PropertySetParams {
                property_set_id: "ps".to_string(),
                properties: vec![Property::new("Height", 2.5)],
                ..Default::default()
            })
            .unwrap();
        model
            .create_meta_object(MetaObjectParams {
                meta_object_id: "e".to_string(),
                meta_object_type: Some("IfcWall".to_string()),
                property_set_ids: vec!["ps".to_string()],
                ..Default::default()
            })
            .unwrap();
        model.finalize();

        let data = XktData::from_model(&model, &WriteOptions::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&data.metadata).unwrap();
        assert_eq!(json["id"], "m");
        assert_eq!(json["propertySets"][0]["type"], "Default");
        assert_eq!(json["propertySets"][0]["properties"][0]["value"], 2.5);
        assert_eq!(json["metaObjects"][0]["type"], "IfcWall");
        assert_eq!(json["metaObjects"][0]["propertySetIds"][0], "ps");
        assert!(json["metaObjects"][0].get("parent").is_none());
    }

    #[test]
    fn test_external_meta_model_replaces_metadata() {
        let mut model = triangle_model();
        model.finalize();
        let options = WriteOptions::default().with_meta_model_json(r#"{"metaObjects":[]}"#);
        let bytes = write_xkt_model(&model, &options).unwrap();
        let reader = XktReader::parse(&bytes).unwrap();
        assert_eq!(reader.json(Section::Metadata).unwrap()["metaObjects"], serde_json::json!([]));
    }

    #[test]
    fn test_escape_non_ascii() {
        assert_eq!(escape_non_ascii("abc"), "abc");
        assert_eq!(escape_non_ascii("é"), "\\u00e9");
        // Astral characters become a surrogate pair.
        assert_eq!(escape_non_ascii("😀"), "\\ud83d\\ude00");
        let escaped = escape_non_ascii(&serde_json::to_string(&["Türe"]).unwrap());
        assert!(escaped.is_ascii());
        let back: Vec<String> = serde_json::from_str(&escaped).unwrap();
        assert_eq!(back, vec!["Türe"]);
    }

    #[test]
    fn test_primitive_type_codes() {
        assert_eq!(primitive_type_code(PrimitiveType::Triangles, true), 0);
        assert_eq!(primitive_type_code(PrimitiveType::Triangles, false), 1);
        assert_eq!(primitive_type_code(PrimitiveType::Points, false), 2);
        assert_eq!(primitive_type_code(PrimitiveType::Lines, false), 3);
        assert_eq!(primitive_type_code(PrimitiveType::LineLoop, false), 4);
    }
}
