//! glTF 2.0 scene-graph import.
//!
//! Walks the node hierarchy of a `.glb` or `.gltf` document and feeds it to an
//! [`XktModel`]: one geometry per (mesh, primitive) pair, one XKT mesh per
//! node primitive with the node's world matrix, and one entity per node that
//! carries a mesh.

use crate::error::{Result, XktError};
use crate::model::{
    EntityParams, GeometryParams, MeshParams, TextureParams, TextureSetParams, XktModel,
};
use crate::texture::load_image_from_bytes;
use crate::types::{MediaType, PrimitiveType, TextureFilter, TextureWrap};
use base64::Engine;
use glam::{DMat4, DQuat, DVec3};
use gltf_json as json;
use json::accessor::{ComponentType, Type};
use json::validation::Checked::Valid;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const GLB_MAGIC: u32 = 0x4654_6C67;
const GLB_CHUNK_JSON: u32 = 0x4E4F_534A;
const GLB_CHUNK_BIN: u32 = 0x004E_4942;

/// Largest accessor without a buffer view that is filled with zeros.
const MAX_ZEROED_ACCESSOR_VALUES: usize = 1 << 24;

/// glTF import settings.
#[derive(Debug, Clone)]
pub struct GltfImportOptions {
    /// Directory external buffers and images are resolved against.
    pub base_path: Option<PathBuf>,
    /// Import material textures and UVs.
    pub include_textures: bool,
    /// Import vertex normals.
    pub include_normals: bool,
}

impl Default for GltfImportOptions {
    fn default() -> Self {
        Self {
            base_path: None,
            include_textures: true,
            include_normals: true,
        }
    }
}

impl GltfImportOptions {
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }
}

/// Counts gathered while importing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GltfImportStats {
    pub num_nodes: usize,
    pub num_geometries: usize,
    pub num_meshes: usize,
    pub num_entities: usize,
    pub num_textures: usize,
    pub num_texture_sets: usize,
    pub num_triangles: usize,
    pub num_vertices: usize,
    pub num_normals: usize,
    pub num_uvs: usize,
    pub skipped_primitives: usize,
}

/// Parse a glTF or GLB document into `model`.
pub fn parse_gltf_into_xkt_model(
    model: &mut XktModel,
    bytes: &[u8],
    options: &GltfImportOptions,
) -> Result<GltfImportStats> {
    let document = GltfDocument::load(bytes, options.base_path.as_deref())?;
    let mut importer = Importer {
        document: &document,
        model,
        options,
        stats: GltfImportStats::default(),
        geometries: HashMap::new(),
        textures: HashMap::new(),
        texture_sets: HashMap::new(),
        next_mesh_id: 0,
    };
    importer.import_scene()?;
    debug!(stats = ?importer.stats, "glTF import complete");
    Ok(importer.stats)
}

/// A parsed document with all buffers resolved.
struct GltfDocument {
    root: json::Root,
    buffers: Vec<Vec<u8>>,
    base_path: Option<PathBuf>,
}

impl GltfDocument {
    fn load(bytes: &[u8], base_path: Option<&Path>) -> Result<Self> {
        let (json_chunk, bin_chunk) = if bytes.len() >= 4 && read_u32(bytes, 0)? == GLB_MAGIC {
            split_glb(bytes)?
        } else {
            (bytes, None)
        };

        let root: json::Root = serde_json::from_slice(json_chunk)?;
        let mut buffers = Vec::with_capacity(root.buffers.len());
        for (index, buffer) in root.buffers.iter().enumerate() {
            let data = match &buffer.uri {
                Some(uri) => load_uri(uri, base_path)?,
                None if index == 0 => bin_chunk
                    .ok_or_else(|| XktError::Gltf("buffer 0 has no uri and no BIN chunk".into()))?
                    .to_vec(),
                None => {
                    return Err(XktError::Gltf(format!("buffer {index} has no uri")));
                }
            };
            if (data.len() as u64) < buffer.byte_length.0 {
                return Err(XktError::Gltf(format!(
                    "buffer {index} is {} bytes, expected {}",
                    data.len(),
                    buffer.byte_length.0
                )));
            }
            buffers.push(data);
        }

        Ok(Self {
            root,
            buffers,
            base_path: base_path.map(Path::to_path_buf),
        })
    }

    fn buffer_view_bytes(&self, view_index: usize) -> Result<(&[u8], Option<usize>)> {
        let view = self
            .root
            .buffer_views
            .get(view_index)
            .ok_or_else(|| XktError::Gltf(format!("buffer view {view_index} not found")))?;
        let buffer = self
            .buffers
            .get(view.buffer.value())
            .ok_or_else(|| XktError::Gltf(format!("buffer {} not found", view.buffer.value())))?;
        let start = view.byte_offset.as_ref().map_or(0, |o| o.0 as usize);
        let bytes = start
            .checked_add(view.byte_length.0 as usize)
            .and_then(|end| buffer.get(start..end))
            .ok_or_else(|| XktError::Gltf(format!("buffer view {view_index} exceeds its buffer")))?;
        Ok((bytes, view.byte_stride.as_ref().map(|s| s.0)))
    }

    /// Read an accessor as raw component values, one `Vec` entry per component.
    fn read_accessor(&self, accessor_index: usize) -> Result<AccessorData> {
        let accessor = self
            .root
            .accessors
            .get(accessor_index)
            .ok_or_else(|| XktError::Gltf(format!("accessor {accessor_index} not found")))?;
        let (Valid(component_type), Valid(accessor_type)) =
            (&accessor.component_type, &accessor.type_)
        else {
            return Err(XktError::Gltf(format!(
                "accessor {accessor_index} has an invalid type"
            )));
        };
        let component_type = component_type.0;
        let components = type_components(*accessor_type);
        let count = usize::try_from(accessor.count.0).map_err(|_| {
            XktError::Gltf(format!("accessor {accessor_index} count is too large"))
        })?;
        if accessor.sparse.is_some() {
            warn!(accessor = accessor_index, "Sparse accessors are not supported, using base values");
        }

        let exceeds_view =
            || XktError::Gltf(format!("accessor {accessor_index} exceeds its view"));
        let num_values = count.checked_mul(components).ok_or_else(exceeds_view)?;

        let values = match &accessor.buffer_view {
            None => {
                if num_values > MAX_ZEROED_ACCESSOR_VALUES {
                    return Err(XktError::Gltf(format!(
                        "accessor {accessor_index} declares {count} elements without a buffer view"
                    )));
                }
                vec![0.0; num_values]
            }
            Some(view) => {
                let (bytes, stride) = self.buffer_view_bytes(view.value())?;
                let component_size = component_size(component_type);
                let element_size = component_size * components;
                let stride = stride.unwrap_or(element_size);
                let offset = accessor.byte_offset.as_ref().map_or(0, |o| o.0 as usize);
                if count > 0 {
                    let end = (count - 1)
                        .checked_mul(stride)
                        .and_then(|last| last.checked_add(offset))
                        .and_then(|last| last.checked_add(element_size))
                        .ok_or_else(exceeds_view)?;
                    if end > bytes.len() {
                        return Err(exceeds_view());
                    }
                }

                let mut values = Vec::with_capacity(num_values);
                for element in 0..count {
                    let base = offset + element * stride;
                    for component in 0..components {
                        let at = base + component * component_size;
                        let raw = bytes.get(at..at + component_size).ok_or_else(exceeds_view)?;
                        values.push(read_component(raw, component_type));
                    }
                }
                values
            }
        };

        Ok(AccessorData {
            values,
            components,
            component_type,
            normalized: accessor.normalized,
        })
    }

    fn image_bytes(&self, image_index: usize) -> Result<(Vec<u8>, Option<MediaType>)> {
        let image = self
            .root
            .images
            .get(image_index)
            .ok_or_else(|| XktError::Gltf(format!("image {image_index} not found")))?;
        let mut media_type = image
            .mime_type
            .as_ref()
            .and_then(|mime| MediaType::from_mime(&mime.0));
        let bytes = match (&image.buffer_view, &image.uri) {
            (Some(view), _) => self.buffer_view_bytes(view.value())?.0.to_vec(),
            (None, Some(uri)) => {
                if media_type.is_none() {
                    media_type = Path::new(uri)
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .and_then(MediaType::from_extension);
                }
                load_uri(uri, self.base_path.as_deref())?
            }
            (None, None) => {
                return Err(XktError::Gltf(format!("image {image_index} has no data")));
            }
        };
        Ok((bytes, media_type))
    }
}

struct AccessorData {
    values: Vec<f64>,
    components: usize,
    component_type: ComponentType,
    normalized: bool,
}

impl AccessorData {
    fn count(&self) -> usize {
        self.values.len() / self.components.max(1)
    }

    /// Float values, mapping normalized integers into [0, 1] or [-1, 1].
    fn to_f32(&self) -> Vec<f32> {
        self.values
            .iter()
            .map(|&v| {
                if self.normalized {
                    normalize_component(v, self.component_type) as f32
                } else {
                    v as f32
                }
            })
            .collect()
    }

    fn to_u32(&self) -> Vec<u32> {
        self.values.iter().map(|&v| v as u32).collect()
    }

    /// RGBA floats; RGB input gets an opaque alpha. Integer colors are
    /// normalized regardless of the accessor flag.
    fn to_rgba(&self) -> Vec<f32> {
        let normalize = |v: f64| match self.component_type {
            ComponentType::F32 => v as f32,
            other => normalize_component(v, other) as f32,
        };
        let mut rgba = Vec::with_capacity(self.count() * 4);
        for element in self.values.chunks_exact(self.components) {
            rgba.push(normalize(element[0]));
            rgba.push(element.get(1).map_or(0.0, |&v| normalize(v)));
            rgba.push(element.get(2).map_or(0.0, |&v| normalize(v)));
            rgba.push(element.get(3).map_or(1.0, |&v| normalize(v)));
        }
        rgba
    }
}

struct Importer<'a> {
    document: &'a GltfDocument,
    model: &'a mut XktModel,
    options: &'a GltfImportOptions,
    stats: GltfImportStats,
    /// XKT geometry ID per (glTF mesh, primitive), `None` if skipped.
    geometries: HashMap<(usize, usize), Option<String>>,
    /// XKT texture ID per glTF texture.
    textures: HashMap<usize, Option<String>>,
    /// XKT texture set ID per glTF material.
    texture_sets: HashMap<usize, Option<String>>,
    next_mesh_id: usize,
}

impl Importer<'_> {
    fn import_scene(&mut self) -> Result<()> {
        let document = self.document;
        let root = &document.root;
        let roots: Vec<usize> = match root
            .scene
            .map(|s| s.value())
            .or(if root.scenes.is_empty() { None } else { Some(0) })
        {
            Some(scene) => root
                .scenes
                .get(scene)
                .ok_or_else(|| XktError::Gltf(format!("scene {scene} not found")))?
                .nodes
                .iter()
                .map(|n| n.value())
                .collect(),
            None => {
                let mut is_child = vec![false; root.nodes.len()];
                for node in &root.nodes {
                    for child in node.children.iter().flatten() {
                        if let Some(flag) = is_child.get_mut(child.value()) {
                            *flag = true;
                        }
                    }
                }
                (0..root.nodes.len()).filter(|&i| !is_child[i]).collect()
            }
        };

        let mut on_path = vec![false; root.nodes.len()];
        for node in roots {
            self.visit_node(node, DMat4::IDENTITY, &mut on_path)?;
        }
        Ok(())
    }

    fn visit_node(&mut self, node_index: usize, parent: DMat4, on_path: &mut [bool]) -> Result<()> {
        let document = self.document;
        let node = document
            .root
            .nodes
            .get(node_index)
            .ok_or_else(|| XktError::Gltf(format!("node {node_index} not found")))?;
        if on_path[node_index] {
            return Err(XktError::Gltf(format!("node {node_index} is its own ancestor")));
        }
        on_path[node_index] = true;
        self.stats.num_nodes += 1;

        let matrix = parent * node_matrix(node);
        if let Some(mesh) = node.mesh {
            self.import_node_mesh(node_index, node, mesh.value(), matrix)?;
        }
        for child in node.children.iter().flatten() {
            self.visit_node(child.value(), matrix, on_path)?;
        }

        on_path[node_index] = false;
        Ok(())
    }

    fn import_node_mesh(
        &mut self,
        node_index: usize,
        node: &json::Node,
        mesh_index: usize,
        matrix: DMat4,
    ) -> Result<()> {
        let document = self.document;
        let mesh = document
            .root
            .meshes
            .get(mesh_index)
            .ok_or_else(|| XktError::Gltf(format!("mesh {mesh_index} not found")))?;

        let mut mesh_ids = Vec::new();
        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            let Some(geometry_id) = self.geometry_for(mesh_index, primitive_index, primitive)?
            else {
                continue;
            };

            let mut params = MeshParams {
                mesh_id: format!("mesh-{}", self.next_mesh_id),
                geometry_id,
                matrix: Some(matrix),
                ..Default::default()
            };
            self.next_mesh_id += 1;

            if let Some(material_index) = primitive.material.map(|m| m.value()) {
                if let Some(material) = document.root.materials.get(material_index) {
                    let pbr = &material.pbr_metallic_roughness;
                    let [r, g, b, a] = pbr.base_color_factor.0;
                    params.color = Some([r, g, b]);
                    params.opacity = Some(a);
                    params.metallic = Some(pbr.metallic_factor.0);
                    params.roughness = Some(pbr.roughness_factor.0);
                    if self.options.include_textures {
                        params.texture_set_id = self.texture_set_for(material_index, material)?;
                    }
                }
            }

            if let Some(mesh) = self.model.create_mesh(params)? {
                mesh_ids.push(mesh.mesh_id.clone());
                self.stats.num_meshes += 1;
            }
        }

        if mesh_ids.is_empty() {
            return Ok(());
        }
        let entity_id = node
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("entity-{node_index}"));
        if self
            .model
            .create_entity(EntityParams { entity_id, mesh_ids })?
            .is_some()
        {
            self.stats.num_entities += 1;
        }
        Ok(())
    }

    fn geometry_for(
        &mut self,
        mesh_index: usize,
        primitive_index: usize,
        primitive: &json::mesh::Primitive,
    ) -> Result<Option<String>> {
        if let Some(cached) = self.geometries.get(&(mesh_index, primitive_index)) {
            return Ok(cached.clone());
        }
        let geometry_id = self.create_geometry(mesh_index, primitive_index, primitive)?;
        self.geometries
            .insert((mesh_index, primitive_index), geometry_id.clone());
        Ok(geometry_id)
    }

    fn create_geometry(
        &mut self,
        mesh_index: usize,
        primitive_index: usize,
        primitive: &json::mesh::Primitive,
    ) -> Result<Option<String>> {
        let primitive_type = match &primitive.mode {
            Valid(json::mesh::Mode::Triangles) => PrimitiveType::Triangles,
            Valid(json::mesh::Mode::Points) => PrimitiveType::Points,
            Valid(json::mesh::Mode::Lines) => PrimitiveType::Lines,
            Valid(json::mesh::Mode::LineStrip) => PrimitiveType::LineStrip,
            Valid(json::mesh::Mode::LineLoop) => PrimitiveType::LineLoop,
            other => {
                warn!(mesh = mesh_index, primitive = primitive_index, mode = ?other, "Unsupported primitive mode, skipping");
                self.stats.skipped_primitives += 1;
                return Ok(None);
            }
        };

        let attribute = |semantic: json::mesh::Semantic| {
            primitive.attributes.get(&Valid(semantic)).map(|a| a.value())
        };
        let Some(position_accessor) = attribute(json::mesh::Semantic::Positions) else {
            warn!(mesh = mesh_index, primitive = primitive_index, "Primitive has no POSITION, skipping");
            self.stats.skipped_primitives += 1;
            return Ok(None);
        };

        let document = self.document;
        let positions_data = document.read_accessor(position_accessor)?;
        let num_vertices = positions_data.count();
        if num_vertices == 0 || positions_data.components != 3 {
            warn!(mesh = mesh_index, primitive = primitive_index, "Primitive has no usable positions, skipping");
            self.stats.skipped_primitives += 1;
            return Ok(None);
        }
        let positions: Vec<f64> = positions_data.to_f32().into_iter().map(f64::from).collect();

        let normals = match attribute(json::mesh::Semantic::Normals) {
            Some(accessor) if self.options.include_normals => {
                Some(document.read_accessor(accessor)?.to_f32())
            }
            _ => None,
        };
        let uvs = match attribute(json::mesh::Semantic::TexCoords(0)) {
            Some(accessor) if self.options.include_textures => {
                Some(document.read_accessor(accessor)?.to_f32())
            }
            _ => None,
        };
        let colors = match attribute(json::mesh::Semantic::Colors(0)) {
            Some(accessor) => Some(document.read_accessor(accessor)?.to_rgba()),
            None if primitive_type == PrimitiveType::Points => Some(vec![1.0; num_vertices * 4]),
            None => None,
        };

        let indices = match primitive.indices {
            Some(accessor) => Some(document.read_accessor(accessor.value())?.to_u32()),
            None if primitive_type == PrimitiveType::Points => None,
            None => Some((0..num_vertices as u32).collect()),
        };

        let geometry_id = format!("geometry-{mesh_index}-{primitive_index}");
        let created = self.model.create_geometry(GeometryParams {
            geometry_id: geometry_id.clone(),
            primitive_type: Some(primitive_type),
            positions,
            normals,
            colors,
            uvs,
            indices,
            ..Default::default()
        })?;
        let Some(geometry) = created else {
            return Ok(None);
        };

        self.stats.num_geometries += 1;
        self.stats.num_vertices += geometry.num_vertices();
        if primitive_type == PrimitiveType::Triangles {
            self.stats.num_triangles += geometry.indices.len() / 3;
        }
        self.stats.num_normals += geometry.normals.as_ref().map_or(0, |n| n.len() / 3);
        self.stats.num_uvs += geometry.uvs.as_ref().map_or(0, |uv| uv.len() / 2);
        Ok(Some(geometry_id))
    }

    fn texture_set_for(
        &mut self,
        material_index: usize,
        material: &json::Material,
    ) -> Result<Option<String>> {
        if let Some(cached) = self.texture_sets.get(&material_index) {
            return Ok(cached.clone());
        }

        let pbr = &material.pbr_metallic_roughness;
        let mut params = TextureSetParams {
            texture_set_id: format!("textureSet-{material_index}"),
            ..Default::default()
        };
        if let Some(info) = &pbr.base_color_texture {
            params.color_texture_id = self.texture_for(info.index.value())?;
        }
        if let Some(info) = &pbr.metallic_roughness_texture {
            params.metallic_roughness_texture_id = self.texture_for(info.index.value())?;
        }
        if let Some(normal) = &material.normal_texture {
            params.normals_texture_id = self.texture_for(normal.index.value())?;
        }
        if let Some(info) = &material.emissive_texture {
            params.emissive_texture_id = self.texture_for(info.index.value())?;
        }
        if let Some(occlusion) = &material.occlusion_texture {
            params.occlusion_texture_id = self.texture_for(occlusion.index.value())?;
        }

        let has_textures = params.color_texture_id.is_some()
            || params.metallic_roughness_texture_id.is_some()
            || params.normals_texture_id.is_some()
            || params.emissive_texture_id.is_some()
            || params.occlusion_texture_id.is_some();
        let texture_set_id = if has_textures {
            let texture_set_id = params.texture_set_id.clone();
            match self.model.create_texture_set(params)? {
                Some(_) => {
                    self.stats.num_texture_sets += 1;
                    Some(texture_set_id)
                }
                None => None,
            }
        } else {
            None
        };
        self.texture_sets
            .insert(material_index, texture_set_id.clone());
        Ok(texture_set_id)
    }

    fn texture_for(&mut self, texture_index: usize) -> Result<Option<String>> {
        if let Some(cached) = self.textures.get(&texture_index) {
            return Ok(cached.clone());
        }
        let texture_id = self.create_texture(texture_index)?;
        self.textures.insert(texture_index, texture_id.clone());
        Ok(texture_id)
    }

    /// Decode a glTF texture's image. Images that cannot be loaded are
    /// skipped with a warning.
    fn create_texture(&mut self, texture_index: usize) -> Result<Option<String>> {
        let document = self.document;
        let Some(texture) = document.root.textures.get(texture_index) else {
            warn!(texture = texture_index, "Texture not found");
            return Ok(None);
        };

        let (bytes, media_type) = match document.image_bytes(texture.source.value()) {
            Ok(image) => image,
            Err(e) => {
                warn!(texture = texture_index, error = %e, "Failed to load texture image");
                return Ok(None);
            }
        };
        let image = match load_image_from_bytes(&bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!(texture = texture_index, error = %e, "Failed to decode texture image");
                return Ok(None);
            }
        };

        let mut params = TextureParams {
            texture_id: format!("texture-{texture_index}"),
            width: image.width,
            height: image.height,
            image_data: Some(image.pixels),
            media_type,
            ..Default::default()
        };
        if let Some(sampler) = texture
            .sampler
            .and_then(|s| document.root.samplers.get(s.value()))
        {
            if let Some(Valid(filter)) = &sampler.min_filter {
                if let Some(filter) = TextureFilter::from_gl(filter.as_gl_enum()) {
                    params.min_filter = filter;
                }
            }
            if let Some(Valid(filter)) = &sampler.mag_filter {
                if let Some(filter) = TextureFilter::from_gl(filter.as_gl_enum()) {
                    params.mag_filter = filter;
                }
            }
            if let Valid(wrap) = &sampler.wrap_s {
                if let Some(wrap) = TextureWrap::from_gl(wrap.as_gl_enum()) {
                    params.wrap_s = wrap;
                }
            }
            if let Valid(wrap) = &sampler.wrap_t {
                if let Some(wrap) = TextureWrap::from_gl(wrap.as_gl_enum()) {
                    params.wrap_t = wrap;
                }
            }
        }

        let texture_id = params.texture_id.clone();
        if self.model.create_texture(params)?.is_none() {
            return Ok(None);
        }
        self.stats.num_textures += 1;
        Ok(Some(texture_id))
    }
}

/// Local transform of a node: its matrix, or T * R * S.
fn node_matrix(node: &json::Node) -> DMat4 {
    if let Some(matrix) = node.matrix {
        return DMat4::from_cols_array(&matrix.map(f64::from));
    }
    let translation = node
        .translation
        .map_or(DVec3::ZERO, |t| DVec3::new(t[0].into(), t[1].into(), t[2].into()));
    let rotation = node.rotation.as_ref().map_or(DQuat::IDENTITY, |r| {
        let [x, y, z, w] = r.0;
        DQuat::from_xyzw(x.into(), y.into(), z.into(), w.into()).normalize()
    });
    let scale = node
        .scale
        .map_or(DVec3::ONE, |s| DVec3::new(s[0].into(), s[1].into(), s[2].into()));
    DMat4::from_scale_rotation_translation(scale, rotation, translation)
}

fn split_glb(bytes: &[u8]) -> Result<(&[u8], Option<&[u8]>)> {
    let version = read_u32(bytes, 4)?;
    if version != 2 {
        return Err(XktError::Gltf(format!("unsupported GLB version {version}")));
    }
    let length = (read_u32(bytes, 8)? as usize).min(bytes.len());

    let mut json_chunk = None;
    let mut bin_chunk = None;
    let mut offset = 12;
    while offset + 8 <= length {
        let chunk_length = read_u32(bytes, offset)? as usize;
        let chunk_type = read_u32(bytes, offset + 4)?;
        let start = offset + 8;
        let data = bytes
            .get(start..start + chunk_length)
            .ok_or_else(|| XktError::Gltf("GLB chunk exceeds file length".into()))?;
        match chunk_type {
            GLB_CHUNK_JSON if json_chunk.is_none() => json_chunk = Some(data),
            GLB_CHUNK_BIN if bin_chunk.is_none() => bin_chunk = Some(data),
            _ => {}
        }
        offset = start + chunk_length;
    }

    let json_chunk = json_chunk.ok_or_else(|| XktError::Gltf("GLB has no JSON chunk".into()))?;
    Ok((json_chunk, bin_chunk))
}

fn load_uri(uri: &str, base_path: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(rest) = uri.strip_prefix("data:") {
        let (_, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| XktError::Gltf("only base64 data URIs are supported".into()))?;
        return base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| XktError::Gltf(format!("invalid base64 data URI: {e}")));
    }
    let base_path = base_path.ok_or_else(|| {
        XktError::Gltf(format!("external resource {uri} needs a base path"))
    })?;
    Ok(std::fs::read(base_path.join(uri))?)
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    bytes
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| XktError::Gltf("unexpected end of GLB".into()))
}

fn type_components(accessor_type: Type) -> usize {
    match accessor_type {
        Type::Scalar => 1,
        Type::Vec2 => 2,
        Type::Vec3 => 3,
        Type::Vec4 | Type::Mat2 => 4,
        Type::Mat3 => 9,
        Type::Mat4 => 16,
    }
}

fn component_size(component_type: ComponentType) -> usize {
    match component_type {
        ComponentType::I8 | ComponentType::U8 => 1,
        ComponentType::I16 | ComponentType::U16 => 2,
        ComponentType::U32 | ComponentType::F32 => 4,
    }
}

fn read_component(raw: &[u8], component_type: ComponentType) -> f64 {
    match component_type {
        ComponentType::I8 => f64::from(raw[0] as i8),
        ComponentType::U8 => f64::from(raw[0]),
        ComponentType::I16 => f64::from(i16::from_le_bytes([raw[0], raw[1]])),
        ComponentType::U16 => f64::from(u16::from_le_bytes([raw[0], raw[1]])),
        ComponentType::U32 => f64::from(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
        ComponentType::F32 => f64::from(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
    }
}

fn normalize_component(value: f64, component_type: ComponentType) -> f64 {
    match component_type {
        ComponentType::I8 => (value / 127.0).max(-1.0),
        ComponentType::U8 => value / 255.0,
        ComponentType::I16 => (value / 32767.0).max(-1.0),
        ComponentType::U16 => value / 65535.0,
        ComponentType::U32 => value / u32::MAX as f64,
        ComponentType::F32 => value,
    }
}
