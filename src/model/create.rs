//! Element creation.

use super::{
    Entity, EntityParams, Geometry, GeometryParams, Mesh, MeshParams, MetaObject,
    MetaObjectParams, PropertySet, PropertySetParams, Texture, TextureParams, TextureSet,
    TextureSetParams, XktModel,
};
use crate::error::{Result, XktError};
use crate::geometry::{build_edge_indices, merge_vertices};
use crate::types::{Aabb, MediaType, PrimitiveType, TextureChannel};
use tracing::{error, warn};

impl XktModel {
    /// Register a property set.
    pub fn create_property_set(
        &mut self,
        params: PropertySetParams,
    ) -> Result<Option<&PropertySet>> {
        if params.property_set_id.is_empty() {
            return Err(XktError::MissingParameter("property_set_id"));
        }
        if self.finalized {
            error!("XktModel has been finalized, can't add more property sets");
            return Ok(None);
        }
        if self.property_set_map.contains_key(&params.property_set_id) {
            error!(id = %params.property_set_id, "PropertySet already exists");
            return Ok(None);
        }

        let index = self.property_sets.len();
        let property_set_name = params
            .property_set_name
            .unwrap_or_else(|| params.property_set_id.clone());
        self.property_set_map
            .insert(params.property_set_id.clone(), index);
        self.property_sets.push(PropertySet {
            property_set_id: params.property_set_id,
            property_set_type: params
                .property_set_type
                .unwrap_or_else(|| "Default".to_string()),
            property_set_name,
            properties: params.properties,
        });
        Ok(self.property_sets.last())
    }

    /// Register a metaobject. Parent and property set references are not checked.
    pub fn create_meta_object(&mut self, params: MetaObjectParams) -> Result<Option<&MetaObject>> {
        if params.meta_object_id.is_empty() {
            return Err(XktError::MissingParameter("meta_object_id"));
        }
        if self.finalized {
            error!("XktModel has been finalized, can't add more metaobjects");
            return Ok(None);
        }
        if self.meta_object_map.contains_key(&params.meta_object_id) {
            error!(id = %params.meta_object_id, "MetaObject already exists");
            return Ok(None);
        }

        let index = self.meta_objects.len();
        let meta_object_name = params
            .meta_object_name
            .unwrap_or_else(|| params.meta_object_id.clone());
        self.meta_object_map
            .insert(params.meta_object_id.clone(), index);
        self.meta_objects.push(MetaObject {
            meta_object_id: params.meta_object_id,
            meta_object_type: params
                .meta_object_type
                .unwrap_or_else(|| "default".to_string()),
            meta_object_name,
            parent_meta_object_id: params.parent_meta_object_id,
            property_set_ids: params.property_set_ids,
        });
        Ok(self.meta_objects.last())
    }

    /// Register a texture from decoded pixels or an image file.
    ///
    /// Pixel data is compressed during [`finalize`](Self::finalize); a texture
    /// no texture set binds is dropped there.
    pub fn create_texture(&mut self, params: TextureParams) -> Result<Option<&Texture>> {
        if params.texture_id.is_empty() {
            return Err(XktError::MissingParameter("texture_id"));
        }
        if params.image_data.is_none() && params.src.is_none() {
            return Err(XktError::MissingParameter("image_data or src"));
        }
        if self.finalized {
            error!("XktModel has been finalized, can't add more textures");
            return Ok(None);
        }
        if self.texture_map.contains_key(&params.texture_id) {
            error!(id = %params.texture_id, "Texture already exists");
            return Ok(None);
        }

        let mut media_type = params.media_type;
        if let Some(src) = &params.src {
            let extension = src
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default();
            match MediaType::from_extension(extension) {
                Some(MediaType::Jpeg) | Some(MediaType::Png) => {
                    media_type = media_type.or(MediaType::from_extension(extension));
                }
                _ => {
                    error!(
                        id = %params.texture_id,
                        src = %src.display(),
                        "Texture has unsupported file extension, expected jpg, jpeg or png"
                    );
                    return Ok(None);
                }
            }
        }

        let index = self.textures.len();
        self.texture_map.insert(params.texture_id.clone(), index);
        self.textures.push(Texture {
            texture_id: params.texture_id,
            texture_index: index,
            image_data: params.image_data,
            src: params.src,
            media_type,
            width: params.width,
            height: params.height,
            min_filter: params.min_filter,
            mag_filter: params.mag_filter,
            wrap_s: params.wrap_s,
            wrap_t: params.wrap_t,
            wrap_r: params.wrap_r,
            channel: None,
            compressed: params.compressed,
        });
        Ok(self.textures.last())
    }

    /// Group up to five existing textures, tagging each with its channel.
    pub fn create_texture_set(&mut self, params: TextureSetParams) -> Result<Option<&TextureSet>> {
        if params.texture_set_id.is_empty() {
            return Err(XktError::MissingParameter("texture_set_id"));
        }
        if self.finalized {
            error!("XktModel has been finalized, can't add more texture sets");
            return Ok(None);
        }
        if self.texture_set_map.contains_key(&params.texture_set_id) {
            error!(id = %params.texture_set_id, "TextureSet already exists");
            return Ok(None);
        }

        let mut resolved = [None, None, None, None, None];
        for (slot, texture_id) in params.texture_ids().into_iter().enumerate() {
            let Some(texture_id) = texture_id else {
                continue;
            };
            match self.texture_map.get(texture_id) {
                Some(&texture_index) => resolved[slot] = Some(texture_index),
                None => {
                    error!(
                        texture_set = %params.texture_set_id,
                        texture = %texture_id,
                        "Texture not found"
                    );
                    return Ok(None);
                }
            }
        }

        let mut textures: [Option<String>; 5] = Default::default();
        for (channel, texture_index) in TextureChannel::ALL.iter().zip(resolved) {
            if let Some(texture_index) = texture_index {
                let texture = &mut self.textures[texture_index];
                texture.channel = Some(*channel);
                textures[*channel as usize] = Some(texture.texture_id.clone());
            }
        }

        let index = self.texture_sets.len();
        self.texture_set_map
            .insert(params.texture_set_id.clone(), index);
        self.texture_sets.push(TextureSet {
            texture_set_id: params.texture_set_id,
            texture_set_index: index,
            textures,
            num_instances: 0,
        });
        Ok(self.texture_sets.last())
    }

    /// Register a geometry.
    ///
    /// Triangle geometries without normals or UVs have duplicate vertices
    /// merged. Edge indices for triangles are computed here.
    pub fn create_geometry(&mut self, params: GeometryParams) -> Result<Option<&Geometry>> {
        if params.geometry_id.is_empty() {
            return Err(XktError::MissingParameter("geometry_id"));
        }
        let primitive_type = params
            .primitive_type
            .ok_or(XktError::MissingParameter("primitive_type"))?;
        if params.positions.is_empty() {
            return Err(XktError::MissingParameter("positions"));
        }
        if params.positions.len() % 3 != 0 {
            return Err(XktError::InvalidArgument(format!(
                "positions length {} is not a multiple of 3",
                params.positions.len()
            )));
        }
        match primitive_type {
            PrimitiveType::Triangles | PrimitiveType::Lines if params.indices.is_none() => {
                return Err(XktError::MissingParameter("indices"));
            }
            PrimitiveType::Points
                if params.colors.is_none() && params.colors_compressed.is_none() =>
            {
                return Err(XktError::MissingParameter("colors or colors_compressed"));
            }
            _ => {}
        }
        let num_vertices = params.positions.len() / 3;
        if let Some(indices) = &params.indices {
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= num_vertices) {
                return Err(XktError::InvalidArgument(format!(
                    "index {bad} out of range for {num_vertices} vertices"
                )));
            }
        }

        if self.finalized {
            error!("XktModel has been finalized, can't add more geometries");
            return Ok(None);
        }
        if self.geometry_map.contains_key(&params.geometry_id) {
            error!(id = %params.geometry_id, "Geometry already exists");
            return Ok(None);
        }

        let triangles = primitive_type == PrimitiveType::Triangles;
        let points = primitive_type == PrimitiveType::Points;

        let mut positions = params.positions;
        let mut indices = if points {
            Vec::new()
        } else {
            params.indices.unwrap_or_default()
        };

        if triangles && params.normals.is_none() && params.uvs.is_none() {
            let (merged_positions, merged_indices) = merge_vertices(&positions, &indices);
            positions = merged_positions;
            indices = merged_indices;
        }

        let colors_compressed = if points {
            match (params.colors_compressed, params.colors) {
                (Some(compressed), _) => Some(compressed),
                (None, Some(colors)) => Some(compress_colors(&colors)),
                (None, None) => None,
            }
        } else {
            None
        };

        let edge_indices = if triangles {
            let threshold = params.edge_threshold.unwrap_or(self.config.edge_threshold);
            build_edge_indices(&positions, &indices, None, threshold).into_u32()
        } else {
            Vec::new()
        };

        let index = self.geometries.len();
        self.geometry_map.insert(params.geometry_id.clone(), index);
        self.geometries.push(Geometry {
            geometry_id: params.geometry_id,
            geometry_index: index,
            primitive_type,
            positions,
            positions_quantized: Vec::new(),
            normals: if triangles { params.normals } else { None },
            normals_oct_encoded: None,
            colors_compressed,
            uvs: params.uvs,
            indices,
            edge_indices,
            num_instances: 0,
            solid: false,
        });
        Ok(self.geometries.last())
    }

    /// Place a geometry, optionally with a texture set.
    pub fn create_mesh(&mut self, params: MeshParams) -> Result<Option<&Mesh>> {
        if params.mesh_id.is_empty() {
            return Err(XktError::MissingParameter("mesh_id"));
        }
        if params.geometry_id.is_empty() {
            return Err(XktError::MissingParameter("geometry_id"));
        }
        if self.finalized {
            error!("XktModel has been finalized, can't add more meshes");
            return Ok(None);
        }
        if self.mesh_map.contains_key(&params.mesh_id) {
            error!(id = %params.mesh_id, "Mesh already exists");
            return Ok(None);
        }
        let Some(&geometry_index) = self.geometry_map.get(&params.geometry_id) else {
            error!(mesh = %params.mesh_id, geometry = %params.geometry_id, "Geometry not found");
            return Ok(None);
        };
        let texture_set_index = match &params.texture_set_id {
            Some(id) => match self.texture_set_map.get(id) {
                Some(&i) => Some(i),
                None => {
                    error!(mesh = %params.mesh_id, texture_set = %id, "TextureSet not found");
                    return Ok(None);
                }
            },
            None => None,
        };

        self.geometries[geometry_index].num_instances += 1;
        if let Some(i) = texture_set_index {
            self.texture_sets[i].num_instances += 1;
        }

        let matrix = params.resolve_matrix();
        let index = self.meshes.len();
        self.mesh_map.insert(params.mesh_id.clone(), index);
        self.meshes.push(Mesh {
            mesh_id: params.mesh_id,
            mesh_index: index,
            matrix,
            geometry_index,
            texture_set_index,
            color: params.color.unwrap_or([1.0, 1.0, 1.0]),
            metallic: params.metallic.unwrap_or(0.0),
            roughness: params.roughness.unwrap_or(1.0),
            opacity: params.opacity.unwrap_or(1.0),
            entity_id: None,
        });
        Ok(self.meshes.last())
    }

    /// Group meshes into an entity.
    ///
    /// A colliding entity ID is replaced by a fresh UUID. Meshes that are
    /// unknown or already owned by another entity are skipped; if none remain
    /// the entity is not created.
    pub fn create_entity(&mut self, params: EntityParams) -> Result<Option<&Entity>> {
        if params.entity_id.is_empty() {
            return Err(XktError::MissingParameter("entity_id"));
        }
        if self.finalized {
            error!("XktModel has been finalized, can't add more entities");
            return Ok(None);
        }
        if params.mesh_ids.is_empty() {
            warn!(id = %params.entity_id, "Entity has no meshes, ignoring");
            return Ok(None);
        }

        let mut entity_id = params.entity_id;
        if self.entity_map.contains_key(&entity_id) {
            let original = entity_id;
            entity_id = uuid::Uuid::new_v4().to_string();
            while self.entity_map.contains_key(&entity_id) {
                entity_id = uuid::Uuid::new_v4().to_string();
            }
            error!(
                id = %original,
                replacement = %entity_id,
                "Entity already exists, using a generated ID"
            );
        }

        let mut mesh_indices = Vec::with_capacity(params.mesh_ids.len());
        for mesh_id in &params.mesh_ids {
            let Some(&mesh_index) = self.mesh_map.get(mesh_id) else {
                warn!(entity = %entity_id, mesh = %mesh_id, "Mesh not found, skipping");
                continue;
            };
            if let Some(owner) = &self.meshes[mesh_index].entity_id {
                warn!(
                    entity = %entity_id,
                    mesh = %mesh_id,
                    owner = %owner,
                    "Mesh already used by another entity, skipping"
                );
                continue;
            }
            mesh_indices.push(mesh_index);
        }
        if mesh_indices.is_empty() {
            warn!(id = %entity_id, "Entity has no usable meshes, ignoring");
            return Ok(None);
        }

        for &mesh_index in &mesh_indices {
            self.meshes[mesh_index].entity_id = Some(entity_id.clone());
        }

        let index = self.entities.len();
        self.entity_map.insert(entity_id.clone(), index);
        self.entities.push(Entity {
            entity_id,
            entity_index: index,
            mesh_indices,
            aabb: Aabb::collapsed(),
            has_reused_geometries: false,
        });
        Ok(self.entities.last())
    }

    /// Give every entity without a metaobject a default one, parented to a
    /// root metaobject that carries the model ID.
    pub fn create_default_meta_objects(&mut self) -> Result<()> {
        let root_id = self.config.model_id.clone();
        let missing: Vec<String> = self
            .entities
            .iter()
            .filter(|entity| !self.meta_object_map.contains_key(&entity.entity_id))
            .map(|entity| entity.entity_id.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        if !self.meta_object_map.contains_key(&root_id) {
            self.create_meta_object(MetaObjectParams {
                meta_object_id: root_id.clone(),
                meta_object_type: Some("Default".to_string()),
                meta_object_name: Some(root_id.clone()),
                ..Default::default()
            })?;
        }

        for entity_id in missing {
            self.create_meta_object(MetaObjectParams {
                meta_object_id: entity_id.clone(),
                meta_object_type: Some("Default".to_string()),
                meta_object_name: Some(entity_id),
                parent_meta_object_id: Some(root_id.clone()),
                ..Default::default()
            })?;
        }
        Ok(())
    }
}

/// Float RGBA in 0-1 to bytes.
fn compress_colors(colors: &[f32]) -> Vec<u8> {
    colors
        .iter()
        .map(|&c| (c.clamp(0.0, 1.0) * 255.0).floor() as u8)
        .collect()
}
