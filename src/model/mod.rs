//! The XKT document model.
//!
//! An [`XktModel`] is populated through its `create_*` methods, then
//! [`finalize`](XktModel::finalize)d once, which compresses geometry, builds
//! tiles and freezes the model for serialization.
//!
//! Creation follows two error channels. Missing required parameters are
//! programmer errors and return `Err`. Recoverable conditions (duplicate IDs,
//! dangling references, calls after finalize) are logged and return
//! `Ok(None)`, leaving the model unchanged.

mod config;
mod create;
mod entity;
mod finalize;
mod geometry;
pub mod kd_tree;
mod metadata;
mod texture;

pub use config::{XktModelConfig, DEFAULT_MAX_KD_TREE_DEPTH, DEFAULT_MIN_TILE_SIZE};
pub use entity::{Entity, EntityParams, Tile};
pub use finalize::{FinalizeReport, FinalizeStage, TextureFailure};
pub use geometry::{Geometry, GeometryParams, Mesh, MeshParams};
pub use metadata::{MetaObject, MetaObjectParams, Property, PropertySet, PropertySetParams};
pub use texture::{Texture, TextureParams, TextureSet, TextureSetParams};

use crate::texture::TextureEncoder;
use crate::types::Aabb;
use glam::DMat4;
use std::collections::HashMap;
use std::sync::Arc;

/// A model ready to be converted into XKT.
pub struct XktModel {
    config: XktModelConfig,

    property_sets: Vec<PropertySet>,
    property_set_map: HashMap<String, usize>,
    meta_objects: Vec<MetaObject>,
    meta_object_map: HashMap<String, usize>,
    textures: Vec<Texture>,
    texture_map: HashMap<String, usize>,
    texture_sets: Vec<TextureSet>,
    texture_set_map: HashMap<String, usize>,
    geometries: Vec<Geometry>,
    geometry_map: HashMap<String, usize>,
    meshes: Vec<Mesh>,
    mesh_map: HashMap<String, usize>,
    entities: Vec<Entity>,
    entity_map: HashMap<String, usize>,
    tiles: Vec<Tile>,

    reused_geometries_decode_matrix: DMat4,
    aabb: Aabb,
    finalized: bool,
    texture_encoder: Option<Arc<dyn TextureEncoder>>,
}

impl Default for XktModel {
    fn default() -> Self {
        Self::new(XktModelConfig::default())
    }
}

impl XktModel {
    pub fn new(config: XktModelConfig) -> Self {
        let aabb = config.model_aabb.unwrap_or_default();
        Self {
            config,
            property_sets: Vec::new(),
            property_set_map: HashMap::new(),
            meta_objects: Vec::new(),
            meta_object_map: HashMap::new(),
            textures: Vec::new(),
            texture_map: HashMap::new(),
            texture_sets: Vec::new(),
            texture_set_map: HashMap::new(),
            geometries: Vec::new(),
            geometry_map: HashMap::new(),
            meshes: Vec::new(),
            mesh_map: HashMap::new(),
            entities: Vec::new(),
            entity_map: HashMap::new(),
            tiles: Vec::new(),
            reused_geometries_decode_matrix: DMat4::IDENTITY,
            aabb,
            finalized: false,
            texture_encoder: None,
        }
    }

    /// Install the KTX2 encoder used for textures marked `compressed`.
    pub fn with_texture_encoder(mut self, encoder: Arc<dyn TextureEncoder>) -> Self {
        self.texture_encoder = Some(encoder);
        self
    }

    pub fn set_texture_encoder(&mut self, encoder: Arc<dyn TextureEncoder>) {
        self.texture_encoder = Some(encoder);
    }

    pub fn config(&self) -> &XktModelConfig {
        &self.config
    }

    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Model bounds; the k-d root bounds once finalized.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Decode matrix shared by every reused geometry.
    pub fn reused_geometries_decode_matrix(&self) -> &DMat4 {
        &self.reused_geometries_decode_matrix
    }

    pub fn property_sets(&self) -> &[PropertySet] {
        &self.property_sets
    }

    pub fn meta_objects(&self) -> &[MetaObject] {
        &self.meta_objects
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn texture_sets(&self) -> &[TextureSet] {
        &self.texture_sets
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Entities; in tile order once finalized.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn property_set(&self, id: &str) -> Option<&PropertySet> {
        self.property_set_map.get(id).map(|&i| &self.property_sets[i])
    }

    pub fn meta_object(&self, id: &str) -> Option<&MetaObject> {
        self.meta_object_map.get(id).map(|&i| &self.meta_objects[i])
    }

    pub fn texture(&self, id: &str) -> Option<&Texture> {
        self.texture_map.get(id).map(|&i| &self.textures[i])
    }

    pub fn texture_set(&self, id: &str) -> Option<&TextureSet> {
        self.texture_set_map.get(id).map(|&i| &self.texture_sets[i])
    }

    pub fn geometry(&self, id: &str) -> Option<&Geometry> {
        self.geometry_map.get(id).map(|&i| &self.geometries[i])
    }

    pub fn mesh(&self, id: &str) -> Option<&Mesh> {
        self.mesh_map.get(id).map(|&i| &self.meshes[i])
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entity_map.get(id).map(|&i| &self.entities[i])
    }
}
