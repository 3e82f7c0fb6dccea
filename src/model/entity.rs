//! Entities and tiles.

use crate::compression::create_positions_decode_matrix;
use crate::types::Aabb;
use glam::{DMat4, DVec3};

/// An identifiable object made of one or more meshes.
#[derive(Debug, Clone)]
pub struct Entity {
    pub entity_id: String,
    /// Position in serialization order; assigned during tiling.
    pub entity_index: usize,
    pub mesh_indices: Vec<usize>,
    /// World-space bounds, computed by finalize.
    pub aabb: Aabb,
    pub has_reused_geometries: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EntityParams {
    pub entity_id: String,
    pub mesh_ids: Vec<String>,
}

/// A spatial bucket of entities sharing a relative-to-center origin.
#[derive(Debug, Clone)]
pub struct Tile {
    /// World-space bounds of the k-d node this tile came from.
    pub aabb: Aabb,
    /// Indices into the model's entity list, contiguous and in order.
    pub entities: Vec<usize>,
}

impl Tile {
    /// The RTC origin of the tile.
    pub fn center(&self) -> DVec3 {
        self.aabb.center()
    }

    /// Matrix that decodes this tile's quantized positions into tile-local space.
    /// Add [`Tile::center`] to get world coordinates.
    pub fn positions_decode_matrix(&self) -> DMat4 {
        create_positions_decode_matrix(&self.aabb.translated(-self.center()))
    }
}
