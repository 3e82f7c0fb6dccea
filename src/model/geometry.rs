//! Geometry and mesh elements.

use crate::types::PrimitiveType;
use glam::{DMat4, DVec3};

/// Shared shape data, instanced by one or more meshes.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub geometry_id: String,
    pub geometry_index: usize,
    pub primitive_type: PrimitiveType,
    /// Full-precision positions. Baked to world space (single-use) or shifted
    /// to tile-local space during finalize.
    pub positions: Vec<f64>,
    /// Quantized positions, filled in by finalize.
    pub positions_quantized: Vec<u16>,
    pub normals: Option<Vec<f32>>,
    /// Oct-encoded normals, two bytes each plus a zero pad byte.
    pub normals_oct_encoded: Option<Vec<i8>>,
    /// Per-vertex RGBA colors in 0-255.
    pub colors_compressed: Option<Vec<u8>>,
    pub uvs: Option<Vec<f32>>,
    pub indices: Vec<u32>,
    pub edge_indices: Vec<u32>,
    /// Number of meshes using this geometry.
    pub num_instances: u32,
    /// Closed triangle mesh; set by finalize.
    pub solid: bool,
}

impl Geometry {
    /// More than one mesh instances this geometry.
    pub fn is_reused(&self) -> bool {
        self.num_instances > 1
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.len() / 3
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeometryParams {
    pub geometry_id: String,
    pub primitive_type: Option<PrimitiveType>,
    pub positions: Vec<f64>,
    pub normals: Option<Vec<f32>>,
    /// Float RGBA colors in 0-1, compressed on creation.
    pub colors: Option<Vec<f32>>,
    pub colors_compressed: Option<Vec<u8>>,
    pub uvs: Option<Vec<f32>>,
    pub indices: Option<Vec<u32>>,
    /// Overrides the model's edge threshold, in degrees.
    pub edge_threshold: Option<f64>,
}

/// A placement of a geometry with its own transform and material.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub mesh_id: String,
    pub mesh_index: usize,
    /// Modeling matrix. Reset to identity in effect when positions are baked.
    pub matrix: DMat4,
    pub geometry_index: usize,
    pub texture_set_index: Option<usize>,
    pub color: [f32; 3],
    pub metallic: f32,
    pub roughness: f32,
    pub opacity: f32,
    /// Entity that claimed this mesh.
    pub entity_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MeshParams {
    pub mesh_id: String,
    pub geometry_id: String,
    pub texture_set_id: Option<String>,
    /// Takes precedence over position/scale/rotation.
    pub matrix: Option<DMat4>,
    pub position: Option<DVec3>,
    pub scale: Option<DVec3>,
    /// Euler angles in degrees, applied in XYZ order.
    pub rotation: Option<DVec3>,
    pub color: Option<[f32; 3]>,
    pub metallic: Option<f32>,
    pub roughness: Option<f32>,
    pub opacity: Option<f32>,
}

impl MeshParams {
    /// Resolve the modeling matrix from the explicit matrix or the
    /// position/scale/rotation triple.
    pub(crate) fn resolve_matrix(&self) -> DMat4 {
        if let Some(matrix) = self.matrix {
            return matrix;
        }
        if self.position.is_none() && self.scale.is_none() && self.rotation.is_none() {
            return DMat4::IDENTITY;
        }
        let translation = self.position.unwrap_or(DVec3::ZERO);
        let scale = self.scale.unwrap_or(DVec3::ONE);
        let rotation = self.rotation.unwrap_or(DVec3::ZERO);
        let quat = glam::DQuat::from_euler(
            glam::EulerRot::XYZ,
            rotation.x.to_radians(),
            rotation.y.to_radians(),
            rotation.z.to_radians(),
        );
        DMat4::from_scale_rotation_translation(scale, quat, translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_explicit_matrix_wins() {
        let matrix = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
        let params = MeshParams {
            matrix: Some(matrix),
            position: Some(DVec3::new(9.0, 9.0, 9.0)),
            ..Default::default()
        };
        assert_eq!(params.resolve_matrix(), matrix);
    }

    #[test]
    fn test_no_transform_is_identity() {
        assert_eq!(MeshParams::default().resolve_matrix(), DMat4::IDENTITY);
    }

    #[test]
    fn test_trs_composition() {
        let params = MeshParams {
            position: Some(DVec3::new(10.0, 0.0, 0.0)),
            scale: Some(DVec3::splat(2.0)),
            rotation: Some(DVec3::new(0.0, 0.0, 90.0)),
            ..Default::default()
        };
        let p = params.resolve_matrix().transform_point3(DVec3::X);
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-9);
    }
}
