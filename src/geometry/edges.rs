//! Feature-edge extraction for edge rendering.

use super::welding::WeldedVertices;
use super::IndexBuffer;
use crate::types::transform_point;
use glam::{DMat4, DVec3};
use rustc_hash::FxHashMap;

struct EdgeFaces {
    welded_a: u32,
    welded_b: u32,
    face1: usize,
    face2: Option<usize>,
}

/// Compute the edges of a triangle mesh that should be drawn as lines.
///
/// Vertices are welded at 4-decimal precision first, so seams between
/// split vertices do not show up as edges. An edge shared by two faces is
/// dropped when the faces are within `edge_threshold_degrees` of coplanar;
/// boundary edges are always kept. Returned indices refer to the original
/// (unwelded) vertices.
///
/// `decode_matrix` is applied to the positions before face normals are
/// computed, for callers holding quantized coordinates.
pub fn build_edge_indices(
    positions: &[f64],
    indices: &[u32],
    decode_matrix: Option<&DMat4>,
    edge_threshold_degrees: f64,
) -> IndexBuffer {
    let welded = WeldedVertices::new(positions);
    let welded_indices = welded.remap(indices);

    // One representative original vertex per welded vertex; the last wins.
    let mut reverse_lookup = vec![0u32; welded.len()];
    for (&original, &w) in indices.iter().zip(&welded_indices) {
        reverse_lookup[w as usize] = original;
    }

    let vertex = |w: u32| -> DVec3 {
        let i = w as usize * 3;
        let p = DVec3::new(
            welded.positions[i],
            welded.positions[i + 1],
            welded.positions[i + 2],
        );
        match decode_matrix {
            Some(m) => transform_point(m, p),
            None => p,
        }
    };

    let face_normals: Vec<DVec3> = welded_indices
        .chunks_exact(3)
        .map(|tri| {
            let a = vertex(tri[0]);
            let b = vertex(tri[1]);
            let c = vertex(tri[2]);
            (c - b).cross(a - b).normalize_or_zero()
        })
        .collect();

    let mut edge_lookup: FxHashMap<(u32, u32), usize> = FxHashMap::default();
    let mut edges: Vec<EdgeFaces> = Vec::new();
    for (face, tri) in welded_indices.chunks_exact(3).enumerate() {
        for j in 0..3 {
            let e1 = tri[j];
            let e2 = tri[(j + 1) % 3];
            let key = (e1.min(e2), e1.max(e2));
            match edge_lookup.get(&key) {
                Some(&slot) => edges[slot].face2 = Some(face),
                None => {
                    edge_lookup.insert(key, edges.len());
                    edges.push(EdgeFaces {
                        welded_a: key.0,
                        welded_b: key.1,
                        face1: face,
                        face2: None,
                    });
                }
            }
        }
    }

    let threshold_dot = edge_threshold_degrees.to_radians().cos();
    let mut edge_indices = Vec::with_capacity(edges.len() * 2);
    for edge in &edges {
        if let Some(face2) = edge.face2 {
            let normal1 = face_normals[edge.face1];
            let normal2 = face_normals[face2];
            let dot = normal1.dot(normal2).abs();
            let dot_inverse = normal1.dot(-normal2).abs();
            if dot > threshold_dot && dot_inverse > threshold_dot {
                continue;
            }
        }
        edge_indices.push(reverse_lookup[edge.welded_a as usize]);
        edge_indices.push(reverse_lookup[edge.welded_b as usize]);
    }

    IndexBuffer::from_indices(edge_indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn edge_set(buffer: IndexBuffer) -> HashSet<(u32, u32)> {
        buffer
            .into_u32()
            .chunks_exact(2)
            .map(|e| (e[0].min(e[1]), e[0].max(e[1])))
            .collect()
    }

    #[test]
    fn test_coplanar_quad_drops_diagonal() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let indices = [0, 1, 2, 0, 2, 3];
        let edges = edge_set(build_edge_indices(&positions, &indices, None, 10.0));

        let expected: HashSet<(u32, u32)> = [(0, 1), (1, 2), (2, 3), (0, 3)].into_iter().collect();
        assert_eq!(edges, expected);
    }

    #[test]
    fn test_folded_quad_keeps_crease() {
        // Second triangle bent 90 degrees out of plane along the diagonal.
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.5, 0.5, 1.0];
        let indices = [0, 1, 2, 0, 2, 3];
        let edges = edge_set(build_edge_indices(&positions, &indices, None, 10.0));
        assert!(edges.contains(&(0, 2)));
        assert_eq!(edges.len(), 5);
    }

    #[test]
    fn test_split_vertices_are_welded() {
        // Coplanar quad whose triangles do not share vertex indices.
        let positions = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
        ];
        let indices = [0, 1, 2, 3, 4, 5];
        let edges = build_edge_indices(&positions, &indices, None, 10.0).into_u32();
        assert_eq!(edges.len(), 8);
    }

    #[test]
    fn test_decode_matrix_applied() {
        // Quantized-looking coordinates with a non-uniform decode scale.
        let positions = [0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 10.0, 0.0];
        let indices = [0, 1, 2, 0, 2, 3];
        let m = DMat4::from_scale(DVec3::new(2.0, 0.5, 1.0));
        let edges = build_edge_indices(&positions, &indices, Some(&m), 10.0);
        assert_eq!(edges.len(), 8);
        assert!(matches!(edges, IndexBuffer::U16(_)));
    }
}
