//! Watertightness test for triangle meshes.

use std::cmp::Ordering;

/// Whether every edge of the mesh is shared by exactly two triangles.
///
/// Vertices with bit-identical positions are treated as one vertex, so a
/// mesh split for per-face attributes is still recognized as closed. An
/// empty index list counts as solid.
pub fn is_triangle_mesh_solid(indices: &[u32], positions: &[u16]) -> bool {
    if indices.is_empty() {
        return true;
    }

    let compare = |a: &u32, b: &u32| vertex(positions, *b).cmp(vertex(positions, *a));

    // Group indices by position, then map each to the first of its group.
    let mut sorted = indices.to_vec();
    sorted.sort_by(compare);

    let mut canonical = vec![u32::MAX; positions.len() / 3];
    let mut representative = sorted[0];
    for (i, &index) in sorted.iter().enumerate() {
        if i > 0 && compare(&index, &sorted[i - 1]) != Ordering::Equal {
            representative = index;
        }
        canonical[index as usize] = representative;
    }

    let mut edges: Vec<(u32, u32)> = Vec::with_capacity(indices.len());
    for tri in indices.chunks_exact(3) {
        let a = canonical[tri[0] as usize];
        let b = canonical[tri[1] as usize];
        let c = canonical[tri[2] as usize];
        for (p, q) in [(a, b), (b, c), (c, a)] {
            edges.push((p.max(q), p.min(q)));
        }
    }
    edges.sort_unstable();

    let mut run = 0;
    for i in 0..edges.len() {
        if i > 0 && edges[i] != edges[i - 1] {
            if run != 2 {
                return false;
            }
            run = 0;
        }
        run += 1;
    }
    run == 2
}

fn vertex(positions: &[u16], index: u32) -> &[u16] {
    let i = index as usize * 3;
    &positions[i..i + 3]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> (Vec<u32>, Vec<u16>) {
        let positions: Vec<u16> = vec![
            0, 0, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, //
            0, 0, 1, 1, 0, 1, 1, 1, 1, 0, 1, 1,
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        (indices, positions)
    }

    #[test]
    fn test_closed_cube_is_solid() {
        let (indices, positions) = cube();
        assert!(is_triangle_mesh_solid(&indices, &positions));
    }

    #[test]
    fn test_open_cube_is_not_solid() {
        let (indices, positions) = cube();
        assert!(!is_triangle_mesh_solid(&indices[3..], &positions));
    }

    #[test]
    fn test_empty_is_solid() {
        assert!(is_triangle_mesh_solid(&[], &[]));
    }

    #[test]
    fn test_split_vertices_cube_is_solid() {
        // Every triangle gets its own copies of its corner vertices.
        let (indices, positions) = cube();
        let mut split_positions = Vec::new();
        let mut split_indices = Vec::new();
        for (i, &index) in indices.iter().enumerate() {
            let p = index as usize * 3;
            split_positions.extend_from_slice(&positions[p..p + 3]);
            split_indices.push(i as u32);
        }
        assert!(is_triangle_mesh_solid(&split_indices, &split_positions));
    }

    #[test]
    fn test_non_manifold_edge_is_not_solid() {
        let (mut indices, positions) = cube();
        // A third triangle on the back face's edge 0-2.
        indices.extend_from_slice(&[0, 2, 6]);
        assert!(!is_triangle_mesh_solid(&indices, &positions));
    }
}
