//! Merging of vertices that share a position at 4-decimal precision.

use rustc_hash::FxHashMap;

const PRECISION: f64 = 10_000.0;

fn position_key(p: &[f64]) -> [i64; 3] {
    [
        (p[0] * PRECISION).round() as i64,
        (p[1] * PRECISION).round() as i64,
        (p[2] * PRECISION).round() as i64,
    ]
}

/// Positions collapsed to one entry per distinct 4-decimal location.
#[derive(Debug, Clone, Default)]
pub struct WeldedVertices {
    /// Flat positions of the unique vertices.
    pub positions: Vec<f64>,
    /// Maps each original vertex to its welded vertex.
    pub lookup: Vec<u32>,
}

impl WeldedVertices {
    pub fn new(positions: &[f64]) -> Self {
        let mut map: FxHashMap<[i64; 3], u32> = FxHashMap::default();
        let mut unique = Vec::new();
        let mut lookup = Vec::with_capacity(positions.len() / 3);

        for p in positions.chunks_exact(3) {
            let next = (unique.len() / 3) as u32;
            let welded = *map.entry(position_key(p)).or_insert_with(|| {
                unique.extend_from_slice(p);
                next
            });
            lookup.push(welded);
        }

        Self {
            positions: unique,
            lookup,
        }
    }

    /// Number of unique vertices.
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Remap original indices onto welded vertices.
    pub fn remap(&self, indices: &[u32]) -> Vec<u32> {
        indices.iter().map(|&i| self.lookup[i as usize]).collect()
    }
}

/// Merge duplicate vertex positions of an indexed mesh.
///
/// Only valid when the mesh carries no per-vertex normals or UVs, since
/// those would be lost for the collapsed vertices.
pub fn merge_vertices(positions: &[f64], indices: &[u32]) -> (Vec<f64>, Vec<u32>) {
    let welded = WeldedVertices::new(positions);
    let indices = welded.remap(indices);
    (welded.positions, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_merge_duplicate_positions() {
        // Two triangles of a quad with the shared diagonal duplicated.
        let positions = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
        ];
        let indices = [0, 1, 2, 3, 4, 5];
        let (merged, merged_indices) = merge_vertices(&positions, &indices);
        assert_eq!(merged.len(), 12);
        assert_eq!(merged_indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_merge_within_precision() {
        let positions = [0.0, 0.0, 0.0, 0.000_01, 0.0, 0.0, 0.001, 0.0, 0.0];
        let welded = WeldedVertices::new(&positions);
        assert_eq!(welded.len(), 2);
        assert_eq!(welded.lookup, vec![0, 0, 1]);
    }

    #[test]
    fn test_welded_count_matches_distinct_keys() {
        let positions: Vec<f64> = (0..300)
            .map(|i| ((i * 7919) % 13) as f64 * 0.25)
            .collect();
        let welded = WeldedVertices::new(&positions);

        let distinct: HashSet<[i64; 3]> = positions.chunks_exact(3).map(position_key).collect();
        assert_eq!(welded.len(), distinct.len());

        for (original, &w) in positions.chunks_exact(3).zip(&welded.lookup) {
            let w = w as usize * 3;
            let merged = &welded.positions[w..w + 3];
            for axis in 0..3 {
                assert!((merged[axis] - original[axis]).abs() <= 1.0 / PRECISION);
            }
        }
    }
}
