//! Triangle mesh analysis: vertex welding, feature-edge extraction and
//! watertightness detection.

mod edges;
mod solid;
mod welding;

pub use edges::build_edge_indices;
pub use solid::is_triangle_mesh_solid;
pub use welding::{merge_vertices, WeldedVertices};

/// Default angle, in degrees, above which an edge between two faces is kept.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 10.0;

/// An index list stored at the narrowest width that can hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Pick `u16` storage when every index fits, `u32` otherwise.
    pub fn from_indices(indices: Vec<u32>) -> Self {
        if indices.iter().all(|&i| i <= u16::MAX as u32) {
            IndexBuffer::U16(indices.into_iter().map(|i| i as u16).collect())
        } else {
            IndexBuffer::U32(indices)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen to `u32`.
    pub fn into_u32(self) -> Vec<u32> {
        match self {
            IndexBuffer::U16(v) => v.into_iter().map(u32::from).collect(),
            IndexBuffer::U32(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_buffer_width() {
        assert!(matches!(IndexBuffer::from_indices(vec![0, 65535]), IndexBuffer::U16(_)));
        let wide = IndexBuffer::from_indices(vec![0, 65536]);
        assert!(matches!(wide, IndexBuffer::U32(_)));
        assert_eq!(wide.into_u32(), vec![0, 65536]);
    }
}
