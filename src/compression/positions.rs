//! AABB-relative position quantization.

use crate::types::Aabb;
use glam::{DMat4, DVec3};

/// Largest quantized coordinate value.
pub const MAX_QUANTIZED: f64 = 65535.0;

/// Quantize flat `[x, y, z, ...]` positions to `u16` relative to `aabb`.
///
/// Each axis is scaled by `65535 / extent`; an axis with zero extent uses a
/// scale of zero so every coordinate on it maps to 0. Values are clamped into
/// `[0, 65535]`. This is lossy; use [`create_positions_decode_matrix`] with
/// the same AABB to map back.
pub fn quantize_positions(positions: &[f64], aabb: &Aabb) -> Vec<u16> {
    let extent = aabb.extent();
    let scale = DVec3::new(
        axis_scale(extent.x),
        axis_scale(extent.y),
        axis_scale(extent.z),
    );

    let mut quantized = Vec::with_capacity(positions.len());
    for p in positions.chunks_exact(3) {
        let offset = DVec3::new(p[0], p[1], p[2]) - aabb.min;
        // Float error can leave points a hair below the minimum.
        let q = (offset.max(DVec3::ZERO) * scale).clamp(DVec3::ZERO, DVec3::splat(MAX_QUANTIZED));
        quantized.push(q.x.floor() as u16);
        quantized.push(q.y.floor() as u16);
        quantized.push(q.z.floor() as u16);
    }
    quantized
}

fn axis_scale(extent: f64) -> f64 {
    if extent > 0.0 {
        MAX_QUANTIZED / extent
    } else {
        0.0
    }
}

/// Matrix mapping quantized coordinates back into the space of `aabb`.
///
/// Equal to `translation(aabb.min) * scale(extent / 65535)`.
pub fn create_positions_decode_matrix(aabb: &Aabb) -> DMat4 {
    let translate = DMat4::from_translation(aabb.min);
    let scale = DMat4::from_scale(aabb.extent() / MAX_QUANTIZED);
    translate * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transform_point;
    use proptest::prelude::*;

    fn decode(matrix: &DMat4, q: &[u16]) -> DVec3 {
        transform_point(
            matrix,
            DVec3::new(q[0] as f64, q[1] as f64, q[2] as f64),
        )
    }

    #[test]
    fn test_quantize_corners() {
        let aabb = Aabb::from_array([-1.0, 0.0, 10.0, 1.0, 2.0, 20.0]);
        let q = quantize_positions(&[-1.0, 0.0, 10.0, 1.0, 2.0, 20.0], &aabb);
        assert_eq!(q, vec![0, 0, 0, 65535, 65535, 65535]);
    }

    #[test]
    fn test_quantize_clamps_outside_points() {
        let aabb = Aabb::from_array([0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let q = quantize_positions(&[-5.0, 0.5, 7.0], &aabb);
        assert_eq!(q[0], 0);
        assert_eq!(q[2], 65535);
    }

    #[test]
    fn test_quantize_flat_axis() {
        let aabb = Aabb::from_array([0.0, 3.0, 0.0, 1.0, 3.0, 1.0]);
        let q = quantize_positions(&[0.5, 3.0, 0.5], &aabb);
        assert_eq!(q[1], 0);

        let m = create_positions_decode_matrix(&aabb);
        let p = decode(&m, &q);
        assert_eq!(p.y, 3.0);
    }

    proptest! {
        #[test]
        fn prop_decode_within_one_step(
            min in prop::array::uniform3(-1000.0f64..1000.0),
            size in prop::array::uniform3(0.001f64..500.0),
            t in prop::array::uniform3(0.0f64..=1.0),
        ) {
            let min = DVec3::from_array(min);
            let max = min + DVec3::from_array(size);
            let aabb = Aabb::new(min, max);
            let p = min + (max - min) * DVec3::from_array(t);

            let q = quantize_positions(&[p.x, p.y, p.z], &aabb);
            let m = create_positions_decode_matrix(&aabb);
            let decoded = decode(&m, &q);

            let bound = aabb.extent().max_element() / MAX_QUANTIZED + 1e-9;
            let err = (decoded - p).abs();
            prop_assert!(err.max_element() <= bound, "err {:?} bound {}", err, bound);
        }
    }
}
