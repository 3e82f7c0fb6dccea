//! Octahedral normal encoding.

use glam::{DMat4, DVec3};

/// Rounding applied to one encoded component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

impl Rounding {
    fn apply(self, v: f64) -> f64 {
        match self {
            Rounding::Floor => v.floor(),
            Rounding::Ceil => v.ceil(),
        }
    }
}

const CANDIDATES: [(Rounding, Rounding); 4] = [
    (Rounding::Floor, Rounding::Floor),
    (Rounding::Ceil, Rounding::Floor),
    (Rounding::Floor, Rounding::Ceil),
    (Rounding::Ceil, Rounding::Ceil),
];

fn sign_not_zero(v: f64) -> f64 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Project `n` onto the octahedron, unfold the lower hemisphere, and round
/// each component into `[-127, 127]`.
pub fn oct_encode_vec3(n: DVec3, x_rounding: Rounding, y_rounding: Rounding) -> [i8; 2] {
    let l1 = n.x.abs() + n.y.abs() + n.z.abs();
    if l1 == 0.0 || !l1.is_finite() {
        return [0, 0];
    }
    let mut x = n.x / l1;
    let mut y = n.y / l1;
    if n.z < 0.0 {
        let folded_x = (1.0 - y.abs()) * sign_not_zero(x);
        let folded_y = (1.0 - x.abs()) * sign_not_zero(y);
        x = folded_x;
        y = folded_y;
    }
    [
        x_rounding.apply(x * 127.0).clamp(-127.0, 127.0) as i8,
        y_rounding.apply(y * 127.0).clamp(-127.0, 127.0) as i8,
    ]
}

/// Inverse of [`oct_encode_vec3`], returning a unit vector.
pub fn oct_decode_vec2(oct: [i8; 2]) -> DVec3 {
    let mut x = oct[0] as f64 / 127.0;
    let mut y = oct[1] as f64 / 127.0;
    let z = 1.0 - x.abs() - y.abs();
    if z < 0.0 {
        let unfolded_x = (1.0 - y.abs()) * sign_not_zero(x);
        let unfolded_y = (1.0 - x.abs()) * sign_not_zero(y);
        x = unfolded_x;
        y = unfolded_y;
    }
    DVec3::new(x, y, z).normalize_or_zero()
}

/// Encode `n`, trying floor/ceil on both components and keeping whichever
/// candidate decodes closest (largest dot product) to the original.
pub fn oct_encode_vec3_best(n: DVec3) -> [i8; 2] {
    let mut best = oct_encode_vec3(n, CANDIDATES[0].0, CANDIDATES[0].1);
    let mut best_cos = n.dot(oct_decode_vec2(best));
    for &(rx, ry) in &CANDIDATES[1..] {
        let oct = oct_encode_vec3(n, rx, ry);
        let cos = n.dot(oct_decode_vec2(oct));
        if cos > best_cos {
            best = oct;
            best_cos = cos;
        }
    }
    best
}

/// Oct-encode flat `[x, y, z, ...]` normals without transforming them.
///
/// Output keeps a stride of three bytes per normal; the third is zero.
pub fn oct_encode_normals(normals: &[f32]) -> Vec<i8> {
    encode_all(normals, |n| n)
}

/// Transform normals by `normal_matrix` (upper 3x3), renormalize, then
/// oct-encode them with the same layout as [`oct_encode_normals`].
pub fn transform_and_oct_encode_normals(normal_matrix: &DMat4, normals: &[f32]) -> Vec<i8> {
    encode_all(normals, |n| normal_matrix.transform_vector3(n))
}

fn encode_all(normals: &[f32], transform: impl Fn(DVec3) -> DVec3) -> Vec<i8> {
    let mut encoded = Vec::with_capacity(normals.len());
    for n in normals.chunks_exact(3) {
        let local = DVec3::new(n[0] as f64, n[1] as f64, n[2] as f64);
        let world = transform(local).normalize_or_zero();
        let [x, y] = oct_encode_vec3_best(world);
        encoded.extend_from_slice(&[x, y, 0]);
    }
    encoded
}
