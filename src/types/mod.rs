//! Shared types used throughout the library.

mod texture;

pub use texture::{MediaType, TextureChannel, TextureFilter, TextureWrap};

use crate::error::XktError;
use glam::{DMat4, DVec3, DVec4};
use std::fmt;
use std::str::FromStr;

/// Geometry primitive kinds representable in XKT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Triangles,
    Points,
    Lines,
    LineStrip,
    LineLoop,
}

impl PrimitiveType {
    /// The tag used in model metadata and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Triangles => "triangles",
            PrimitiveType::Points => "points",
            PrimitiveType::Lines => "lines",
            PrimitiveType::LineStrip => "line-strip",
            PrimitiveType::LineLoop => "line-loop",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveType {
    type Err = XktError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "triangles" => Ok(PrimitiveType::Triangles),
            "points" => Ok(PrimitiveType::Points),
            "lines" => Ok(PrimitiveType::Lines),
            "line-strip" => Ok(PrimitiveType::LineStrip),
            "line-loop" => Ok(PrimitiveType::LineLoop),
            other => Err(XktError::UnsupportedPrimitiveType(other.to_string())),
        }
    }
}

/// An axis-aligned bounding box in double precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::collapsed()
    }
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Build from the `[xmin, ymin, zmin, xmax, ymax, zmax]` layout.
    pub fn from_array(a: [f64; 6]) -> Self {
        Self {
            min: DVec3::new(a[0], a[1], a[2]),
            max: DVec3::new(a[3], a[4], a[5]),
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }

    /// An inverted box that any expansion will overwrite.
    pub fn collapsed() -> Self {
        Self {
            min: DVec3::splat(f64::MAX),
            max: DVec3::splat(f64::MIN),
        }
    }

    /// True until at least one point has been added.
    pub fn is_collapsed(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Bounds of a flat `[x, y, z, x, y, z, ...]` position array.
    pub fn from_positions(positions: &[f64]) -> Self {
        let mut aabb = Self::collapsed();
        for p in positions.chunks_exact(3) {
            aabb.expand_point(DVec3::new(p[0], p[1], p[2]));
        }
        aabb
    }

    pub fn expand_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn expand_aabb(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Whether `other` lies entirely inside this box (boundaries inclusive).
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    /// Length of the min-to-max diagonal.
    pub fn diagonal(&self) -> f64 {
        self.extent().length()
    }

    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Transform a point as a homogeneous vector with `w = 1`, dropping `w`.
pub fn transform_point(matrix: &DMat4, p: DVec3) -> DVec3 {
    (*matrix * DVec4::new(p.x, p.y, p.z, 1.0)).truncate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_type_parse() {
        assert_eq!("triangles".parse::<PrimitiveType>().unwrap(), PrimitiveType::Triangles);
        assert_eq!("line-loop".parse::<PrimitiveType>().unwrap(), PrimitiveType::LineLoop);
        assert!(matches!(
            "triangle-fan".parse::<PrimitiveType>(),
            Err(XktError::UnsupportedPrimitiveType(_))
        ));
        assert!("triangle-strip".parse::<PrimitiveType>().is_err());
    }

    #[test]
    fn test_aabb_expand_and_contain() {
        let mut aabb = Aabb::collapsed();
        assert!(aabb.is_collapsed());
        aabb.expand_point(DVec3::new(1.0, 2.0, 3.0));
        aabb.expand_point(DVec3::new(-1.0, 0.0, 5.0));
        assert!(!aabb.is_collapsed());
        assert_eq!(aabb.to_array(), [-1.0, 0.0, 3.0, 1.0, 2.0, 5.0]);

        let inner = Aabb::from_array([0.0, 1.0, 4.0, 0.5, 1.5, 4.5]);
        assert!(aabb.contains_aabb(&inner));
        assert!(aabb.contains_aabb(&aabb));
        assert!(!inner.contains_aabb(&aabb));
        assert_eq!(aabb.center(), DVec3::new(0.0, 1.0, 4.0));
    }

    #[test]
    fn test_aabb_from_positions() {
        let aabb = Aabb::from_positions(&[0.0, 0.0, 0.0, 3.0, 4.0, 0.0]);
        assert_eq!(aabb.diagonal(), 5.0);
    }
}
