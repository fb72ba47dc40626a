//! Axis-aligned bounding boxes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    /// An empty box: grows to fit the first point it absorbs.
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Compute the bounds of a point set. Empty input yields the empty box.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::default();
        for &p in points {
            aabb.grow(p);
        }
        aabb
    }

    /// Expand to contain a point.
    pub fn grow(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// The smallest box containing both operands.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Whether the box has absorbed at least one point.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let points = [
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, -2.0, 0.5),
            Vec3::new(0.0, 1.0, 1.0),
        ];
        let aabb = Aabb::from_points(&points);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.5));
        assert_eq!(aabb.max, Vec3::new(3.0, 1.0, 2.0));
        assert!(aabb.is_valid());
    }

    #[test]
    fn test_empty_box_is_invalid() {
        let aabb = Aabb::from_points(&[]);
        assert!(!aabb.is_valid());
    }

    #[test]
    fn test_contains_and_center() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        assert!(aabb.contains(Vec3::ONE));
        assert!(!aabb.contains(Vec3::splat(3.0)));
        assert_eq!(aabb.center(), Vec3::ONE);
        assert_eq!(aabb.half_extents(), Vec3::ONE);
    }
}
