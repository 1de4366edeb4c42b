// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::BBox;

/// A voxel coordinate. No unit conversion is applied except downsampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Vector3 {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Is this vector greater or equal than `other` in every dimension?
    pub fn greater_eq(&self, other: &Vector3) -> bool {
        self.x >= other.x && self.y >= other.y && self.z >= other.z
    }

    /// Is this vector lesser or equal than `other` in every dimension?
    pub fn lesser_eq(&self, other: &Vector3) -> bool {
        self.x <= other.x && self.y <= other.y && self.z <= other.z
    }

    /// Component-wise maximum
    pub fn max(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Component-wise minimum
    pub fn min(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Converts a coordinate at native resolution to the given mip level.
    ///
    /// Only x and y are halved per level; z is kept since the volume is
    /// anisotropic. Division floors, so negative coordinates round toward
    /// negative infinity. Levels past 63 saturate at 0 / -1.
    pub fn downsample_aniso(&self, resolution: u32) -> Vector3 {
        let shift = resolution.min(63);
        Vector3::new(self.x >> shift, self.y >> shift, self.z)
    }

    /// Is this point inside `bbox` (inclusive on both ends)?
    pub fn inside(&self, bbox: &BBox) -> bool {
        self.greater_eq(&bbox.min) && self.lesser_eq(&bbox.max)
    }

    pub fn as_array(&self) -> [i64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[i64; 3]> for Vector3 {
    fn from(value: [i64; 3]) -> Self {
        Vector3::new(value[0], value[1], value[2])
    }
}

impl Display for Vector3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons_require_every_axis() {
        let a = Vector3::new(5, 5, 5);
        let b = Vector3::new(5, 4, 6);
        assert!(!a.greater_eq(&b));
        assert!(!a.lesser_eq(&b));
        assert!(a.greater_eq(&a));
        assert!(a.lesser_eq(&a));
    }

    #[test]
    fn test_min_max_are_component_wise() {
        let a = Vector3::new(1, 9, 3);
        let b = Vector3::new(4, 2, 3);
        assert_eq!(a.max(&b), Vector3::new(4, 9, 3));
        assert_eq!(a.min(&b), Vector3::new(1, 2, 3));
    }

    #[test]
    fn test_downsample_halves_x_and_y_only() {
        let v = Vector3::new(1024, 513, 77);
        assert_eq!(v.downsample_aniso(0), v);
        assert_eq!(v.downsample_aniso(1), Vector3::new(512, 256, 77));
        assert_eq!(v.downsample_aniso(3), Vector3::new(128, 64, 77));
    }

    #[test]
    fn test_downsample_floors_negative_coordinates() {
        let v = Vector3::new(-3, -4, -5);
        assert_eq!(v.downsample_aniso(1), Vector3::new(-2, -2, -5));
    }

    #[test]
    fn test_downsample_saturates_at_large_levels() {
        let v = Vector3::new(i64::MAX, -1, 3);
        assert_eq!(v.downsample_aniso(200), Vector3::new(0, -1, 3));
    }

    #[test]
    fn test_point_inside_is_inclusive() {
        let bbox = BBox::new(Vector3::new(0, 0, 0), Vector3::new(9, 9, 9));
        assert!(Vector3::new(0, 0, 0).inside(&bbox));
        assert!(Vector3::new(9, 9, 9).inside(&bbox));
        assert!(!Vector3::new(10, 9, 9).inside(&bbox));
        assert!(!Vector3::new(0, -1, 0).inside(&bbox));
    }
}
