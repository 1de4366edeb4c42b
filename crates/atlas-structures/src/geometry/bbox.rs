// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use super::Vector3;
use crate::region::AxisRange;

/// Axis-aligned box, inclusive on both ends.
///
/// A box produced by [`BBox::intersection`] always satisfies `min <= max`;
/// disjoint inputs yield [`NoOverlap`] instead of an inverted box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BBox {
    pub min: Vector3,
    pub max: Vector3,
}

/// Two boxes share no voxel.
///
/// This is a definitive negative answer, not a failure to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoOverlap;

impl Display for NoOverlap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "no overlap")
    }
}

impl Error for NoOverlap {}

impl BBox {
    pub const fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Builds an inclusive box from caller-supplied half-open ranges (`max = hi - 1`).
    pub fn from_half_open(x: AxisRange, y: AxisRange, z: AxisRange) -> Self {
        Self {
            min: Vector3::new(x.lo, y.lo, z.lo),
            max: Vector3::new(x.hi - 1, y.hi - 1, z.hi - 1),
        }
    }

    /// Half-open ranges for x, y and z (`hi = max + 1`), as expected by the
    /// enumeration service.
    pub fn to_half_open(&self) -> [AxisRange; 3] {
        [
            AxisRange::new(self.min.x, self.max.x.saturating_add(1)),
            AxisRange::new(self.min.y, self.max.y.saturating_add(1)),
            AxisRange::new(self.min.z, self.max.z.saturating_add(1)),
        ]
    }

    /// Returns the overlap of this box with `other`.
    ///
    /// Fails with [`NoOverlap`] when any axis of the result would have
    /// `max < min`.
    pub fn intersection(&self, other: &BBox) -> Result<BBox, NoOverlap> {
        let res = BBox {
            min: self.min.max(&other.min),
            max: self.max.min(&other.max),
        };

        if res.max.x < res.min.x || res.max.y < res.min.y || res.max.z < res.min.z {
            return Err(NoOverlap);
        }

        Ok(res)
    }

    /// Is this box fully inside `other`?
    pub fn inside(&self, other: &BBox) -> bool {
        self.min.greater_eq(&other.min) && self.max.lesser_eq(&other.max)
    }

    /// Downsamples both corners to the given mip level.
    pub fn downsample_aniso(&self, resolution: u32) -> BBox {
        BBox {
            min: self.min.downsample_aniso(resolution),
            max: self.max.downsample_aniso(resolution),
        }
    }
}

impl Display for BBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}/{}:{}/{}:{}",
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
        )
    }
}
