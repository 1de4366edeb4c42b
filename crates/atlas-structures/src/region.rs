// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Query regions as received from callers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::{AtlasDataError, BBox};

/// A half-open coordinate range `[lo, hi)` along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisRange {
    pub lo: i64,
    pub hi: i64,
}

impl AxisRange {
    pub const fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }
}

/// Parses `"lo,hi"`. Both ends must be integers and the range must hold at
/// least one voxel.
impl FromStr for AxisRange {
    type Err = AtlasDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(AtlasDataError::BadParameters(format!(
                "range '{}' should be two integers separated by a comma",
                s
            )));
        }

        let parse_end = |value: &str| {
            value.trim().parse::<i64>().map_err(|_| {
                AtlasDataError::BadParameters(format!(
                    "range '{}' contains non-numeric bound '{}'",
                    s, value
                ))
            })
        };
        let lo = parse_end(parts[0])?;
        let hi = parse_end(parts[1])?;

        if hi <= lo {
            return Err(AtlasDataError::BadParameters(format!(
                "range '{}' is empty (upper bound is exclusive)",
                s
            )));
        }

        Ok(AxisRange { lo, hi })
    }
}

impl Display for AxisRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.lo, self.hi)
    }
}

/// The query volume: an inclusive box at `resolution`, on a named channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub bbox: BBox,
    pub resolution: u32,
    pub channel: String,
}

impl Region {
    pub fn new(bbox: BBox, resolution: u32, channel: impl Into<String>) -> Self {
        Self {
            bbox,
            resolution,
            channel: channel.into(),
        }
    }

    /// Builds a region from the raw `xrange`/`yrange`/`zrange` path segments.
    pub fn parse(
        channel: impl Into<String>,
        resolution: u32,
        xrange: &str,
        yrange: &str,
        zrange: &str,
    ) -> Result<Self, AtlasDataError> {
        let bbox = BBox::from_half_open(xrange.parse()?, yrange.parse()?, zrange.parse()?);
        Ok(Self::new(bbox, resolution, channel))
    }
}
