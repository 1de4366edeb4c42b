// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integer voxel geometry.
//!
//! Boxes are inclusive on both ends. Ranges that come from callers or go to
//! the enumeration service are half-open and are converted at the edges
//! (see [`BBox::from_half_open`] and [`BBox::to_half_open`]).

mod bbox;
mod vector;

pub use bbox::{BBox, NoOverlap};
pub use vector::Vector3;
