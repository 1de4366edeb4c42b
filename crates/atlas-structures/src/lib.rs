// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The core crate for connectome-atlas. Defines the data types shared by the
//! store, the resolver and the HTTP layer:
//!
//! - [`Vector3`] and [`BBox`]: integer voxel geometry with anisotropic downsampling
//! - [`AxisRange`] and [`Region`]: query volumes as received from callers
//! - [`EntityId`]: opaque 64-bit identifiers that travel as decimal strings

mod error;
pub mod geometry;
pub mod ids;
pub mod region;

pub use error::AtlasDataError;
pub use geometry::{BBox, NoOverlap, Vector3};
pub use ids::EntityId;
pub use region::{AxisRange, Region};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
