// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Region membership resolver.

Decides whether one entity lies in a query region, calling the remote
enumeration service only when box geometry alone cannot answer.
*/

use crate::traits::{IdEnumerator, StructuralStore};
use crate::types::*;
use atlas_structures::{BBox, EntityId};
use std::sync::Arc;
use tracing::trace;

#[derive(Clone)]
pub struct RegionResolver {
    store: Arc<dyn StructuralStore>,
    enumerator: Arc<dyn IdEnumerator>,
}

impl RegionResolver {
    pub fn new(store: Arc<dyn StructuralStore>, enumerator: Arc<dyn IdEnumerator>) -> Self {
        Self { store, enumerator }
    }

    /// Is `candidate` in `region`?
    ///
    /// `region` and `candidate_box` must both already be at `resolution`.
    ///
    /// * `MembershipMode::Keypoint` - the stored keypoint, downsampled to
    ///   `resolution`, is tested against the region. No remote call.
    /// * `MembershipMode::BoundingBox` - a box fully inside answers `true` and
    ///   a disjoint box answers `false`, both without a remote call. Otherwise
    ///   the overlap is enumerated once and the candidate must appear in it.
    ///
    /// # Errors
    /// * `ServiceError::NotFound` - Keypoint mode and the candidate has no row
    /// * `ServiceError::RemoteService` - Enumeration failed, or returned an id
    ///   that is not a decimal integer
    pub async fn resolve(
        &self,
        candidate: EntityId,
        channel: &str,
        region: &BBox,
        candidate_box: &BBox,
        resolution: u32,
        mode: MembershipMode,
    ) -> ServiceResult<bool> {
        if mode == MembershipMode::Keypoint {
            let keypoint = self
                .store
                .keypoint(candidate, channel)
                .await?
                .downsample_aniso(resolution);
            return Ok(keypoint.inside(region));
        }

        if candidate_box.inside(region) {
            trace!(target: "atlas-services", "{} inside {}", candidate, region);
            return Ok(true);
        }

        let Ok(overlap) = candidate_box.intersection(region) else {
            trace!(target: "atlas-services", "{} disjoint from {}", candidate, region);
            return Ok(false);
        };

        let ids = self.enumerator.enumerate(channel, &overlap, resolution).await?;
        for id in &ids {
            let parsed: EntityId = id.parse().map_err(|_| {
                RemoteServiceError::MalformedBody(format!("'{}' is not a decimal id", id))
            })?;
            if parsed == candidate {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
