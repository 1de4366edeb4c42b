// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Structural query service trait.

The stable boundary between transport adapters and the store, the remote
enumeration client and the region aggregator.
*/

use crate::types::*;
use async_trait::async_trait;
use atlas_structures::{BBox, EntityId, Region, Vector3};

/// Structural queries (transport-agnostic)
#[async_trait]
pub trait StructuralService: Send + Sync {
    async fn is_synapse(&self, channel: &str, id: EntityId) -> ServiceResult<bool>;

    async fn is_neuron(&self, channel: &str, id: EntityId) -> ServiceResult<bool>;

    /// Proxy the remote enumeration for an arbitrary region
    ///
    /// # Errors
    /// * `ServiceError::InvalidInput` - Resolution above the configured cap
    /// * `ServiceError::RemoteService` - Enumeration failed
    ///
    async fn ids_in_region(&self, region: &Region) -> ServiceResult<Vec<String>>;

    /// Keypoint of an entity, downsampled to `resolution`
    ///
    /// # Errors
    /// * `ServiceError::NotFound` - Unknown entity
    /// * `ServiceError::InvalidInput` - Resolution above the configured cap
    ///
    async fn keypoint(&self, channel: &str, id: EntityId, resolution: u32) -> ServiceResult<Vector3>;

    /// # Errors
    /// * `ServiceError::NotFound` - Unknown synapse
    ///
    async fn synapse_parents(&self, channel: &str, id: EntityId) -> ServiceResult<SynapseParents>;

    /// Synapses of `neuron` that fall in `region`
    ///
    /// The neuron is looked up in `region.channel`. On failure the matches
    /// found so far are returned inside the `PartialFailure`.
    async fn neuron_children(
        &self,
        neuron: EntityId,
        region: &Region,
        mode: MembershipMode,
    ) -> Result<Vec<ChildSynapse>, PartialFailure>;

    /// # Errors
    /// * `ServiceError::NotFound` - Unknown neuron
    ///
    async fn neighbors(&self, channel: &str, id: EntityId, functional_only: bool) -> ServiceResult<Neighbors>;

    /// Native-resolution bounding box of an entity
    ///
    /// # Errors
    /// * `ServiceError::NotFound` - Unknown entity
    ///
    async fn bbox(&self, channel: &str, id: EntityId) -> ServiceResult<BBox>;
}
