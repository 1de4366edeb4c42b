// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Structural store trait.

Read-only access to the relational tables describing neurons, synapses and
their voxel sets. Entities are addressed by external id plus channel name.
*/

use crate::types::*;
use async_trait::async_trait;
use atlas_structures::{BBox, EntityId, Vector3};

/// Read-only structural lookups (transport-agnostic)
#[async_trait]
pub trait StructuralStore: Send + Sync {
    /// Whether `id` names a synapse in `channel`
    ///
    /// Unknown ids and unknown channels both answer `false`.
    async fn is_synapse(&self, id: EntityId, channel: &str) -> ServiceResult<bool>;

    /// Whether `id` names a neuron in `channel`
    ///
    /// Unknown ids and unknown channels both answer `false`.
    async fn is_neuron(&self, id: EntityId, channel: &str) -> ServiceResult<bool>;

    /// Resolve a neuron's internal key
    ///
    /// # Errors
    /// * `ServiceError::NotFound` - No neuron with this id in the channel
    ///
    async fn neuron_internal_id(&self, id: EntityId, channel: &str) -> ServiceResult<InternalId>;

    /// Native-resolution bounding box of any entity
    ///
    /// # Errors
    /// * `ServiceError::NotFound` - No voxel set with this id in the channel
    ///
    async fn bbox(&self, id: EntityId, channel: &str) -> ServiceResult<BBox>;

    /// Native-resolution representative point of any entity
    ///
    /// # Errors
    /// * `ServiceError::NotFound` - No voxel set with this id in the channel
    ///
    async fn keypoint(&self, id: EntityId, channel: &str) -> ServiceResult<Vector3>;

    /// Pre and post neurons of a synapse
    ///
    /// # Errors
    /// * `ServiceError::NotFound` - No synapse with this id in the channel
    ///
    async fn synapse_parents(&self, id: EntityId, channel: &str) -> ServiceResult<SynapseParents>;

    /// Every synapse where the neuron is pre or post, in any channel
    async fn incident_synapses(&self, neuron: InternalId) -> ServiceResult<Vec<IncidentSynapse>>;

    /// Partner neurons on one side of the neuron's synapses
    ///
    /// With `functional_only`, partners without functional (imaging) data
    /// are left out.
    async fn neighbors(
        &self,
        neuron: InternalId,
        direction: NeighborDirection,
        functional_only: bool,
    ) -> ServiceResult<Vec<EntityId>>;
}
