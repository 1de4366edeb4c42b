// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
In-memory structural store.

Holds the same facts as the relational tables in hash maps. Used for
fixtures and tests; a builder API populates it before it is shared.
*/

use crate::traits::StructuralStore;
use crate::types::*;
use ahash::AHashMap;
use async_trait::async_trait;
use atlas_structures::{BBox, EntityId, Vector3};

#[derive(Debug, Clone)]
struct VoxelSet {
    bbox: BBox,
    keypoint: Vector3,
}

#[derive(Debug, Clone)]
struct NeuronRow {
    id: EntityId,
    channel: String,
    functional: bool,
}

#[derive(Debug, Clone)]
struct SynapseRow {
    id: EntityId,
    channel: String,
    pre: InternalId,
    post: InternalId,
}

/// Hash-map backed [`StructuralStore`]
#[derive(Debug, Default)]
pub struct InMemoryStructuralStore {
    voxel_sets: AHashMap<(String, EntityId), VoxelSet>,
    neurons: Vec<NeuronRow>,
    neuron_index: AHashMap<(String, EntityId), InternalId>,
    synapses: Vec<SynapseRow>,
}

impl InMemoryStructuralStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a neuron and return its internal key
    ///
    /// `functional` marks neurons that have imaging data.
    pub fn add_neuron(
        &mut self,
        channel: &str,
        id: EntityId,
        bbox: BBox,
        keypoint: Vector3,
        functional: bool,
    ) -> InternalId {
        let internal = self.neurons.len() as InternalId + 1;
        self.voxel_sets
            .insert((channel.to_string(), id), VoxelSet { bbox, keypoint });
        self.neurons.push(NeuronRow {
            id,
            channel: channel.to_string(),
            functional,
        });
        self.neuron_index.insert((channel.to_string(), id), internal);
        internal
    }

    /// Add a synapse between two neurons previously added
    pub fn add_synapse(
        &mut self,
        channel: &str,
        id: EntityId,
        bbox: BBox,
        keypoint: Vector3,
        pre: InternalId,
        post: InternalId,
    ) {
        self.voxel_sets
            .insert((channel.to_string(), id), VoxelSet { bbox, keypoint });
        self.synapses.push(SynapseRow {
            id,
            channel: channel.to_string(),
            pre,
            post,
        });
    }

    fn voxel_set(&self, id: EntityId, channel: &str) -> ServiceResult<&VoxelSet> {
        self.voxel_sets
            .get(&(channel.to_string(), id))
            .ok_or_else(|| ServiceError::not_found("VoxelSet", id))
    }

    fn neuron(&self, internal: InternalId) -> ServiceResult<&NeuronRow> {
        usize::try_from(internal - 1)
            .ok()
            .and_then(|index| self.neurons.get(index))
            .ok_or_else(|| ServiceError::Store(format!("dangling neuron reference {}", internal)))
    }
}

#[async_trait]
impl StructuralStore for InMemoryStructuralStore {
    async fn is_synapse(&self, id: EntityId, channel: &str) -> ServiceResult<bool> {
        Ok(self
            .synapses
            .iter()
            .any(|s| s.id == id && s.channel == channel))
    }

    async fn is_neuron(&self, id: EntityId, channel: &str) -> ServiceResult<bool> {
        Ok(self.neuron_index.contains_key(&(channel.to_string(), id)))
    }

    async fn neuron_internal_id(&self, id: EntityId, channel: &str) -> ServiceResult<InternalId> {
        self.neuron_index
            .get(&(channel.to_string(), id))
            .copied()
            .ok_or_else(|| ServiceError::not_found("Neuron", id))
    }

    async fn bbox(&self, id: EntityId, channel: &str) -> ServiceResult<BBox> {
        Ok(self.voxel_set(id, channel)?.bbox)
    }

    async fn keypoint(&self, id: EntityId, channel: &str) -> ServiceResult<Vector3> {
        Ok(self.voxel_set(id, channel)?.keypoint)
    }

    async fn synapse_parents(&self, id: EntityId, channel: &str) -> ServiceResult<SynapseParents> {
        let synapse = self
            .synapses
            .iter()
            .find(|s| s.id == id && s.channel == channel)
            .ok_or_else(|| ServiceError::not_found("Synapse", id))?;

        Ok(SynapseParents {
            pre: self.neuron(synapse.pre)?.id,
            post: self.neuron(synapse.post)?.id,
        })
    }

    async fn incident_synapses(&self, neuron: InternalId) -> ServiceResult<Vec<IncidentSynapse>> {
        self.synapses
            .iter()
            .filter(|s| s.pre == neuron || s.post == neuron)
            .map(|s| {
                Ok(IncidentSynapse {
                    synapse: s.id,
                    pre: s.pre,
                    channel: s.channel.clone(),
                    bbox: self.voxel_set(s.id, &s.channel)?.bbox,
                })
            })
            .collect()
    }

    async fn neighbors(
        &self,
        neuron: InternalId,
        direction: NeighborDirection,
        functional_only: bool,
    ) -> ServiceResult<Vec<EntityId>> {
        let mut partners = Vec::new();
        for synapse in &self.synapses {
            let partner = match direction {
                NeighborDirection::Presynaptic if synapse.post == neuron => synapse.pre,
                NeighborDirection::Postsynaptic if synapse.pre == neuron => synapse.post,
                _ => continue,
            };
            let row = self.neuron(partner)?;
            if !functional_only || row.functional {
                partners.push(row.id);
            }
        }
        Ok(partners)
    }
}
