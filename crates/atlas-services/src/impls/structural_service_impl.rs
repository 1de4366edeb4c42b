// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Structural service implementation.
*/

use crate::impls::aggregator::ChildAggregator;
use crate::traits::{IdEnumerator, StructuralService, StructuralStore};
use crate::types::*;
use async_trait::async_trait;
use atlas_structures::{BBox, EntityId, Region, Vector3};
use std::sync::Arc;
use tracing::debug;

/// Default implementation of StructuralService
pub struct StructuralServiceImpl {
    store: Arc<dyn StructuralStore>,
    enumerator: Arc<dyn IdEnumerator>,
    aggregator: ChildAggregator,
    max_resolution: u32,
}

impl StructuralServiceImpl {
    pub fn new(
        store: Arc<dyn StructuralStore>,
        enumerator: Arc<dyn IdEnumerator>,
        aggregator: ChildAggregator,
        max_resolution: u32,
    ) -> Self {
        Self {
            store,
            enumerator,
            aggregator,
            max_resolution,
        }
    }

    fn check_resolution(&self, resolution: u32) -> ServiceResult<()> {
        if resolution > self.max_resolution {
            return Err(ServiceError::InvalidInput(format!(
                "resolution {} exceeds the maximum of {}",
                resolution, self.max_resolution
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StructuralService for StructuralServiceImpl {
    async fn is_synapse(&self, channel: &str, id: EntityId) -> ServiceResult<bool> {
        debug!(target: "atlas-services", "is_synapse {} in {}", id, channel);
        self.store.is_synapse(id, channel).await
    }

    async fn is_neuron(&self, channel: &str, id: EntityId) -> ServiceResult<bool> {
        debug!(target: "atlas-services", "is_neuron {} in {}", id, channel);
        self.store.is_neuron(id, channel).await
    }

    async fn ids_in_region(&self, region: &Region) -> ServiceResult<Vec<String>> {
        self.check_resolution(region.resolution)?;
        self.enumerator
            .enumerate(&region.channel, &region.bbox, region.resolution)
            .await
    }

    async fn keypoint(&self, channel: &str, id: EntityId, resolution: u32) -> ServiceResult<Vector3> {
        self.check_resolution(resolution)?;
        let keypoint = self.store.keypoint(id, channel).await?;
        Ok(keypoint.downsample_aniso(resolution))
    }

    async fn synapse_parents(&self, channel: &str, id: EntityId) -> ServiceResult<SynapseParents> {
        self.store.synapse_parents(id, channel).await
    }

    async fn neuron_children(
        &self,
        neuron: EntityId,
        region: &Region,
        mode: MembershipMode,
    ) -> Result<Vec<ChildSynapse>, PartialFailure> {
        self.check_resolution(region.resolution)?;
        debug!(
            target: "atlas-services",
            "neuron_children {} in {} ({:?})",
            neuron,
            region.channel,
            mode
        );
        self.aggregator.children_in_region(neuron, region, mode).await
    }

    async fn neighbors(&self, channel: &str, id: EntityId, functional_only: bool) -> ServiceResult<Neighbors> {
        let internal = self.store.neuron_internal_id(id, channel).await?;
        let presynaptic = self
            .store
            .neighbors(internal, NeighborDirection::Presynaptic, functional_only)
            .await?;
        let postsynaptic = self
            .store
            .neighbors(internal, NeighborDirection::Postsynaptic, functional_only)
            .await?;

        Ok(Neighbors {
            presynaptic,
            postsynaptic,
        })
    }

    async fn bbox(&self, channel: &str, id: EntityId) -> ServiceResult<BBox> {
        self.store.bbox(id, channel).await
    }
}
