// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Incident-entity aggregator.

Lists a neuron's synapses and keeps those that fall in a query region,
tagging each with its polarity relative to the neuron.
*/

use crate::impls::resolver::RegionResolver;
use crate::traits::StructuralStore;
use crate::types::*;
use atlas_structures::{EntityId, Region};
use futures_util::stream::{self, StreamExt};
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ChildAggregator {
    store: Arc<dyn StructuralStore>,
    resolver: RegionResolver,
    max_concurrent_checks: usize,
    deadline: Option<Duration>,
}

impl ChildAggregator {
    /// `max_concurrent_checks` of 1 evaluates candidates one at a time
    pub fn new(
        store: Arc<dyn StructuralStore>,
        resolver: RegionResolver,
        max_concurrent_checks: usize,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            store,
            resolver,
            max_concurrent_checks: max_concurrent_checks.max(1),
            deadline,
        }
    }

    /// Synapses of `neuron` lying in `region`, in no particular order
    ///
    /// The neuron is looked up in `region.channel`; each synapse is checked in
    /// its own channel. The first failing check stops the traversal and drops
    /// every check still in flight. The returned `PartialFailure` then carries
    /// all matches resolved up to that point.
    pub async fn children_in_region(
        &self,
        neuron: EntityId,
        region: &Region,
        mode: MembershipMode,
    ) -> Result<Vec<ChildSynapse>, PartialFailure> {
        let internal = self.store.neuron_internal_id(neuron, &region.channel).await?;
        let candidates = self.store.incident_synapses(internal).await?;

        debug!(
            target: "atlas-services",
            "Neuron {} has {} incident synapses, checking against {} at resolution {}",
            neuron,
            candidates.len(),
            region.bbox,
            region.resolution
        );

        let mut matches = Vec::new();
        let outcome = match self.deadline {
            Some(limit) => {
                let traversal = self.traverse(internal, candidates, region, mode, &mut matches);
                match tokio::time::timeout(limit, traversal).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err((
                        None,
                        ServiceError::DeadlineExceeded(format!(
                            "neuron_children for {} exceeded {:?}",
                            neuron, limit
                        )),
                    )),
                }
            }
            None => self.traverse(internal, candidates, region, mode, &mut matches).await,
        };

        match outcome {
            Ok(()) => Ok(matches),
            Err((failed_candidate, error)) => {
                warn!(
                    target: "atlas-services",
                    "Traversal of neuron {} stopped after {} matches: {}",
                    neuron,
                    matches.len(),
                    error
                );
                Err(PartialFailure::new(matches, failed_candidate, error))
            }
        }
    }

    async fn traverse(
        &self,
        neuron: InternalId,
        candidates: Vec<IncidentSynapse>,
        region: &Region,
        mode: MembershipMode,
        matches: &mut Vec<ChildSynapse>,
    ) -> Result<(), (Option<EntityId>, ServiceError)> {
        let resolver = &self.resolver;
        let checks = stream::iter(candidates)
            .map(move |candidate| async move {
                let polarity = Polarity::relative_to(neuron, candidate.pre);
                let candidate_box = candidate.bbox.downsample_aniso(region.resolution);
                let inside = resolver
                    .resolve(
                        candidate.synapse,
                        &candidate.channel,
                        &region.bbox,
                        &candidate_box,
                        region.resolution,
                        mode,
                    )
                    .await;
                (candidate.synapse, polarity, inside)
            })
            .buffer_unordered(self.max_concurrent_checks);
        let mut checks = pin!(checks);

        while let Some((synapse, polarity, inside)) = checks.next().await {
            match inside {
                Ok(true) => matches.push(ChildSynapse { synapse, polarity }),
                Ok(false) => {}
                Err(error) => return Err((Some(synapse), error)),
            }
        }

        Ok(())
    }
}
