// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Data Transfer Objects (DTOs) for the service layer.

These types are transport-agnostic; adapters convert them into their own
response shapes.
*/

use atlas_structures::{BBox, EntityId};
use serde::{Deserialize, Serialize, Serializer};

/// Store-internal primary key of a neuron row
///
/// Never leaves the service layer.
pub type InternalId = i64;

/// Role of a synapse relative to one neuron
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// The neuron is the synapse's presynaptic endpoint
    Pre = 1,
    /// Anything else (the neuron is the postsynaptic endpoint)
    Post = 2,
}

impl Polarity {
    /// Polarity of a synapse whose pre endpoint is `pre`, seen from `neuron`
    pub fn relative_to(neuron: InternalId, pre: InternalId) -> Self {
        if neuron == pre {
            Polarity::Pre
        } else {
            Polarity::Post
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Serialize for Polarity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A synapse found inside the query region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildSynapse {
    pub synapse: EntityId,
    pub polarity: Polarity,
}

/// One synapse touching a neuron, as listed by the store
///
/// `channel` is the synapse's own channel, which may differ from the
/// neuron's. `bbox` is at native resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentSynapse {
    pub synapse: EntityId,
    pub pre: InternalId,
    pub channel: String,
    pub bbox: BBox,
}

/// Both endpoints of a synapse, as external neuron ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SynapseParents {
    pub pre: EntityId,
    pub post: EntityId,
}

/// Which side of a synapse the neighbors sit on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborDirection {
    /// Neurons synapsing onto the queried neuron
    Presynaptic,
    /// Neurons the queried neuron synapses onto
    Postsynaptic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    pub presynaptic: Vec<EntityId>,
    pub postsynaptic: Vec<EntityId>,
}

/// How a candidate's membership in a region is decided
///
/// The two modes can disagree: a synapse whose box straddles the region
/// border counts under `BoundingBox` if any of its voxels fall inside, but
/// under `Keypoint` only if its single representative point does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipMode {
    /// Geometry first, then one remote enumeration on the overlap
    #[default]
    BoundingBox,
    /// Point-in-box test on the stored keypoint; never calls the remote service
    ///
    /// The keypoint is stored at native resolution and is downsampled to the
    /// region's resolution before the test. Comparing the raw keypoint against
    /// a region given at resolution > 0 answers differently for most points.
    Keypoint,
}

impl MembershipMode {
    /// Mode selected by a `filter` query value; only `keypoint` is recognised
    pub fn from_filter(filter: Option<&str>) -> Self {
        match filter {
            Some("keypoint") => MembershipMode::Keypoint,
            _ => MembershipMode::BoundingBox,
        }
    }
}
