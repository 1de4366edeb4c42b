// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// OpenAPI documentation generation
//
// This module generates the OpenAPI 3.0 document at compile-time
// using utoipa, ensuring the documentation stays in sync with the code.

use utoipa::OpenApi;

use crate::common::{ApiError, ApiErrorCode};
use crate::endpoints::health::HealthResponse;
use crate::endpoints::structural::{
    BboxResponse, ChildSynapsesResponse, ExistsResponse, IdsResponse, KeypointResponse,
    NeighborsResponse, ParentNeuronsResponse, Voxel,
};

/// OpenAPI documentation for the atlas REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Connectome Atlas API",
        description = "Structural queries over a connectomics dataset: synapses and neurons, their bounding boxes, keypoints and connectivity, and the synapses of a neuron inside a region",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        crate::endpoints::health::health_check,
        crate::endpoints::structural::is_synapse,
        crate::endpoints::structural::is_neuron,
        crate::endpoints::structural::synapse_ids,
        crate::endpoints::structural::neuron_ids,
        crate::endpoints::structural::synapse_keypoint,
        crate::endpoints::structural::neuron_keypoint,
        crate::endpoints::structural::synapse_parent,
        crate::endpoints::structural::neuron_children,
        crate::endpoints::structural::neighbors,
        crate::endpoints::structural::bbox,
    ),
    components(
        schemas(
            HealthResponse,
            ExistsResponse,
            IdsResponse,
            KeypointResponse,
            ParentNeuronsResponse,
            ChildSynapsesResponse,
            NeighborsResponse,
            BboxResponse,
            Voxel,
            ApiError,
            ApiErrorCode,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Structural", description = "Synapse and neuron lookups and region queries"),
    )
)]
pub struct ApiDoc;
