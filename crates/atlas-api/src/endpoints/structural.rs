// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Structural API endpoints
//!
//! Every route names its channel as `:collection/:experiment/:layer`.
//! Ranges are half-open `lo,hi` strings. Path segments are taken as text and
//! validated here, so a malformed id, resolution or range is answered with a
//! 400 `ApiError` before the service layer is reached.

use atlas_services::{ChildSynapse, MembershipMode, Polarity};
use atlas_structures::{EntityId, Region};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::common::{ApiError, ApiResult, ApiState, Json, Path, Query, State};

// ============================================================================
// PATH AND QUERY PARAMETERS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EntityPath {
    pub collection: String,
    pub experiment: String,
    pub layer: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct KeypointPath {
    pub collection: String,
    pub experiment: String,
    pub layer: String,
    pub resolution: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct RegionPath {
    pub collection: String,
    pub experiment: String,
    pub layer: String,
    pub resolution: String,
    pub xrange: String,
    pub yrange: String,
    pub zrange: String,
}

#[derive(Debug, Deserialize)]
pub struct NeuronRegionPath {
    pub collection: String,
    pub experiment: String,
    pub layer: String,
    pub resolution: String,
    pub xrange: String,
    pub yrange: String,
    pub zrange: String,
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChildrenQuery {
    /// `keypoint` selects keypoint membership; anything else means bounding box
    pub filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NeighborsQuery {
    /// `true` restricts neighbors to functionally imaged neurons
    pub functional: Option<String>,
}

// ============================================================================
// RESPONSE MODELS
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExistsResponse {
    pub result: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdsResponse {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KeypointResponse {
    /// `[x, y, z]` at the requested resolution
    #[schema(value_type = Vec<i64>)]
    pub keypoint: [i64; 3],
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParentNeuronsResponse {
    /// Neuron id -> 1 (presynaptic) or 2 (postsynaptic)
    pub parent_neurons: BTreeMap<String, u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChildSynapsesResponse {
    /// Synapse id -> 1 when the neuron is presynaptic, 2 when postsynaptic
    pub child_synapses: BTreeMap<String, u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NeighborsResponse {
    pub presynaptic: Vec<String>,
    pub postsynaptic: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Voxel {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

/// Inclusive bounding box at full resolution
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BboxResponse {
    pub min: Voxel,
    pub max: Voxel,
}

/// Render aggregation matches as the `child_synapses` object
pub fn child_synapse_map(children: &[ChildSynapse]) -> BTreeMap<String, u8> {
    children
        .iter()
        .map(|child| (child.synapse.to_string(), child.polarity.code()))
        .collect()
}

fn id_strings(ids: Vec<EntityId>) -> Vec<String> {
    ids.into_iter().map(|id| id.to_string()).collect()
}

// ============================================================================
// PARAMETER PARSING
// ============================================================================

fn channel_name(collection: &str, experiment: &str, layer: &str) -> String {
    format!("{}/{}/{}", collection, experiment, layer)
}

fn parse_id(raw: &str) -> ApiResult<EntityId> {
    Ok(raw.parse::<EntityId>()?)
}

fn parse_resolution(raw: &str) -> ApiResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        ApiError::invalid_input(format!("resolution '{}' is not a non-negative integer", raw))
    })
}

fn parse_region(
    channel: String,
    resolution: &str,
    xrange: &str,
    yrange: &str,
    zrange: &str,
) -> ApiResult<Region> {
    let resolution = parse_resolution(resolution)?;
    Ok(Region::parse(channel, resolution, xrange, yrange, zrange)?)
}

// ============================================================================
// ENDPOINTS
// ============================================================================

/// Whether the id is a synapse of the channel
#[utoipa::path(
    get,
    path = "/is_synapse/{collection}/{experiment}/{layer}/{id}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Synapse layer name"),
        ("id" = String, Path, description = "Synapse id")
    ),
    responses(
        (status = 200, description = "Existence checked", body = ExistsResponse),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 500, description = "Store failure", body = ApiError)
    )
)]
pub async fn is_synapse(
    State(state): State<ApiState>,
    Path(path): Path<EntityPath>,
) -> ApiResult<Json<ExistsResponse>> {
    let id = parse_id(&path.id)?;
    let channel = channel_name(&path.collection, &path.experiment, &path.layer);
    let result = state.structural_service.is_synapse(&channel, id).await?;
    Ok(Json(ExistsResponse { result }))
}

/// Whether the id is a neuron of the channel
#[utoipa::path(
    get,
    path = "/is_neuron/{collection}/{experiment}/{layer}/{id}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Segmentation layer name"),
        ("id" = String, Path, description = "Neuron id")
    ),
    responses(
        (status = 200, description = "Existence checked", body = ExistsResponse),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 500, description = "Store failure", body = ApiError)
    )
)]
pub async fn is_neuron(
    State(state): State<ApiState>,
    Path(path): Path<EntityPath>,
) -> ApiResult<Json<ExistsResponse>> {
    let id = parse_id(&path.id)?;
    let channel = channel_name(&path.collection, &path.experiment, &path.layer);
    let result = state.structural_service.is_neuron(&channel, id).await?;
    Ok(Json(ExistsResponse { result }))
}

async fn ids_in_region(state: ApiState, path: RegionPath) -> ApiResult<Json<IdsResponse>> {
    let channel = channel_name(&path.collection, &path.experiment, &path.layer);
    let region = parse_region(channel, &path.resolution, &path.xrange, &path.yrange, &path.zrange)?;
    let ids = state.structural_service.ids_in_region(&region).await?;
    Ok(Json(IdsResponse { ids }))
}

/// Synapse ids in a region, as enumerated by the spatial index
#[utoipa::path(
    get,
    path = "/synapse_ids/{collection}/{experiment}/{layer}/{resolution}/{xrange}/{yrange}/{zrange}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Synapse layer name"),
        ("resolution" = u32, Path, description = "Resolution level"),
        ("xrange" = String, Path, description = "Half-open x range `lo,hi`"),
        ("yrange" = String, Path, description = "Half-open y range `lo,hi`"),
        ("zrange" = String, Path, description = "Half-open z range `lo,hi`")
    ),
    responses(
        (status = 200, description = "Ids enumerated", body = IdsResponse),
        (status = 400, description = "Malformed range or resolution", body = ApiError),
        (status = 502, description = "Spatial index failure", body = ApiError)
    )
)]
pub async fn synapse_ids(
    State(state): State<ApiState>,
    Path(path): Path<RegionPath>,
) -> ApiResult<Json<IdsResponse>> {
    ids_in_region(state, path).await
}

/// Neuron ids in a region, as enumerated by the spatial index
#[utoipa::path(
    get,
    path = "/neuron_ids/{collection}/{experiment}/{layer}/{resolution}/{xrange}/{yrange}/{zrange}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Segmentation layer name"),
        ("resolution" = u32, Path, description = "Resolution level"),
        ("xrange" = String, Path, description = "Half-open x range `lo,hi`"),
        ("yrange" = String, Path, description = "Half-open y range `lo,hi`"),
        ("zrange" = String, Path, description = "Half-open z range `lo,hi`")
    ),
    responses(
        (status = 200, description = "Ids enumerated", body = IdsResponse),
        (status = 400, description = "Malformed range or resolution", body = ApiError),
        (status = 502, description = "Spatial index failure", body = ApiError)
    )
)]
pub async fn neuron_ids(
    State(state): State<ApiState>,
    Path(path): Path<RegionPath>,
) -> ApiResult<Json<IdsResponse>> {
    ids_in_region(state, path).await
}

async fn keypoint(state: ApiState, path: KeypointPath) -> ApiResult<Json<KeypointResponse>> {
    let resolution = parse_resolution(&path.resolution)?;
    let id = parse_id(&path.id)?;
    let channel = channel_name(&path.collection, &path.experiment, &path.layer);
    let keypoint = state
        .structural_service
        .keypoint(&channel, id, resolution)
        .await?;
    Ok(Json(KeypointResponse {
        keypoint: keypoint.as_array(),
    }))
}

/// Keypoint of a synapse, downsampled to the resolution
#[utoipa::path(
    get,
    path = "/synapse_keypoint/{collection}/{experiment}/{layer}/{resolution}/{id}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Synapse layer name"),
        ("resolution" = u32, Path, description = "Resolution level"),
        ("id" = String, Path, description = "Synapse id")
    ),
    responses(
        (status = 200, description = "Keypoint found", body = KeypointResponse),
        (status = 400, description = "Malformed id or resolution", body = ApiError),
        (status = 404, description = "Unknown synapse", body = ApiError)
    )
)]
pub async fn synapse_keypoint(
    State(state): State<ApiState>,
    Path(path): Path<KeypointPath>,
) -> ApiResult<Json<KeypointResponse>> {
    keypoint(state, path).await
}

/// Keypoint of a neuron, downsampled to the resolution
#[utoipa::path(
    get,
    path = "/neuron_keypoint/{collection}/{experiment}/{layer}/{resolution}/{id}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Segmentation layer name"),
        ("resolution" = u32, Path, description = "Resolution level"),
        ("id" = String, Path, description = "Neuron id")
    ),
    responses(
        (status = 200, description = "Keypoint found", body = KeypointResponse),
        (status = 400, description = "Malformed id or resolution", body = ApiError),
        (status = 404, description = "Unknown neuron", body = ApiError)
    )
)]
pub async fn neuron_keypoint(
    State(state): State<ApiState>,
    Path(path): Path<KeypointPath>,
) -> ApiResult<Json<KeypointResponse>> {
    keypoint(state, path).await
}

/// The two neurons a synapse connects
#[utoipa::path(
    get,
    path = "/synapse_parent/{collection}/{experiment}/{layer}/{id}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Synapse layer name"),
        ("id" = String, Path, description = "Synapse id")
    ),
    responses(
        (status = 200, description = "Parents found", body = ParentNeuronsResponse),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "Unknown synapse", body = ApiError)
    )
)]
pub async fn synapse_parent(
    State(state): State<ApiState>,
    Path(path): Path<EntityPath>,
) -> ApiResult<Json<ParentNeuronsResponse>> {
    let id = parse_id(&path.id)?;
    let channel = channel_name(&path.collection, &path.experiment, &path.layer);
    let parents = state.structural_service.synapse_parents(&channel, id).await?;

    let mut parent_neurons = BTreeMap::new();
    parent_neurons.insert(parents.pre.to_string(), Polarity::Pre.code());
    parent_neurons.insert(parents.post.to_string(), Polarity::Post.code());
    Ok(Json(ParentNeuronsResponse { parent_neurons }))
}

/// Synapses of a neuron that lie in a region
///
/// A failure after some synapses were resolved is reported with those
/// synapses under `details.child_synapses`.
#[utoipa::path(
    get,
    path = "/neuron_children/{collection}/{experiment}/{layer}/{resolution}/{xrange}/{yrange}/{zrange}/{id}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Segmentation layer name"),
        ("resolution" = u32, Path, description = "Resolution level"),
        ("xrange" = String, Path, description = "Half-open x range `lo,hi`"),
        ("yrange" = String, Path, description = "Half-open y range `lo,hi`"),
        ("zrange" = String, Path, description = "Half-open z range `lo,hi`"),
        ("id" = String, Path, description = "Neuron id"),
        ("filter" = Option<String>, Query, description = "`keypoint` to test keypoints instead of bounding boxes")
    ),
    responses(
        (status = 200, description = "Synapses in region", body = ChildSynapsesResponse),
        (status = 400, description = "Malformed parameters", body = ApiError),
        (status = 404, description = "Unknown neuron", body = ApiError),
        (status = 502, description = "Spatial index failure, partial result in details", body = ApiError)
    )
)]
pub async fn neuron_children(
    State(state): State<ApiState>,
    Path(path): Path<NeuronRegionPath>,
    Query(query): Query<ChildrenQuery>,
) -> ApiResult<Json<ChildSynapsesResponse>> {
    let neuron = parse_id(&path.id)?;
    let channel = channel_name(&path.collection, &path.experiment, &path.layer);
    let region = parse_region(channel, &path.resolution, &path.xrange, &path.yrange, &path.zrange)?;
    let mode = MembershipMode::from_filter(query.filter.as_deref());

    let children = state
        .structural_service
        .neuron_children(neuron, &region, mode)
        .await?;

    Ok(Json(ChildSynapsesResponse {
        child_synapses: child_synapse_map(&children),
    }))
}

/// Presynaptic and postsynaptic partners of a neuron
#[utoipa::path(
    get,
    path = "/neighbors/{collection}/{experiment}/{layer}/{id}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Segmentation layer name"),
        ("id" = String, Path, description = "Neuron id"),
        ("functional" = Option<String>, Query, description = "`true` to keep only functionally imaged partners")
    ),
    responses(
        (status = 200, description = "Neighbors found", body = NeighborsResponse),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "Unknown neuron", body = ApiError)
    )
)]
pub async fn neighbors(
    State(state): State<ApiState>,
    Path(path): Path<EntityPath>,
    Query(query): Query<NeighborsQuery>,
) -> ApiResult<Json<NeighborsResponse>> {
    let id = parse_id(&path.id)?;
    let channel = channel_name(&path.collection, &path.experiment, &path.layer);
    let functional_only = query.functional.as_deref() == Some("true");

    let neighbors = state
        .structural_service
        .neighbors(&channel, id, functional_only)
        .await?;

    Ok(Json(NeighborsResponse {
        presynaptic: id_strings(neighbors.presynaptic),
        postsynaptic: id_strings(neighbors.postsynaptic),
    }))
}

/// Bounding box of a synapse or neuron
#[utoipa::path(
    get,
    path = "/bbox/{collection}/{experiment}/{layer}/{id}/",
    tag = "Structural",
    params(
        ("collection" = String, Path, description = "Collection name"),
        ("experiment" = String, Path, description = "Experiment name"),
        ("layer" = String, Path, description = "Layer name"),
        ("id" = String, Path, description = "Synapse or neuron id")
    ),
    responses(
        (status = 200, description = "Bounding box found", body = BboxResponse),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
pub async fn bbox(
    State(state): State<ApiState>,
    Path(path): Path<EntityPath>,
) -> ApiResult<Json<BboxResponse>> {
    let id = parse_id(&path.id)?;
    let channel = channel_name(&path.collection, &path.experiment, &path.layer);
    let bbox = state.structural_service.bbox(&channel, id).await?;

    Ok(Json(BboxResponse {
        min: Voxel {
            x: bbox.min.x,
            y: bbox.min.y,
            z: bbox.min.z,
        },
        max: Voxel {
            x: bbox.max.x,
            y: bbox.max.y,
            z: bbox.max.z,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_must_be_unsigned() {
        assert_eq!(parse_resolution("3").unwrap(), 3);
        assert!(parse_resolution("-1").is_err());
        assert!(parse_resolution("x").is_err());
    }

    #[test]
    fn test_region_rejects_empty_range() {
        let err = parse_region("c/e/l".into(), "0", "5,5", "0,1", "0,1").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_child_synapse_map() {
        let map = child_synapse_map(&[
            ChildSynapse {
                synapse: EntityId::new(18446744073709551615),
                polarity: Polarity::Post,
            },
            ChildSynapse {
                synapse: EntityId::new(5),
                polarity: Polarity::Pre,
            },
        ]);
        assert_eq!(map.get("18446744073709551615"), Some(&2));
        assert_eq!(map.get("5"), Some(&1));
    }
}
