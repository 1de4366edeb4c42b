// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// Liveness endpoint

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::Json;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check; does not touch the store or the spatial index
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}
