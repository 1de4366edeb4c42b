// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Remote id enumeration trait.
*/

use crate::types::*;
use async_trait::async_trait;
use atlas_structures::BBox;

/// Lists the entity ids with at least one voxel in a box
#[async_trait]
pub trait IdEnumerator: Send + Sync {
    /// Enumerate ids present in `bbox` (inclusive, already at `resolution`)
    ///
    /// Ids are returned as the decimal strings the service sent, unparsed.
    ///
    /// # Errors
    /// * `ServiceError::RemoteService` - Error status, transport failure or malformed body
    ///
    async fn enumerate(&self, channel: &str, bbox: &BBox, resolution: u32) -> ServiceResult<Vec<String>>;
}
