// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Process-wide wiring of the service layer.

Everything here is built once at startup from an [`AtlasConfig`] and shared
read-only by all requests.
*/

use crate::impls::{BossClient, ChildAggregator, RegionResolver, SqliteStructuralStore, StructuralServiceImpl};
use crate::traits::{IdEnumerator, StructuralService, StructuralStore};
use crate::types::ServiceResult;
use atlas_config::AtlasConfig;
use std::sync::Arc;
use tracing::info;

/// Shared handles to the store, the enumeration client and the service
#[derive(Clone)]
pub struct AtlasContext {
    pub store: Arc<dyn StructuralStore>,
    pub enumerator: Arc<dyn IdEnumerator>,
    pub structural_service: Arc<dyn StructuralService + Send + Sync>,
}

impl AtlasContext {
    /// Open the configured database and build the remote client
    pub fn from_config(config: &AtlasConfig) -> ServiceResult<Self> {
        let store: Arc<dyn StructuralStore> = Arc::new(SqliteStructuralStore::open(
            &config.database.path,
            config.database.read_only,
            config.database.pool_size,
        )?);
        let enumerator: Arc<dyn IdEnumerator> = Arc::new(BossClient::new(&config.boss)?);

        info!(
            target: "atlas-services",
            "Service context ready (boss={}, max_concurrent_checks={})",
            config.boss.base_url,
            config.query.max_concurrent_checks
        );

        Ok(Self::with_backends(config, store, enumerator))
    }

    /// Wire the services over caller-provided backends
    pub fn with_backends(
        config: &AtlasConfig,
        store: Arc<dyn StructuralStore>,
        enumerator: Arc<dyn IdEnumerator>,
    ) -> Self {
        let resolver = RegionResolver::new(store.clone(), enumerator.clone());
        let aggregator = ChildAggregator::new(
            store.clone(),
            resolver,
            config.query.max_concurrent_checks,
            config.query.traversal_timeout(),
        );
        let structural_service = Arc::new(StructuralServiceImpl::new(
            store.clone(),
            enumerator.clone(),
            aggregator,
            config.query.max_resolution,
        ));

        Self {
            store,
            enumerator,
            structural_service,
        }
    }
}
