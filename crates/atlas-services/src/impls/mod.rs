// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Service implementations.

Default implementations of the service traits over SQLite and the remote
enumeration service, plus an in-memory store for fixtures.
*/

pub mod aggregator;
pub mod boss_client;
pub mod memory_store;
pub mod resolver;
pub mod sqlite_store;
pub mod structural_service_impl;

// Re-export for convenience
pub use aggregator::ChildAggregator;
pub use boss_client::BossClient;
pub use memory_store::InMemoryStructuralStore;
pub use resolver::RegionResolver;
pub use sqlite_store::{SqliteStructuralStore, SCHEMA_SQL};
pub use structural_service_impl::StructuralServiceImpl;
