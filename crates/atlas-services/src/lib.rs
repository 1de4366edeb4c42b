// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Atlas Service Layer

The stable application boundary for the connectome atlas: transport-agnostic
service interfaces over the structural store and the remote id enumeration
service.

## Architecture

```text
┌─────────────────────────────────────────────────────────────────┐
│                    TRANSPORT ADAPTERS                            │
│  Axum/REST (atlas-api)                                          │
└────────────────────────────┬────────────────────────────────────┘
                             ↓
┌─────────────────────────────────────────────────────────────────┐
│              SERVICE LAYER (This Crate)                          │
│  • StructuralService - lookups and region queries               │
│  • ChildAggregator   - a neuron's synapses inside a region      │
│  • RegionResolver    - one entity vs. one region                │
└────────────────────────────┬────────────────────────────────────┘
                             ↓
┌─────────────────────────────────────────────────────────────────┐
│                     BACKENDS                                     │
│  StructuralStore (SQLite, in-memory), IdEnumerator (boss HTTP)  │
└─────────────────────────────────────────────────────────────────┘
```

## Region queries

Membership of a synapse in a region is decided geometrically whenever
possible. Only boxes that straddle the region border cost a remote call,
and then exactly one, on the overlap. See [`impls::RegionResolver`].

Membership checks for one neuron run with bounded concurrency
(`query.max_concurrent_checks`). The first failure cancels the rest and is
reported with every match found so far, as a [`PartialFailure`].
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod context;
pub mod impls;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use context::AtlasContext;
pub use traits::*;
pub use types::*;
