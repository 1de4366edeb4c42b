// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Service trait definitions.

These traits define the stable application boundary between
transport adapters and domain logic.
*/

pub mod id_enumerator;
pub mod structural_service;
pub mod structural_store;

// Re-export for convenience
pub use id_enumerator::IdEnumerator;
pub use structural_service::StructuralService;
pub use structural_store::StructuralStore;
