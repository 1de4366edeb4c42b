// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// Atlas REST API Layer
//
// Axum transport over the atlas service layer. Handlers parse and validate
// path parameters, call `StructuralService` and map `ServiceError` onto HTTP
// statuses through `ApiError`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod endpoints;
pub mod middleware;
pub mod openapi;
pub mod transports;

// Re-export commonly used types
pub use common::{ApiError, ApiErrorCode, ApiResult};
pub use transports::http::{create_http_server, serve, ApiState};
