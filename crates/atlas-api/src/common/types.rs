// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Extractor and state aliases shared by the endpoints

pub use crate::transports::http::server::ApiState;
pub use axum::extract::{Path, Query, State};
pub use axum::response::Json;
