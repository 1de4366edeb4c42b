// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// API error type and its HTTP mapping

use atlas_services::{PartialFailure, ServiceError};
use atlas_structures::AtlasDataError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::endpoints::structural::child_synapse_map;

/// API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    NotFound,
    InvalidInput,
    RemoteService,
    DeadlineExceeded,
    Internal,
}

/// API error type
#[derive(Debug, Error, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error detail message
    pub detail: String,

    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ApiErrorCode>,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: None,
            details: None,
        }
    }

    pub fn with_code(mut self, code: ApiErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        let resource = resource.into();
        let id = id.into();
        Self::new(format!("{} '{}' not found", resource, id))
            .with_code(ApiErrorCode::NotFound)
            .with_details(serde_json::json!({
                "resource": resource,
                "id": id
            }))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(message).with_code(ApiErrorCode::InvalidInput)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message).with_code(ApiErrorCode::Internal)
    }

    /// HTTP status for this error; an error without a code is a 500
    pub fn status_code(&self) -> StatusCode {
        match self.code {
            Some(ApiErrorCode::NotFound) => StatusCode::NOT_FOUND,
            Some(ApiErrorCode::InvalidInput) => StatusCode::BAD_REQUEST,
            Some(ApiErrorCode::RemoteService) => StatusCode::BAD_GATEWAY,
            Some(ApiErrorCode::DeadlineExceeded) | Some(ApiErrorCode::Internal) | None => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(target: "atlas-api", "{} {}", status.as_u16(), self.detail);
        }
        (status, Json(self)).into_response()
    }
}

/// Convert service layer errors to API errors
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { resource, id } => ApiError::not_found(resource, id),
            ServiceError::InvalidInput(msg) => ApiError::invalid_input(msg),
            ServiceError::RemoteService(remote) => {
                ApiError::new(remote.to_string()).with_code(ApiErrorCode::RemoteService)
            }
            ServiceError::DeadlineExceeded(msg) => {
                ApiError::new(msg).with_code(ApiErrorCode::DeadlineExceeded)
            }
            ServiceError::Store(msg) => ApiError::internal(format!("Store error: {}", msg)),
            ServiceError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

/// An aggregation failure keeps its partial result in `details`
impl From<PartialFailure> for ApiError {
    fn from(failure: PartialFailure) -> Self {
        let PartialFailure {
            partial,
            failed_candidate,
            error,
        } = failure;

        let mut api_error = ApiError::from(error);
        let mut details = match api_error.details.take() {
            Some(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        let child_synapses = child_synapse_map(&partial)
            .into_iter()
            .map(|(id, polarity)| (id, serde_json::Value::from(polarity)))
            .collect();
        details.insert(
            "child_synapses".to_string(),
            serde_json::Value::Object(child_synapses),
        );
        details.insert(
            "failed_candidate".to_string(),
            failed_candidate.map_or(serde_json::Value::Null, |id| id.to_string().into()),
        );
        api_error.with_details(serde_json::Value::Object(details))
    }
}

impl From<AtlasDataError> for ApiError {
    fn from(err: AtlasDataError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}
