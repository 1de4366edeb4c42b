// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Service layer error types.

Transport-agnostic errors that adapters map to HTTP status codes.
*/

use atlas_structures::{AtlasDataError, EntityId};
use thiserror::Error;

use super::dtos::ChildSynapse;

/// Failure talking to the remote id-enumeration service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteServiceError {
    /// The service answered with HTTP status >= 400
    #[error("remote service returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The request never produced a response (connect, timeout, reset)
    #[error("remote service transport failure: {0}")]
    Transport(String),

    /// The response body was not the expected `{"ids": [...]}` document
    #[error("remote service returned a malformed body: {0}")]
    MalformedBody(String),
}

/// Service layer errors (transport-agnostic)
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    /// Resource not found (404 in HTTP)
    #[error("Not found: {resource} with id '{id}'")]
    NotFound { resource: String, id: String },

    /// Invalid input parameters (400 in HTTP)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote enumeration failure (502 in HTTP)
    #[error(transparent)]
    RemoteService(#[from] RemoteServiceError),

    /// Relational store failure
    #[error("Store error: {0}")]
    Store(String),

    /// A traversal ran past its deadline
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Internal service error (500 in HTTP)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

// ============================================================================
// ERROR CONVERSIONS FROM BACKEND
// ============================================================================

impl From<AtlasDataError> for ServiceError {
    fn from(err: AtlasDataError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Store(err.to_string())
    }
}

/// An aggregation that stopped early
///
/// `partial` holds every match resolved before the traversal stopped; it is
/// never discarded. `failed_candidate` is the synapse whose check failed, or
/// `None` when the failure was not tied to one candidate (unknown neuron,
/// store failure while listing candidates, deadline).
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct PartialFailure {
    pub partial: Vec<ChildSynapse>,
    pub failed_candidate: Option<EntityId>,
    #[source]
    pub error: ServiceError,
}

impl PartialFailure {
    pub fn new(
        partial: Vec<ChildSynapse>,
        failed_candidate: Option<EntityId>,
        error: ServiceError,
    ) -> Self {
        Self {
            partial,
            failed_candidate,
            error,
        }
    }
}

impl From<ServiceError> for PartialFailure {
    fn from(error: ServiceError) -> Self {
        PartialFailure::new(Vec::new(), None, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_is_transparent() {
        let err: ServiceError = RemoteServiceError::Status {
            status: 503,
            url: "http://boss/ids/".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "remote service returned status 503 for http://boss/ids/"
        );
    }

    #[test]
    fn test_partial_failure_displays_cause() {
        let failure = PartialFailure::from(ServiceError::not_found("Neuron", 7));
        assert!(failure.partial.is_empty());
        assert_eq!(failure.to_string(), "Not found: Neuron with id '7'");
    }
}
