// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type for atlas data parsing and validation.
///
/// Raised at the boundary, before any region membership logic runs.
///
/// # Examples
/// ```
/// use atlas_structures::{AtlasDataError, AxisRange};
///
/// let err = "12,abc".parse::<AxisRange>().unwrap_err();
/// assert!(matches!(err, AtlasDataError::BadParameters(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasDataError {
    /// Invalid parameters provided by a caller (malformed range, id, resolution)
    BadParameters(String),
    /// Failed to deserialize a value received from an external system
    DeserializationError(String),
}

impl Display for AtlasDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AtlasDataError::BadParameters(msg) => write!(f, "Bad Parameters: {}", msg),
            AtlasDataError::DeserializationError(msg) => {
                write!(f, "Failed to Deserialize: {}", msg)
            }
        }
    }
}

impl Error for AtlasDataError {}
