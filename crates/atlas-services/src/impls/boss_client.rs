// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
HTTP client for the remote voxel-indexed id enumeration service (boss).
*/

use crate::traits::IdEnumerator;
use crate::types::*;
use async_trait::async_trait;
use atlas_config::BossConfig;
use atlas_structures::BBox;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct IdsPayload {
    ids: Vec<String>,
}

/// Enumerates ids over HTTP
///
/// One `reqwest::Client` is built at startup and shared by every request;
/// it carries the configured per-request timeout. Requests are never retried.
#[derive(Clone)]
pub struct BossClient {
    http_client: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl BossClient {
    pub fn new(config: &BossConfig) -> ServiceResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ServiceError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http_client(config, http_client))
    }

    /// Build on a pre-configured `reqwest::Client`
    pub fn with_http_client(config: &BossConfig, http_client: reqwest::Client) -> Self {
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            http_client,
            base_url,
            auth_token: config.auth_token.clone(),
        }
    }

    /// `{base}ids/{channel}/{resolution}/{x_lo}:{x_hi}/{y_lo}:{y_hi}/{z_lo}:{z_hi}/`
    ///
    /// The service takes half-open ranges, so each upper bound is `max + 1`.
    pub fn ids_url(&self, channel: &str, bbox: &BBox, resolution: u32) -> String {
        let [x, y, z] = bbox.to_half_open();
        format!(
            "{}ids/{}/{}/{}/{}/{}/",
            self.base_url, channel, resolution, x, y, z
        )
    }

    /// Decode an `{"ids": [...]}` body
    pub fn parse_ids_payload(body: &[u8]) -> Result<Vec<String>, RemoteServiceError> {
        serde_json::from_slice::<IdsPayload>(body)
            .map(|payload| payload.ids)
            .map_err(|e| RemoteServiceError::MalformedBody(e.to_string()))
    }
}

#[async_trait]
impl IdEnumerator for BossClient {
    async fn enumerate(&self, channel: &str, bbox: &BBox, resolution: u32) -> ServiceResult<Vec<String>> {
        let url = self.ids_url(channel, bbox, resolution);
        debug!(target: "atlas-services", "Enumerating ids: {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, &self.auth_token)
            .send()
            .await
            .map_err(|e| RemoteServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(RemoteServiceError::Status {
                status: status.as_u16(),
                url,
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteServiceError::Transport(e.to_string()))?;

        let ids = Self::parse_ids_payload(&body)?;
        debug!(target: "atlas-services", "Enumeration returned {} ids", ids.len());
        Ok(ids)
    }
}
