// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// HTTP server implementation (Axum)
//
// This module sets up the HTTP API server with Axum, including routing,
// middleware, and state management.

use atlas_services::{AtlasContext, StructuralService};
use axum::{
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::common::{ApiError, ApiErrorCode};
use crate::endpoints::{health, structural};
use crate::middleware::cors::create_cors_layer;
use crate::openapi::ApiDoc;

/// Application state shared across all HTTP handlers
#[derive(Clone)]
pub struct ApiState {
    pub structural_service: Arc<dyn StructuralService + Send + Sync>,
}

impl ApiState {
    pub fn from_context(context: &AtlasContext) -> Self {
        Self {
            structural_service: context.structural_service.clone(),
        }
    }
}

/// Create the main HTTP server application
pub fn create_http_server(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(|| async {
            Json(ApiDoc::openapi())
        }))
        .merge(create_structural_router())
        // Catch-all route for unmatched requests
        .fallback(|| async {
            tracing::warn!(target: "atlas-api", "Unmatched request - 404 Not Found");
            ApiError::new("404 Not Found")
                .with_code(ApiErrorCode::NotFound)
                .into_response()
        })
        .with_state(state)
        .layer(create_cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::span!(
                        target: "atlas-api",
                        tracing::Level::DEBUG,
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    tracing::debug!(target: "atlas-api", "Incoming request: {} {}", request.method(), request.uri());
                })
                .on_response(|response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                    tracing::debug!(
                        target: "atlas-api",
                        "Response: status={}, latency={:?}",
                        response.status(),
                        latency
                    );
                })
                .on_failure(|error: tower_http::classify::ServerErrorsFailureClass, latency: std::time::Duration, _span: &tracing::Span| {
                    tracing::error!(target: "atlas-api", "Request failed: {}, latency={:?}", error, latency);
                })
        )
}

/// Structural routes; every path keeps its trailing slash
fn create_structural_router() -> Router<ApiState> {
    const CHANNEL: &str = ":collection/:experiment/:layer";
    const REGION: &str = ":resolution/:xrange/:yrange/:zrange";

    Router::new()
        .route(&format!("/is_synapse/{CHANNEL}/:id/"), get(structural::is_synapse))
        .route(&format!("/is_neuron/{CHANNEL}/:id/"), get(structural::is_neuron))
        .route(&format!("/synapse_ids/{CHANNEL}/{REGION}/"), get(structural::synapse_ids))
        .route(&format!("/neuron_ids/{CHANNEL}/{REGION}/"), get(structural::neuron_ids))
        .route(
            &format!("/synapse_keypoint/{CHANNEL}/:resolution/:id/"),
            get(structural::synapse_keypoint),
        )
        .route(
            &format!("/neuron_keypoint/{CHANNEL}/:resolution/:id/"),
            get(structural::neuron_keypoint),
        )
        .route(&format!("/synapse_parent/{CHANNEL}/:id/"), get(structural::synapse_parent))
        .route(
            &format!("/neuron_children/{CHANNEL}/{REGION}/:id/"),
            get(structural::neuron_children),
        )
        .route(&format!("/neighbors/{CHANNEL}/:id/"), get(structural::neighbors))
        .route(&format!("/bbox/{CHANNEL}/:id/"), get(structural::bbox))
}

/// Bind and serve until the process is stopped
pub async fn serve(state: ApiState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_http_server(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "atlas-api", "Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
