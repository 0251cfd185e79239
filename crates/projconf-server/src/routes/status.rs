// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Unauthenticated status and readiness checks.

use axum::{extract::State, Json};

use crate::{
	api::AppState,
	api_types::{ReadyResponse, ServerStatus, ServiceStatus, StatusResponse},
	error::{ErrorResponse, ServerError},
};

#[utoipa::path(
    get,
    path = "/v1/status",
    responses(
        (status = 200, description = "Server and dependency status", body = StatusResponse)
    ),
    tag = "status"
)]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
	let database = state.service.database_ready().await;
	Json(StatusResponse {
		server: ServerStatus {
			is_ready: database,
			version: env!("CARGO_PKG_VERSION").to_string(),
		},
		services: ServiceStatus { database },
	})
}

#[utoipa::path(
    get,
    path = "/v1/status/ready",
    responses(
        (status = 200, description = "Ready to serve requests", body = ReadyResponse),
        (status = 503, description = "A dependency is not ready", body = ErrorResponse)
    ),
    tag = "status"
)]
/// GET /v1/status/ready - Readiness check for load balancers.
pub async fn get_ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, ServerError> {
	if state.service.database_ready().await {
		Ok(Json(ReadyResponse {
			msg: "ready".to_string(),
		}))
	} else {
		Err(ServerError::Unavailable(
			"one or more services are not ready".to_string(),
		))
	}
}
