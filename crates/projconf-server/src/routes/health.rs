// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health handler.

use axum::Json;
use chrono::Utc;

use crate::{
	api_types::HealthResponse,
	auth::RequireAdmin,
	error::ErrorResponse,
};

#[utoipa::path(
    get,
    path = "/v1/admin/health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse),
        (status = 401, description = "Missing or invalid admin key", body = ErrorResponse),
        (status = 403, description = "Admin required", body = ErrorResponse)
    ),
    tag = "health"
)]
/// GET /v1/admin/health - Liveness check for operators.
pub async fn health_check(_admin: RequireAdmin) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok".to_string(),
		timestamp: Utc::now(),
		version: env!("CARGO_PKG_VERSION").to_string(),
	})
}
