// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Materialized values for one environment.
//!
//! Reading this endpoint creates any value not yet materialized.

use axum::{
	extract::{Path, State},
	Json,
};
use projconf_server_auth::{parse_id, EnvironmentId};

use crate::{
	api::AppState,
	api_types::EnvironmentSecretResponse,
	auth::Caller,
	error::{ErrorResponse, ServerError},
	service::ServiceError,
};

#[utoipa::path(
    get,
    path = "/v1/projects/{project_id}/environments/{environment_id}/secrets",
    params(
        ("project_id" = String, Path, description = "Project ID"),
        ("environment_id" = String, Path, description = "Environment ID")
    ),
    responses(
        (status = 200, description = "Every variable of the project with its value", body = Vec<EnvironmentSecretResponse>),
        (status = 403, description = "Client outside this environment", body = ErrorResponse),
        (status = 404, description = "Environment not found or no variables defined", body = ErrorResponse),
        (status = 503, description = "Concurrent materialization did not settle", body = ErrorResponse)
    ),
    tag = "secrets"
)]
#[tracing::instrument(skip(state, caller), fields(%project_id, %environment_id))]
pub async fn list_environment_secrets(
	caller: Caller,
	State(state): State<AppState>,
	Path((project_id, environment_id)): Path<(String, String)>,
) -> Result<Json<Vec<EnvironmentSecretResponse>>, ServerError> {
	let parsed: EnvironmentId = parse_id(&environment_id).map_err(ServiceError::from)?;
	caller.ensure_environment(&parsed)?;

	let secrets = state
		.service
		.environment_secrets(&project_id, &environment_id)
		.await?;
	if secrets.is_empty() {
		return Err(ServerError::NotFound(
			"no variables defined for this project".to_string(),
		));
	}

	Ok(Json(secrets.into_iter().map(Into::into).collect()))
}
