// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};

use projconf_server_auth::{parse_id, EnvironmentId};

use super::ensure_project_access;
use crate::{
	api::AppState,
	api_types::{CreateEnvironmentRequest, EnvironmentResponse, IdResponse},
	auth::{Caller, RequireAdmin},
	error::{ErrorResponse, ServerError},
	service::ServiceError,
};

#[utoipa::path(
    get,
    path = "/v1/projects/{project_id}/environments",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Environments of the project", body = Vec<EnvironmentResponse>),
        (status = 403, description = "Client outside this project", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "environments"
)]
#[tracing::instrument(skip(state, caller), fields(%project_id))]
pub async fn list_environments(
	caller: Caller,
	State(state): State<AppState>,
	Path(project_id): Path<String>,
) -> Result<Json<Vec<EnvironmentResponse>>, ServerError> {
	ensure_project_access(&state, &caller, &project_id).await?;
	let environments = state.service.list_environments(&project_id).await?;
	Ok(Json(environments.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/v1/projects/{project_id}/environments",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    request_body = CreateEnvironmentRequest,
    responses(
        (status = 201, description = "Environment created", body = IdResponse),
        (status = 400, description = "Invalid display name", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 409, description = "Display name taken within the project", body = ErrorResponse)
    ),
    tag = "environments"
)]
#[tracing::instrument(skip(state, payload), fields(%project_id))]
pub async fn create_environment(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Path(project_id): Path<String>,
	Json(payload): Json<CreateEnvironmentRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let environment = state
		.service
		.create_environment(&project_id, &payload.display)
		.await?;
	Ok((
		StatusCode::CREATED,
		Json(IdResponse {
			id: environment.id.into_inner(),
		}),
	))
}

#[utoipa::path(
    get,
    path = "/v1/environments/{environment_id}",
    params(
        ("environment_id" = String, Path, description = "Environment ID")
    ),
    responses(
        (status = 200, description = "The environment", body = EnvironmentResponse),
        (status = 403, description = "Client bound to another environment", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse)
    ),
    tag = "environments"
)]
#[tracing::instrument(skip(state, caller), fields(%environment_id))]
pub async fn get_environment(
	caller: Caller,
	State(state): State<AppState>,
	Path(environment_id): Path<String>,
) -> Result<Json<EnvironmentResponse>, ServerError> {
	let id: EnvironmentId = parse_id(&environment_id).map_err(ServiceError::from)?;
	caller.ensure_environment(&id)?;
	let environment = state.service.get_environment(&environment_id).await?;
	Ok(Json(environment.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/environments/{environment_id}",
    params(
        ("environment_id" = String, Path, description = "Environment ID")
    ),
    responses(
        (status = 204, description = "Environment, its secrets and clients deleted"),
        (status = 403, description = "Admin required", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse)
    ),
    tag = "environments"
)]
#[tracing::instrument(skip(state), fields(%environment_id))]
pub async fn delete_environment(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Path(environment_id): Path<String>,
) -> Result<StatusCode, ServerError> {
	state.service.delete_environment(&environment_id).await?;
	Ok(StatusCode::NO_CONTENT)
}
