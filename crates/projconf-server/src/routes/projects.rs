// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};

use super::ensure_project_access;
use crate::{
	api::AppState,
	api_types::{CreateProjectRequest, IdResponse, ProjectResponse},
	auth::{Caller, RequireAdmin},
	error::{ErrorResponse, ServerError},
};

#[utoipa::path(
    get,
    path = "/v1/projects",
    responses(
        (status = 200, description = "Projects visible to the caller", body = Vec<ProjectResponse>),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse)
    ),
    tag = "projects"
)]
#[tracing::instrument(skip(state, caller))]
pub async fn list_projects(
	caller: Caller,
	State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ServerError> {
	let projects = match caller {
		Caller::Admin => state.service.list_projects().await?,
		Caller::Client(client) => vec![
			state
				.service
				.project_of_environment(&client.environment_id)
				.await?,
		],
	};
	Ok(Json(projects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = IdResponse),
        (status = 400, description = "Invalid display name", body = ErrorResponse),
        (status = 403, description = "Admin required", body = ErrorResponse),
        (status = 409, description = "Display name taken", body = ErrorResponse)
    ),
    tag = "projects"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn create_project(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let project = state.service.create_project(&payload.display).await?;
	Ok((
		StatusCode::CREATED,
		Json(IdResponse {
			id: project.id.into_inner(),
		}),
	))
}

#[utoipa::path(
    get,
    path = "/v1/projects/{project_id}",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "The project", body = ProjectResponse),
        (status = 403, description = "Client outside this project", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
#[tracing::instrument(skip(state, caller), fields(%project_id))]
pub async fn get_project(
	caller: Caller,
	State(state): State<AppState>,
	Path(project_id): Path<String>,
) -> Result<Json<ProjectResponse>, ServerError> {
	ensure_project_access(&state, &caller, &project_id).await?;
	let project = state.service.get_project(&project_id).await?;
	Ok(Json(project.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/projects/{project_id}",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 204, description = "Project and everything under it deleted"),
        (status = 403, description = "Admin required", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
#[tracing::instrument(skip(state), fields(%project_id))]
pub async fn delete_project(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Path(project_id): Path<String>,
) -> Result<StatusCode, ServerError> {
	state.service.delete_project(&project_id).await?;
	Ok(StatusCode::NO_CONTENT)
}
