// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Variable handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};

use super::ensure_project_access;
use crate::{
	api::AppState,
	api_types::{
		CreateVariableRequest, GeneratorBody, IdResponse, SecretResponse, VariableResponse,
	},
	auth::{Caller, RequireAdmin},
	error::{ErrorResponse, ServerError},
};

#[utoipa::path(
    get,
    path = "/v1/projects/{project_id}/variables",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Variables of the project ordered by key", body = Vec<VariableResponse>),
        (status = 403, description = "Client outside this project", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "variables"
)]
#[tracing::instrument(skip(state, caller), fields(%project_id))]
pub async fn list_variables(
	caller: Caller,
	State(state): State<AppState>,
	Path(project_id): Path<String>,
) -> Result<Json<Vec<VariableResponse>>, ServerError> {
	ensure_project_access(&state, &caller, &project_id).await?;
	let variables = state.service.list_variables(&project_id).await?;
	Ok(Json(variables.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/v1/projects/{project_id}/variables",
    params(
        ("project_id" = String, Path, description = "Project ID")
    ),
    request_body = CreateVariableRequest,
    responses(
        (status = 201, description = "Variable defined", body = IdResponse),
        (status = 400, description = "Invalid key or generator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 409, description = "Key already defined in the project", body = ErrorResponse)
    ),
    tag = "variables"
)]
#[tracing::instrument(skip(state, payload), fields(%project_id))]
pub async fn create_variable(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Path(project_id): Path<String>,
	Json(payload): Json<CreateVariableRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let variable = state
		.service
		.define_variable(
			&project_id,
			&payload.key,
			&payload.description,
			&payload.generator.kind,
			&payload.generator.data,
		)
		.await?;
	Ok((
		StatusCode::CREATED,
		Json(IdResponse {
			id: variable.id.into_inner(),
		}),
	))
}

#[utoipa::path(
    put,
    path = "/v1/variables/{variable_id}/generator",
    params(
        ("variable_id" = String, Path, description = "Variable ID")
    ),
    request_body = GeneratorBody,
    responses(
        (status = 200, description = "Generator replaced; existing values discarded", body = VariableResponse),
        (status = 400, description = "Invalid generator", body = ErrorResponse),
        (status = 404, description = "Variable not found", body = ErrorResponse)
    ),
    tag = "variables"
)]
#[tracing::instrument(skip(state, payload), fields(%variable_id))]
pub async fn update_generator(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Path(variable_id): Path<String>,
	Json(payload): Json<GeneratorBody>,
) -> Result<Json<VariableResponse>, ServerError> {
	let variable = state
		.service
		.update_variable_generator(&variable_id, &payload.kind, &payload.data)
		.await?;
	Ok(Json(variable.into()))
}

#[utoipa::path(
    get,
    path = "/v1/variables/{variable_id}/default",
    params(
        ("variable_id" = String, Path, description = "Variable ID")
    ),
    responses(
        (status = 200, description = "Earliest materialized value of the variable", body = SecretResponse),
        (status = 404, description = "Variable never materialized", body = ErrorResponse)
    ),
    tag = "variables"
)]
#[tracing::instrument(skip(state), fields(%variable_id))]
pub async fn get_default(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Path(variable_id): Path<String>,
) -> Result<Json<SecretResponse>, ServerError> {
	let secret = state.service.get_default_secret(&variable_id).await?;
	Ok(Json(secret.into()))
}
