// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client credential handlers.
//!
//! Issued secrets appear in exactly one response and are never stored in
//! plaintext.

use axum::{
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	Json,
};

use crate::{
	api::AppState,
	api_types::{ClientResponse, CreateClientRequest, IssuedCredentialResponse},
	auth::{presented_admin_key, RequireAdmin, RequireClient},
	error::{ErrorResponse, ServerError},
};

#[utoipa::path(
    get,
    path = "/v1/environments/{environment_id}/clients",
    params(
        ("environment_id" = String, Path, description = "Environment ID")
    ),
    responses(
        (status = 200, description = "Clients of the environment", body = Vec<ClientResponse>),
        (status = 404, description = "Environment not found", body = ErrorResponse)
    ),
    tag = "clients"
)]
#[tracing::instrument(skip(state), fields(%environment_id))]
pub async fn list_clients(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Path(environment_id): Path<String>,
) -> Result<Json<Vec<ClientResponse>>, ServerError> {
	let clients = state.service.list_clients(&environment_id).await?;
	Ok(Json(clients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/v1/environments/{environment_id}/clients",
    params(
        ("environment_id" = String, Path, description = "Environment ID")
    ),
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client issued; the secret is shown once", body = IssuedCredentialResponse),
        (status = 400, description = "Invalid display name", body = ErrorResponse),
        (status = 401, description = "Missing or invalid admin key", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse)
    ),
    tag = "clients"
)]
#[tracing::instrument(skip(state, headers, payload), fields(%environment_id))]
pub async fn issue_client(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Path(environment_id): Path<String>,
	headers: HeaderMap,
	Json(payload): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let issued = state
		.service
		.issue_client(
			&environment_id,
			&payload.display,
			presented_admin_key(&headers),
		)
		.await?;
	tracing::info!(client_id = %issued.client_id, "client issued");
	Ok((
		StatusCode::CREATED,
		Json(IssuedCredentialResponse::from(issued)),
	))
}

#[utoipa::path(
    post,
    path = "/v1/clients/{client_id}/secrets",
    params(
        ("client_id" = String, Path, description = "Client ID")
    ),
    responses(
        (status = 201, description = "New current secret; earlier secrets stop verifying", body = IssuedCredentialResponse),
        (status = 401, description = "Missing or invalid admin key", body = ErrorResponse),
        (status = 404, description = "Client not found", body = ErrorResponse)
    ),
    tag = "clients"
)]
#[tracing::instrument(skip(state, headers), fields(%client_id))]
pub async fn rotate_client_secret(
	_admin: RequireAdmin,
	State(state): State<AppState>,
	Path(client_id): Path<String>,
	headers: HeaderMap,
) -> Result<impl IntoResponse, ServerError> {
	let issued = state
		.service
		.rotate_client_secret(&client_id, presented_admin_key(&headers))
		.await?;
	tracing::info!(client_id = %issued.client_id, "client secret rotated");
	Ok((
		StatusCode::CREATED,
		Json(IssuedCredentialResponse::from(issued)),
	))
}

#[utoipa::path(
    get,
    path = "/v1/clients/self",
    responses(
        (status = 200, description = "The authenticated client", body = ClientResponse),
        (status = 403, description = "Caller is not a client", body = ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn get_self(RequireClient(client): RequireClient) -> Json<ClientResponse> {
	Json(client.into())
}
