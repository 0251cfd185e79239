// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error responses.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::service::ServiceError;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("bad request: {0}")]
	BadRequest(String),

	#[error("unauthorized")]
	Unauthorized,

	#[error("forbidden")]
	Forbidden,

	#[error("not found: {0}")]
	NotFound(String),

	#[error("conflict: {0}")]
	Conflict(String),

	#[error("unavailable: {0}")]
	Unavailable(String),

	#[error("generator invalid: {0}")]
	GeneratorInvalid(String),

	#[error("internal error: {0}")]
	Internal(String),
}

impl From<ServiceError> for ServerError {
	fn from(e: ServiceError) -> Self {
		match e {
			ServiceError::Validation(v) => ServerError::BadRequest(v.to_string()),
			ServiceError::InvalidIdentifier(v) => ServerError::BadRequest(v.to_string()),
			ServiceError::NotFound(what) => ServerError::NotFound(format!("{what} not found")),
			ServiceError::EnvironmentNotFound(_) => {
				ServerError::NotFound("environment not found".to_string())
			}
			ServiceError::Unauthorized => ServerError::Unauthorized,
			ServiceError::Conflict(msg) => ServerError::Conflict(msg),
			ServiceError::ConflictRetryExhausted { .. } => {
				ServerError::Unavailable("secret is being created concurrently, retry".to_string())
			}
			ServiceError::GeneratorInvalid(v) => ServerError::GeneratorInvalid(v.to_string()),
			ServiceError::Internal(msg) => ServerError::Internal(msg),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error, description) = match &self {
			ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
			ServerError::Unauthorized => (
				StatusCode::UNAUTHORIZED,
				"unauthorized",
				"missing or invalid credentials".to_string(),
			),
			ServerError::Forbidden => (
				StatusCode::FORBIDDEN,
				"forbidden",
				"caller may not access this resource".to_string(),
			),
			ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
			ServerError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
			ServerError::Unavailable(msg) => {
				(StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg.clone())
			}
			ServerError::GeneratorInvalid(msg) => {
				tracing::error!(error = %msg, "stored generator rejected");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					"generator_invalid",
					format!("stored generator is invalid: {msg}"),
				)
			}
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal_error",
					"internal server error".to_string(),
				)
			}
		};

		let body = ErrorResponse {
			error: error.to_string(),
			description,
		};
		(status, Json(body)).into_response()
	}
}
