// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller authentication for `/v1` routes.
//!
//! [`auth_layer`] resolves every request to a [`Caller`] before it reaches a
//! handler:
//!
//! - with `x-admin-api-key`, the key must match the configured admin key
//! - otherwise `x-client-secret-id` and `x-client-secret` must verify against
//!   a current client secret
//!
//! Anything else is rejected with 401. Handlers then use [`Caller`] or
//! [`RequireAdmin`] to narrow access further.

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, HeaderMap, Request},
	middleware::Next,
	response::{IntoResponse, Response},
};
use projconf_server_auth::{Client, EnvironmentId};
use tracing::{instrument, warn};

use crate::{api::AppState, error::ServerError};

pub const ADMIN_KEY_HEADER: &str = "x-admin-api-key";
pub const CLIENT_SECRET_ID_HEADER: &str = "x-client-secret-id";
pub const CLIENT_SECRET_HEADER: &str = "x-client-secret";

/// The authenticated principal of a request.
#[derive(Debug, Clone)]
pub enum Caller {
	Admin,
	Client(Client),
}

impl Caller {
	/// Admins may act on any environment, clients only on their own.
	pub fn ensure_environment(&self, environment_id: &EnvironmentId) -> Result<(), ServerError> {
		match self {
			Caller::Admin => Ok(()),
			Caller::Client(client) if &client.environment_id == environment_id => Ok(()),
			Caller::Client(client) => {
				warn!(client_id = %client.id, "client denied access outside its environment");
				Err(ServerError::Forbidden)
			}
		}
	}
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers.get(name).and_then(|h| h.to_str().ok())
}

/// The raw admin key presented with a request, if any.
pub fn presented_admin_key(headers: &HeaderMap) -> Option<&str> {
	header(headers, ADMIN_KEY_HEADER)
}

#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(caller = tracing::field::Empty, client_id = tracing::field::Empty)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let span = tracing::Span::current();
	let headers = request.headers();

	let caller = if let Some(key) = presented_admin_key(headers) {
		if !state.service.is_admin(key) {
			return ServerError::Unauthorized.into_response();
		}
		span.record("caller", "admin");
		Caller::Admin
	} else {
		let (Some(secret_id), Some(secret)) = (
			header(headers, CLIENT_SECRET_ID_HEADER),
			header(headers, CLIENT_SECRET_HEADER),
		) else {
			warn!("request without credentials");
			return ServerError::Unauthorized.into_response();
		};

		let Some(client) = state.service.authenticate_client(secret_id, secret).await else {
			warn!("client authentication failed");
			return ServerError::Unauthorized.into_response();
		};
		span.record("caller", "client");
		span.record("client_id", tracing::field::display(&client.id));
		Caller::Client(client)
	};

	request.extensions_mut().insert(caller);
	next.run(request).await
}

impl<S> FromRequestParts<S> for Caller
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts
			.extensions
			.get::<Caller>()
			.cloned()
			.ok_or(ServerError::Unauthorized)
	}
}

/// Extractor that admits admin callers only. Clients get 403.
#[derive(Debug)]
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		match Caller::from_request_parts(parts, state).await? {
			Caller::Admin => Ok(RequireAdmin),
			Caller::Client(client) => {
				warn!(client_id = %client.id, "client denied access to admin route");
				Err(ServerError::Forbidden)
			}
		}
	}
}

/// Extractor that admits client callers only.
#[derive(Debug)]
pub struct RequireClient(pub Client);

impl<S> FromRequestParts<S> for RequireClient
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		match Caller::from_request_parts(parts, state).await? {
			Caller::Client(client) => Ok(RequireClient(client)),
			Caller::Admin => Err(ServerError::Forbidden),
		}
	}
}
