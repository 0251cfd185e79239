// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request and response bodies for the `/v1` API.

use chrono::{DateTime, Utc};
use projconf_server_auth::{Client, IssuedCredential};
use projconf_server_db::{Environment, Project, SecretRecord, Variable};
use projconf_server_secrets::EnvironmentSecret;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
	pub display: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEnvironmentRequest {
	pub display: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateClientRequest {
	pub display: String,
}

/// A generator definition as submitted by callers.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GeneratorBody {
	/// `STATIC` or `RANDOM`.
	#[serde(rename = "type")]
	pub kind: String,
	/// A string (or `{"value": ...}`) for `STATIC`; `{length, letters, numbers, symbols}` for `RANDOM`.
	#[serde(default)]
	#[schema(value_type = Object)]
	pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateVariableRequest {
	pub key: String,
	#[serde(default)]
	pub description: String,
	pub generator: GeneratorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdResponse {
	pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
	pub id: Uuid,
	pub display: String,
	pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
	fn from(p: Project) -> Self {
		Self {
			id: p.id.into_inner(),
			display: p.display,
			created_at: p.created_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnvironmentResponse {
	pub id: Uuid,
	pub project_id: Uuid,
	pub display: String,
	pub created_at: DateTime<Utc>,
}

impl From<Environment> for EnvironmentResponse {
	fn from(e: Environment) -> Self {
		Self {
			id: e.id.into_inner(),
			project_id: e.project_id.into_inner(),
			display: e.display,
			created_at: e.created_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VariableResponse {
	pub id: Uuid,
	pub project_id: Uuid,
	pub key: String,
	pub description: String,
	pub generator_type: String,
	#[schema(value_type = Object)]
	pub generator_data: serde_json::Value,
	pub created_at: DateTime<Utc>,
}

impl From<Variable> for VariableResponse {
	fn from(v: Variable) -> Self {
		Self {
			id: v.id.into_inner(),
			project_id: v.project_id.into_inner(),
			key: v.key,
			description: v.description,
			generator_type: v.generator_type,
			generator_data: v.generator_data,
			created_at: v.created_at,
		}
	}
}

/// A materialized value. Only returned to authorized callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SecretResponse {
	pub id: Uuid,
	pub variable_id: Uuid,
	pub environment_id: Uuid,
	pub value: String,
	pub created_at: DateTime<Utc>,
}

impl From<SecretRecord> for SecretResponse {
	fn from(s: SecretRecord) -> Self {
		Self {
			id: s.id.into_inner(),
			variable_id: s.variable_id.into_inner(),
			environment_id: s.environment_id.into_inner(),
			value: s.value.into_inner(),
			created_at: s.created_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnvironmentSecretResponse {
	pub key: String,
	pub value: String,
}

impl From<EnvironmentSecret> for EnvironmentSecretResponse {
	fn from(s: EnvironmentSecret) -> Self {
		Self {
			key: s.key,
			value: s.value.into_inner(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
	pub id: Uuid,
	pub environment_id: Uuid,
	pub display: String,
	pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
	fn from(c: Client) -> Self {
		Self {
			id: c.id.into_inner(),
			environment_id: c.environment_id.into_inner(),
			display: c.display,
			created_at: c.created_at,
		}
	}
}

/// A freshly issued client credential. `secret` is shown exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuedCredentialResponse {
	pub client_id: Uuid,
	pub secret_id: Uuid,
	pub secret: String,
}

impl From<IssuedCredential> for IssuedCredentialResponse {
	fn from(c: IssuedCredential) -> Self {
		Self {
			client_id: c.client_id.into_inner(),
			secret_id: c.secret_id.into_inner(),
			secret: c.secret.into_inner(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
	pub status: String,
	pub timestamp: DateTime<Utc>,
	pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServerStatus {
	pub is_ready: bool,
	pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceStatus {
	pub database: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
	pub server: ServerStatus,
	pub services: ServiceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
	pub msg: String,
}
